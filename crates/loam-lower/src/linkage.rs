use loam_ast::DeclContext;
use loam_core::Linkage;

/// What sort of declaration an artifact is emitted for, as far as visibility
/// is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclFlavor {
    Function,
    Closure,
    Constructor,
    Destructor,
    Subscript,
    ComputedProperty,
    StoredProperty,
}

/// Visibility of an artifact, derived purely from where its declaration
/// lives. Thunks and default-argument generators pass the flavor of the
/// declaration they belong to.
pub fn derive_linkage(context: &DeclContext, flavor: DeclFlavor) -> Linkage {
    if flavor == DeclFlavor::Closure || context.is_local() {
        return Linkage::Internal;
    }
    match flavor {
        DeclFlavor::Constructor | DeclFlavor::Subscript | DeclFlavor::ComputedProperty
            if context.module.is_foreign() =>
        {
            Linkage::ForeignThunk
        }
        _ => Linkage::External,
    }
}
