/*! Unified interface for lowering checked ASTs to IR.
 *
 * Single import for the whole pipeline: the AST model, the lowering core, the IR it produces and
 * the textual printer. Drivers call [`lower_or_exit`] to get a finished module or terminate the
 * process after a fatal diagnostic.
 */

pub use loam_ast as ast;
pub use loam_core as core;
pub use loam_emit as emit;
pub use loam_lower as lower;

pub use loam_ast::{Decl, TranslationUnit};
pub use loam_core::{Artifact, ArtifactId, IrModule, Linkage};
pub use loam_emit::IrPrinter;
pub use loam_lower::{
    lower_translation_unit, DeclarationKey, DiagnosticSink, LowerError, LoweredModule,
    LoweringOptions, ModuleLowering, NameLookup,
};

/// Lowers `unit` and renders the resulting module as text.
pub fn lower_to_text(
    unit: &TranslationUnit,
    options: LoweringOptions,
    lookup: &dyn NameLookup,
    sink: &mut dyn DiagnosticSink,
) -> anyhow::Result<String> {
    let lowered = lower_translation_unit(unit, options, lookup, sink)?;
    IrPrinter::new().print_module(&lowered.module)
}

/// Lowers `unit`. Lowering is all-or-nothing: on any error the process
/// exits with status 1, after fatal problems have been reported to `sink`.
pub fn lower_or_exit(
    unit: &TranslationUnit,
    options: LoweringOptions,
    lookup: &dyn NameLookup,
    sink: &mut dyn DiagnosticSink,
) -> LoweredModule {
    match lower_translation_unit(unit, options, lookup, sink) {
        Ok(lowered) => lowered,
        Err(error) => {
            tracing::error!(module = %unit.module.name, fatal = error.is_fatal(), "{}", error);
            std::process::exit(1);
        }
    }
}
