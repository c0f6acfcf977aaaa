use crate::key::{DeclarationKey, KeyKind};
use loam_ast::DeclContext;

/// Unique symbol for the artifact `key` of a declaration called `name` in
/// `context`. `natural_level` is the uncurry level that needs no suffix.
pub fn mangle(
    context: &DeclContext,
    name: &str,
    key: &DeclarationKey,
    natural_level: u32,
) -> String {
    let mut symbol = context.path().join(".");
    symbol.push('.');
    symbol.push_str(name);

    match key.kind {
        KeyKind::Func if key.uncurry_level != natural_level => {
            symbol.push_str(&format!("$curry{}", key.uncurry_level));
        }
        KeyKind::Func | KeyKind::Allocator | KeyKind::Destroyer => {}
        KeyKind::Initializer => symbol.push_str("$initializer"),
        KeyKind::Getter => symbol.push_str("$get"),
        KeyKind::Setter => symbol.push_str("$set"),
        KeyKind::DefaultArgGenerator(index) => symbol.push_str(&format!("$default{}", index)),
    }
    if key.foreign {
        symbol.push_str("$interop");
    }
    symbol
}

pub fn mangle_global(context: &DeclContext, name: &str) -> String {
    let mut path = context.path();
    path.push(name.to_string());
    path.join(".")
}
