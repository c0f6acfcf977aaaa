/*! Lowering of checked loam ASTs into control-flow-graph IR.
 *
 * The entry point is [`ModuleLowering`]: it walks a translation unit in source order, declares
 * every artifact a declaration needs (bodies, curried entry points, allocator/initializer
 * halves, destroyers, accessors, interop thunks, default-argument generators) exactly once under
 * a [`DeclarationKey`], and lowers each body through a [`FunctionLoweringContext`] that always
 * leaves the artifact terminated, even when lowering of the body fails.
 *
 * Top-level statements accumulate in one implicit artifact that stays open for the whole unit and
 * is finished last. Helpers for converting values to and from the foreign host runtime are looked
 * up lazily by the [`BridgingFunctionResolver`], once per helper.
 */

pub mod bridging;
pub mod cleanup;
pub mod decl_index;
pub mod diagnostics;
pub mod error;
mod expr;
pub mod function_lowering;
pub mod key;
pub mod linkage;
pub mod lookup;
pub mod mangle;
pub mod module_lowering;
pub mod options;
pub mod thunks;
pub mod types;

pub use bridging::{BridgingFunction, BridgingFunctionResolver};
pub use cleanup::{Cleanup, CleanupStack};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
pub use error::{BridgingError, LowerError, Result};
pub use function_lowering::FunctionLoweringContext;
pub use key::{DeclarationKey, KeyBase, KeyKind};
pub use linkage::{derive_linkage, DeclFlavor};
pub use lookup::{ExternalFunction, LookupResult, ModuleTable, NameLookup};
pub use module_lowering::{
    lower_translation_unit, ArtifactDeclaration, LoweredModule, ModuleLowering,
};
pub use options::LoweringOptions;
pub use thunks::ThunkGenerator;

#[cfg(test)]
mod tests;
