/*! Core IR types and builders for the loam lowering pipeline.
 *
 * Later compiler stages want a control-flow graph, not a tree. This crate defines that graph:
 * artifacts (IR functions) made of basic blocks, the instructions inside them, the module that
 * owns them, a body builder with an explicit insertion cursor, and a structural verifier that
 * every finished artifact must pass.
 */

pub mod artifact;
pub mod block;
pub mod builder;
pub mod instructions;
pub mod module;
pub mod source_location;
pub mod types;
pub mod values;
pub mod verify;

pub use artifact::{Artifact, ArtifactId, DebugScope, FunctionBody, Linkage, Parameter, Signature};
pub use block::{BasicBlock, BlockId, BlockParam, Terminator};
pub use builder::BodyBuilder;
pub use instructions::{BinaryOp, CompareOp, Instruction};
pub use module::{GlobalVariable, IrModule};
pub use source_location::SourceLocation;
pub use types::{FunctionType, Type};
pub use values::{Constant, GlobalId, ParamId, TempId, Value};
pub use verify::{StructuralVerifier, Verifier, VerifyError};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("Builder error: {0}")]
    BuilderError(String),
    #[error("No insertion point: {0}")]
    NoInsertionPoint(String),
    #[error("Block {0} does not exist")]
    UnknownBlock(BlockId),
    #[error("Artifact {0} does not exist")]
    UnknownArtifact(ArtifactId),
    #[error("Artifact `{0}` already has a body")]
    AlreadyDefined(String),
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
