use loam_ast::Ty;
use loam_core::{IrError, SourceLocation};
use thiserror::Error;

/// Failure to resolve one of the host bridging helpers. Always fatal: the
/// support library does not match this compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgingError {
    #[error("bridging module `{module}` needed for `{function}` could not be found")]
    ModuleNotFound { module: String, function: String },

    #[error("bridging function `{module}.{function}` could not be found")]
    FunctionNotFound { module: String, function: String },

    #[error("bridging function `{module}.{function}` is overloaded ({count} candidates)")]
    Overloaded {
        module: String,
        function: String,
        count: usize,
    },

    #[error("`{module}.{function}` is not a function")]
    NotAFunction { module: String, function: String },

    #[error("bridging function `{module}.{function}` has type `{found}`, expected `{expected}`")]
    TypeMismatch {
        module: String,
        function: String,
        expected: Ty,
        found: Ty,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LowerError {
    #[error(transparent)]
    Bridging(#[from] BridgingError),

    #[error("Unsupported {what}{}", location.as_ref().map(|l| format!(" at {}", l)).unwrap_or_default())]
    Unsupported {
        what: String,
        location: Option<SourceLocation>,
    },

    #[error("IR builder error: {0}")]
    Builder(#[from] IrError),
}

impl LowerError {
    pub fn unsupported(what: impl Into<String>, location: Option<SourceLocation>) -> Self {
        LowerError::Unsupported {
            what: what.into(),
            location,
        }
    }

    /// Fatal errors abort the whole compilation. The rest stop lowering of
    /// the current unit, with every artifact opened so far still finalized.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LowerError::Bridging(_))
    }
}

pub type Result<T> = std::result::Result<T, LowerError>;
