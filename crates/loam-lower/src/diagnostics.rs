use loam_core::SourceLocation;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    BridgingModuleMissing,
    BridgingFunctionMissing,
    BridgingFunctionOverloaded,
    BridgingNotAFunction,
    BridgingTypeMismatch,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::BridgingModuleMissing => "bridging-module-missing",
            DiagnosticKind::BridgingFunctionMissing => "bridging-function-missing",
            DiagnosticKind::BridgingFunctionOverloaded => "bridging-function-overloaded",
            DiagnosticKind::BridgingNotAFunction => "bridging-not-a-function",
            DiagnosticKind::BridgingTypeMismatch => "bridging-type-mismatch",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: Option<SourceLocation>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        location: Option<SourceLocation>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: error[{}]: {}", location, self.kind, self.message),
            None => write!(f, "error[{}]: {}", self.kind, self.message),
        }
    }
}

/// Receiver of user-facing diagnostics. Delivery never stops lowering; the
/// caller decides whether to continue.
pub trait DiagnosticSink {
    fn diagnose(&mut self, diagnostic: Diagnostic);
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Forwards diagnostics to the `tracing` subscriber at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn diagnose(&mut self, diagnostic: Diagnostic) {
        tracing::error!(
            kind = %diagnostic.kind,
            location = ?diagnostic.location.as_ref().map(|l| l.to_string()),
            "{}",
            diagnostic.message
        );
    }
}
