use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::BridgingError;
use crate::lookup::{ExternalFunction, LookupResult, NameLookup};
use crate::options::LoweringOptions;
use crate::types::lower_location;
use loam_ast::Ty;
use loam_core::SourceLocation;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Helpers converting between native values and host runtime values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BridgingFunction {
    StringFromHost,
    StringToHost,
    BoolToHost,
    BoolFromHost,
}

impl BridgingFunction {
    pub fn name(self) -> &'static str {
        match self {
            BridgingFunction::StringFromHost => "convertNSStringToString",
            BridgingFunction::StringToHost => "convertStringToNSString",
            BridgingFunction::BoolToHost => "convertBoolToObjCBool",
            BridgingFunction::BoolFromHost => "convertObjCBoolToBool",
        }
    }

    pub fn module(self, options: &LoweringOptions) -> &str {
        match self {
            BridgingFunction::StringFromHost | BridgingFunction::StringToHost => {
                &options.string_module
            }
            BridgingFunction::BoolToHost | BridgingFunction::BoolFromHost => &options.bool_module,
        }
    }

    pub fn expected_params(self) -> Vec<Ty> {
        let inout_string = Ty::InOut(Box::new(Ty::String));
        match self {
            BridgingFunction::StringFromHost => vec![Ty::HostString, inout_string],
            BridgingFunction::StringToHost => vec![inout_string],
            BridgingFunction::BoolToHost => vec![Ty::Bool],
            BridgingFunction::BoolFromHost => vec![Ty::HostBool],
        }
    }

    pub fn expected_result(self) -> Ty {
        match self {
            BridgingFunction::StringFromHost => Ty::Unit,
            BridgingFunction::StringToHost => Ty::HostString,
            BridgingFunction::BoolToHost => Ty::HostBool,
            BridgingFunction::BoolFromHost => Ty::Bool,
        }
    }
}

impl fmt::Display for BridgingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
enum BridgingSlot {
    Resolving,
    Resolved(ExternalFunction),
    Failed(BridgingError),
}

/// Resolves bridging helpers by name, at most once each. A missing slot is
/// an unresolved one.
#[derive(Debug, Default)]
pub struct BridgingFunctionResolver {
    slots: HashMap<BridgingFunction, BridgingSlot>,
}

impl BridgingFunctionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self, function: BridgingFunction) -> bool {
        matches!(self.slots.get(&function), Some(BridgingSlot::Resolved(_)))
    }

    /// Returns the validated helper, looking it up on first use. A failure is
    /// diagnosed once and remembered; later requests get the same error
    /// without another lookup.
    pub fn resolve(
        &mut self,
        function: BridgingFunction,
        options: &LoweringOptions,
        lookup: &dyn NameLookup,
        sink: &mut dyn DiagnosticSink,
        location: Option<&SourceLocation>,
    ) -> Result<ExternalFunction, BridgingError> {
        match self.slots.get(&function) {
            Some(BridgingSlot::Resolved(resolved)) => return Ok(resolved.clone()),
            Some(BridgingSlot::Failed(error)) => return Err(error.clone()),
            Some(BridgingSlot::Resolving) => {
                panic!("bridging function `{}` resolved re-entrantly", function)
            }
            None => {}
        }

        self.slots.insert(function, BridgingSlot::Resolving);
        let outcome = Self::lookup_and_validate(function, options, lookup);
        match outcome {
            Ok(resolved) => {
                tracing::debug!(
                    function = %function,
                    module = %resolved.module,
                    "Mapped bridging function"
                );
                self.slots
                    .insert(function, BridgingSlot::Resolved(resolved.clone()));
                Ok(resolved)
            }
            Err((error, found_at)) => {
                let kind = match &error {
                    BridgingError::ModuleNotFound { .. } => DiagnosticKind::BridgingModuleMissing,
                    BridgingError::FunctionNotFound { .. } => {
                        DiagnosticKind::BridgingFunctionMissing
                    }
                    BridgingError::Overloaded { .. } => DiagnosticKind::BridgingFunctionOverloaded,
                    BridgingError::NotAFunction { .. } => DiagnosticKind::BridgingNotAFunction,
                    BridgingError::TypeMismatch { .. } => DiagnosticKind::BridgingTypeMismatch,
                };
                let location = found_at.or_else(|| location.cloned());
                sink.diagnose(Diagnostic::new(location, kind, error.to_string()));
                self.slots
                    .insert(function, BridgingSlot::Failed(error.clone()));
                Err(error)
            }
        }
    }

    fn lookup_and_validate(
        function: BridgingFunction,
        options: &LoweringOptions,
        lookup: &dyn NameLookup,
    ) -> Result<ExternalFunction, (BridgingError, Option<SourceLocation>)> {
        let module = function.module(options).to_string();
        let name = function.name().to_string();

        let Some(mut candidates) = lookup.lookup(&module, &name) else {
            return Err((
                BridgingError::ModuleNotFound {
                    module,
                    function: name,
                },
                None,
            ));
        };

        match candidates.len() {
            0 => {
                return Err((
                    BridgingError::FunctionNotFound {
                        module,
                        function: name,
                    },
                    None,
                ))
            }
            1 => {}
            count => {
                return Err((
                    BridgingError::Overloaded {
                        module,
                        function: name,
                        count,
                    },
                    None,
                ))
            }
        }

        let resolved = match candidates.remove(0) {
            LookupResult::Function(resolved) => resolved,
            LookupResult::NotAFunction { .. } => {
                return Err((
                    BridgingError::NotAFunction {
                        module,
                        function: name,
                    },
                    None,
                ))
            }
        };

        if resolved.params != function.expected_params()
            || resolved.result != function.expected_result()
        {
            let found_at = lower_location(resolved.loc.as_ref());
            return Err((
                BridgingError::TypeMismatch {
                    module,
                    function: name,
                    expected: Ty::function(function.expected_params(), function.expected_result()),
                    found: resolved.ty(),
                },
                found_at,
            ));
        }

        Ok(resolved)
    }
}
