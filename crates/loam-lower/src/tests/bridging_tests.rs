use crate::bridging::{BridgingFunction, BridgingFunctionResolver};
use crate::diagnostics::{CollectingSink, DiagnosticKind};
use crate::error::BridgingError;
use crate::lookup::{LookupResult, ModuleTable, NameLookup};
use crate::options::LoweringOptions;
use loam_ast::Ty;
use pretty_assertions::assert_eq;
use std::cell::Cell;

struct CountingLookup {
    table: ModuleTable,
    calls: Cell<usize>,
}

impl CountingLookup {
    fn new(table: ModuleTable) -> Self {
        Self {
            table,
            calls: Cell::new(0),
        }
    }
}

impl NameLookup for CountingLookup {
    fn lookup(&self, module: &str, name: &str) -> Option<Vec<LookupResult>> {
        self.calls.set(self.calls.get() + 1);
        self.table.lookup(module, name)
    }
}

fn resolve(
    resolver: &mut BridgingFunctionResolver,
    lookup: &CountingLookup,
    sink: &mut CollectingSink,
    function: BridgingFunction,
) -> Result<crate::lookup::ExternalFunction, BridgingError> {
    resolver.resolve(function, &LoweringOptions::default(), lookup, sink, None)
}

#[test]
fn test_resolution_is_memoized() {
    let lookup = CountingLookup::new(ModuleTable::with_bridging_support("Foundation", "ObjectiveC"));
    let mut sink = CollectingSink::new();
    let mut resolver = BridgingFunctionResolver::new();

    let first = resolve(&mut resolver, &lookup, &mut sink, BridgingFunction::StringToHost).unwrap();
    let second = resolve(&mut resolver, &lookup, &mut sink, BridgingFunction::StringToHost).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.module, "Foundation");
    assert_eq!(first.name, "convertStringToNSString");
    assert_eq!(lookup.calls.get(), 1);
    assert!(resolver.is_resolved(BridgingFunction::StringToHost));
    assert!(!resolver.is_resolved(BridgingFunction::BoolToHost));
    assert!(!sink.has_errors());
}

#[test]
fn test_each_helper_has_its_own_slot() {
    let lookup = CountingLookup::new(ModuleTable::with_bridging_support("Foundation", "ObjectiveC"));
    let mut sink = CollectingSink::new();
    let mut resolver = BridgingFunctionResolver::new();

    for function in [
        BridgingFunction::StringFromHost,
        BridgingFunction::StringToHost,
        BridgingFunction::BoolToHost,
        BridgingFunction::BoolFromHost,
        BridgingFunction::BoolToHost,
    ] {
        resolve(&mut resolver, &lookup, &mut sink, function).unwrap();
    }
    assert_eq!(lookup.calls.get(), 4);
}

#[test]
fn test_type_mismatch_is_diagnosed_once() {
    let mut table = ModuleTable::new();
    table.add_function(
        "ObjectiveC",
        "convertBoolToObjCBool",
        vec![Ty::Int],
        Ty::HostBool,
    );
    let lookup = CountingLookup::new(table);
    let mut sink = CollectingSink::new();
    let mut resolver = BridgingFunctionResolver::new();

    let error = resolve(&mut resolver, &lookup, &mut sink, BridgingFunction::BoolToHost).unwrap_err();
    assert!(matches!(
        &error,
        BridgingError::TypeMismatch { function, found, .. }
            if function == "convertBoolToObjCBool" && *found == Ty::function(vec![Ty::Int], Ty::HostBool)
    ));

    let again = resolve(&mut resolver, &lookup, &mut sink, BridgingFunction::BoolToHost).unwrap_err();
    assert_eq!(again, error);
    assert_eq!(lookup.calls.get(), 1);
    assert_eq!(sink.diagnostics().len(), 1);
    assert_eq!(sink.diagnostics()[0].kind, DiagnosticKind::BridgingTypeMismatch);
}

#[test]
fn test_missing_module_and_function() {
    let mut table = ModuleTable::new();
    table.add_module("Foundation");
    let lookup = CountingLookup::new(table);
    let mut sink = CollectingSink::new();
    let mut resolver = BridgingFunctionResolver::new();

    let missing_fn =
        resolve(&mut resolver, &lookup, &mut sink, BridgingFunction::StringToHost).unwrap_err();
    assert!(matches!(missing_fn, BridgingError::FunctionNotFound { .. }));

    let missing_module =
        resolve(&mut resolver, &lookup, &mut sink, BridgingFunction::BoolFromHost).unwrap_err();
    assert!(matches!(
        missing_module,
        BridgingError::ModuleNotFound { ref module, .. } if module == "ObjectiveC"
    ));

    let kinds: Vec<_> = sink.diagnostics().iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::BridgingFunctionMissing,
            DiagnosticKind::BridgingModuleMissing
        ]
    );
}

#[test]
fn test_overloaded_and_non_function() {
    let string_to_host = vec![Ty::InOut(Box::new(Ty::String))];
    let mut table = ModuleTable::new();
    table
        .add_function("Foundation", "convertStringToNSString", string_to_host.clone(), Ty::HostString)
        .add_function("Foundation", "convertStringToNSString", string_to_host, Ty::HostString)
        .add_non_function("ObjectiveC", "convertObjCBoolToBool");
    let lookup = CountingLookup::new(table);
    let mut sink = CollectingSink::new();
    let mut resolver = BridgingFunctionResolver::new();

    let overloaded =
        resolve(&mut resolver, &lookup, &mut sink, BridgingFunction::StringToHost).unwrap_err();
    assert!(matches!(overloaded, BridgingError::Overloaded { count: 2, .. }));

    let not_fn =
        resolve(&mut resolver, &lookup, &mut sink, BridgingFunction::BoolFromHost).unwrap_err();
    assert!(matches!(not_fn, BridgingError::NotAFunction { .. }));
    assert_eq!(sink.diagnostics()[1].kind, DiagnosticKind::BridgingNotAFunction);
}

#[test]
fn test_modules_come_from_options() {
    let lookup = CountingLookup::new(ModuleTable::with_bridging_support("HostKit", "ObjectiveC"));
    let mut sink = CollectingSink::new();
    let mut resolver = BridgingFunctionResolver::new();
    let options = LoweringOptions {
        string_module: "HostKit".to_string(),
        ..LoweringOptions::default()
    };

    let resolved = resolver
        .resolve(BridgingFunction::StringFromHost, &options, &lookup, &mut sink, None)
        .unwrap();
    assert_eq!(resolved.module, "HostKit");
}
