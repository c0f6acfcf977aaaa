use crate::bridging::BridgingFunction;
use crate::key::{DeclarationKey, KeyBase, KeyKind};
use crate::mangle::{mangle, mangle_global};
use loam_ast::{ClosureId, ContextFrame, DeclContext, DeclId, ModuleRef};
use pretty_assertions::assert_eq;
use std::collections::{BTreeSet, HashSet};

fn module_context() -> DeclContext {
    DeclContext::module(ModuleRef::source("main"))
}

#[test]
fn test_keys_distinguish_every_component() {
    let f = DeclId(1);
    let keys = [
        DeclarationKey::func(f, 0),
        DeclarationKey::func(f, 1),
        DeclarationKey::func(f, 1).as_foreign(),
        DeclarationKey::allocator(f),
        DeclarationKey::initializer(f),
        DeclarationKey::destroyer(f),
        DeclarationKey::getter(f),
        DeclarationKey::setter(f),
        DeclarationKey::default_arg(f, 0),
        DeclarationKey::default_arg(f, 1),
        DeclarationKey::closure(ClosureId(1)),
        DeclarationKey::top_level(),
        DeclarationKey::bridging(BridgingFunction::BoolToHost),
        DeclarationKey::bridging(BridgingFunction::BoolFromHost),
    ];
    let unique: HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
}

#[test]
fn test_keys_are_totally_ordered_by_base_first() {
    let ordered: BTreeSet<_> = [
        DeclarationKey::top_level(),
        DeclarationKey::getter(DeclId(2)),
        DeclarationKey::func(DeclId(1), 1),
        DeclarationKey::func(DeclId(1), 0),
    ]
    .into_iter()
    .collect();
    let ordered: Vec<_> = ordered.into_iter().collect();

    assert_eq!(ordered[0], DeclarationKey::func(DeclId(1), 0));
    assert_eq!(ordered[1], DeclarationKey::func(DeclId(1), 1));
    assert_eq!(ordered[2], DeclarationKey::getter(DeclId(2)));
    assert_eq!(ordered[3].base, KeyBase::TopLevel);
}

#[test]
fn test_foreign_round_trip_keeps_identity() {
    let key = DeclarationKey::setter(DeclId(4));
    assert_ne!(key, key.as_foreign());
    assert_eq!(key, key.as_foreign().as_native());
    assert_eq!(key.as_foreign().kind, KeyKind::Setter);
}

#[test]
fn test_key_display() {
    assert_eq!(DeclarationKey::func(DeclId(3), 1).to_string(), "decl#3@1");
    assert_eq!(
        DeclarationKey::bridging(BridgingFunction::StringToHost).to_string(),
        "bridging:convertStringToNSString@0"
    );
    assert_eq!(
        DeclarationKey::default_arg(DeclId(3), 2).to_string(),
        "decl#3.default_arg2@0"
    );
    assert_eq!(
        DeclarationKey::getter(DeclId(5)).as_foreign().to_string(),
        "decl#5.getter@0.foreign"
    );
    assert_eq!(DeclarationKey::top_level().to_string(), "top-level@0");
}

#[test]
fn test_mangle_suffixes() {
    let ctx = module_context();
    let id = DeclId(1);
    assert_eq!(mangle(&ctx, "add", &DeclarationKey::func(id, 1), 1), "main.add");
    assert_eq!(
        mangle(&ctx, "add", &DeclarationKey::func(id, 0), 1),
        "main.add$curry0"
    );
    assert_eq!(mangle(&ctx, "count", &DeclarationKey::getter(id), 0), "main.count$get");
    assert_eq!(mangle(&ctx, "count", &DeclarationKey::setter(id), 0), "main.count$set");
    assert_eq!(
        mangle(&ctx, "f", &DeclarationKey::default_arg(id, 2), 0),
        "main.f$default2"
    );
    assert_eq!(
        mangle(&ctx, "f", &DeclarationKey::func(id, 0).as_foreign(), 0),
        "main.f$interop"
    );
}

#[test]
fn test_mangle_constructor_halves() {
    let ctx = module_context().nested(ContextFrame::Type {
        decl: DeclId(7),
        name: "Node".into(),
    });
    let ctor = DeclId(8);
    assert_eq!(mangle(&ctx, "init", &DeclarationKey::allocator(ctor), 0), "main.Node.init");
    assert_eq!(
        mangle(&ctx, "init", &DeclarationKey::initializer(ctor), 0),
        "main.Node.init$initializer"
    );
    assert_eq!(mangle_global(&module_context(), "counter"), "main.counter");
}
