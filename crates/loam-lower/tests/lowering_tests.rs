mod support;

use loam_ast::{
    BinaryOp, ClosureBody, ClosureExpr, ClosureId, ContextFrame, Decl, DeclId, DestructorDecl,
    Expr, ExprKind, FieldDecl, LValue, ModuleRef, NominalKind, Param, PatternBindingDecl, Stmt,
    Storage, TopLevelCodeDecl, Ty,
};
use loam_core::{Instruction, Linkage, Terminator, Type};
use loam_lower::{DeclarationKey, LowerError, LoweringOptions};
use pretty_assertions::assert_eq;
use support::*;

fn assign_field(field: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        target: LValue::SelfField(field.to_string()),
        value,
    }
}

#[test]
fn test_value_type_constructor_builds_self_in_place() {
    let mut point = nominal(
        10,
        "Point",
        NominalKind::Struct,
        vec![FieldDecl::new("x", Ty::Int), FieldDecl::new("y", Ty::Int)],
    );
    let init = constructor(
        11,
        &point,
        vec![int_param("x"), int_param("y")],
        vec![
            assign_field("x", Expr::local("x", Ty::Int)),
            assign_field("y", Expr::local("y", Ty::Int)),
        ],
    );
    point.members.push(Decl::Constructor(init));
    let lowered = lower(&unit(vec![Decl::Nominal(point)]));

    assert!(lowered.artifact_id(&DeclarationKey::initializer(DeclId(11))).is_none());
    let ctor = lowered.artifact(&DeclarationKey::allocator(DeclId(11))).unwrap();
    assert_eq!(ctor.name, "main.Point.init");
    assert_eq!(ctor.signature.result, Type::Struct("Point".into()));

    let insts = instructions(ctor);
    let field_stores: Vec<_> = insts
        .iter()
        .filter_map(|inst| match inst {
            Instruction::FieldStore { field, .. } => Some(field.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(field_stores, vec!["x", "y"]);

    let slot = insts
        .iter()
        .find_map(|inst| match inst {
            Instruction::AllocStack { result, .. } => Some(result.clone()),
            _ => None,
        })
        .unwrap();
    let loaded = insts
        .iter()
        .find_map(|inst| match inst {
            Instruction::Load { result, address } if *address == slot => Some(result.clone()),
            _ => None,
        })
        .unwrap();
    let returns: Vec<_> = ctor
        .body
        .blocks
        .values()
        .filter_map(|block| match &block.terminator {
            Terminator::Return(value) => Some(value.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(returns, vec![loaded]);
    assert_eq!(
        mnemonics(ctor).last().copied(),
        Some("dealloc_stack"),
        "the slot is released before returning"
    );
    assert_well_formed(&lowered.module);
}

#[test]
fn test_reference_type_constructor_is_split() {
    let mut node = nominal(
        20,
        "Node",
        NominalKind::Class,
        vec![FieldDecl {
            name: "value".into(),
            ty: Ty::Int,
            initial: Some(Expr::int(0)),
        }],
    );
    let init = constructor(
        21,
        &node,
        vec![int_param("v")],
        vec![assign_field("value", Expr::local("v", Ty::Int))],
    );
    node.members.push(Decl::Constructor(init));
    let lowered = lower(&unit(vec![Decl::Nominal(node)]));

    let allocator = lowered.artifact(&DeclarationKey::allocator(DeclId(21))).unwrap();
    let initializer = lowered.artifact(&DeclarationKey::initializer(DeclId(21))).unwrap();
    assert_eq!(allocator.name, "main.Node.init");
    assert_eq!(initializer.name, "main.Node.init$initializer");
    assert_eq!(initializer.signature.params.len(), 2);
    assert_eq!(initializer.signature.params[1].name, "self");

    assert_eq!(mnemonics(allocator), vec!["alloc_ref", "function_ref", "apply"]);
    assert!(instructions(allocator).iter().any(|inst| matches!(
        inst,
        Instruction::FunctionRef { artifact, .. } if *artifact == initializer.id
    )));
    // The initial value is stored before the body runs.
    assert_eq!(
        mnemonics(initializer),
        vec!["field_store", "field_store"]
    );

    let destroyer = lowered.artifact(&DeclarationKey::destroyer(DeclId(20))).unwrap();
    assert_eq!(destroyer.name, "main.Node.deinit");
    assert_eq!(mnemonics(destroyer), vec!["dealloc_ref"]);
    assert_well_formed(&lowered.module);
}

#[test]
fn test_destroyer_releases_fields_in_reverse_order() {
    let node_ty = Ty::class(DeclId(30), "Node");
    let mut owner = nominal(
        31,
        "Owner",
        NominalKind::Class,
        vec![
            FieldDecl::new("first", node_ty.clone()),
            FieldDecl::new("count", Ty::Int),
            FieldDecl::new("second", node_ty),
        ],
    );
    owner.superclass = Some(loam_ast::NominalRef {
        decl: DeclId(32),
        name: "Base".into(),
        kind: NominalKind::Class,
    });
    let deinit = DestructorDecl {
        id: DeclId(33),
        context: member_context(&owner),
        loc: None,
        class: owner.nominal_ref(),
        body: Vec::new(),
    };
    owner.members.push(Decl::Destructor(deinit));
    let lowered = lower(&unit(vec![Decl::Nominal(owner)]));

    let destroyer = lowered.artifact(&DeclarationKey::destroyer(DeclId(31))).unwrap();
    let released: Vec<_> = instructions(destroyer)
        .into_iter()
        .filter_map(|inst| match inst {
            Instruction::FieldLoad { field, .. } => Some(field.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(released, vec!["second", "first"]);

    let base = lowered.artifact(&DeclarationKey::destroyer(DeclId(32))).unwrap();
    assert_eq!(base.name, "Base.deinit");
    assert!(base.is_external_declaration());
    assert!(!mnemonics(destroyer).contains(&"dealloc_ref"));
    assert_eq!(mnemonics(destroyer).last().copied(), Some("apply"));
}

#[test]
fn test_every_artifact_is_declared_once() {
    // `caller` refers to `callee` before `callee` has been visited.
    let caller = func(
        1,
        "caller",
        vec![vec![]],
        Ty::Int,
        vec![Stmt::Return(Some(Expr::call(
            Expr::func_ref(DeclId(2), Ty::function(vec![], Ty::Int)),
            vec![],
            Ty::Int,
        )))],
    );
    let twice = func(
        3,
        "twice",
        vec![vec![]],
        Ty::Int,
        vec![Stmt::Return(Some(Expr::binary(
            BinaryOp::Add,
            Expr::call(Expr::func_ref(DeclId(2), Ty::function(vec![], Ty::Int)), vec![], Ty::Int),
            Expr::call(Expr::func_ref(DeclId(2), Ty::function(vec![], Ty::Int)), vec![], Ty::Int),
            Ty::Int,
        )))],
    );
    let callee = func(2, "callee", vec![vec![]], Ty::Int, vec![Stmt::Return(Some(Expr::int(7)))]);
    let lowered = lower(&unit(vec![
        Decl::Func(caller),
        Decl::Func(twice),
        Decl::Func(callee),
    ]));

    assert_eq!(lowered.module.artifacts().count(), lowered.artifacts.len());
    let callee = lowered.artifact(&DeclarationKey::func(DeclId(2), 0)).unwrap();
    assert!(callee.is_defined());
    assert_eq!(
        lowered.module.artifacts().filter(|a| a.name == "main.callee").count(),
        1
    );
    assert_well_formed(&lowered.module);
}

fn call_int(callee: u32, arg: &str) -> Expr {
    Expr::call(
        Expr::func_ref(DeclId(callee), Ty::function(vec![Ty::Int], Ty::Int)),
        vec![Expr::local(arg, Ty::Int)],
        Ty::Int,
    )
}

fn function_refs(artifact: &loam_core::Artifact) -> Vec<loam_core::ArtifactId> {
    instructions(artifact)
        .into_iter()
        .filter_map(|inst| match inst {
            Instruction::FunctionRef { artifact, .. } => Some(*artifact),
            _ => None,
        })
        .collect()
}

#[test]
fn test_self_recursive_function_references_its_own_artifact() {
    let f = func(
        1,
        "f",
        vec![vec![int_param("n")]],
        Ty::Int,
        vec![Stmt::Return(Some(call_int(1, "n")))],
    );
    let lowered = lower(&unit(vec![Decl::Func(f)]));

    let f = lowered.artifact(&DeclarationKey::func(DeclId(1), 0)).unwrap();
    assert!(f.is_defined());
    assert_eq!(function_refs(f), vec![f.id]);
    assert_eq!(lowered.module.artifacts().filter(|a| a.name == "main.f").count(), 1);
    assert_eq!(lowered.module.artifacts().count(), lowered.artifacts.len());
    assert_well_formed(&lowered.module);
}

#[test]
fn test_mutually_recursive_functions_reference_each_other() {
    let a = func(
        1,
        "a",
        vec![vec![int_param("n")]],
        Ty::Int,
        vec![Stmt::Return(Some(call_int(2, "n")))],
    );
    let b = func(
        2,
        "b",
        vec![vec![int_param("n")]],
        Ty::Int,
        vec![Stmt::Return(Some(call_int(1, "n")))],
    );
    let lowered = lower(&unit(vec![Decl::Func(a), Decl::Func(b)]));

    let a = lowered.artifact(&DeclarationKey::func(DeclId(1), 0)).unwrap();
    let b = lowered.artifact(&DeclarationKey::func(DeclId(2), 0)).unwrap();
    assert!(a.is_defined() && b.is_defined());
    assert_ne!(a.id, b.id);
    assert_eq!(function_refs(a), vec![b.id]);
    assert_eq!(function_refs(b), vec![a.id]);
    // Top level plus one artifact per function.
    assert_eq!(lowered.module.artifacts().count(), 3);
    assert_eq!(lowered.artifacts.len(), 3);
    assert_well_formed(&lowered.module);
}

#[test]
fn test_fallthrough_is_closed() {
    let log = func(1, "log", vec![vec![int_param("x")]], Ty::Unit, Vec::new());
    let pick = func(
        2,
        "pick",
        vec![vec![Param::new("flag", Ty::Bool)]],
        Ty::Int,
        vec![Stmt::If {
            condition: Expr::local("flag", Ty::Bool),
            then_branch: vec![Stmt::Return(Some(Expr::int(1)))],
            else_branch: Vec::new(),
        }],
    );
    let lowered = lower(&unit(vec![Decl::Func(log), Decl::Func(pick)]));

    let log = lowered.artifact(&DeclarationKey::func(DeclId(1), 0)).unwrap();
    assert!(log.body.last_block().unwrap().terminator.is_return());

    let pick = lowered.artifact(&DeclarationKey::func(DeclId(2), 0)).unwrap();
    assert!(pick.body.last_block().unwrap().terminator.is_unreachable());
    assert_well_formed(&lowered.module);
}

#[test]
fn test_early_return_runs_scope_cleanups() {
    let body = vec![
        Stmt::Var {
            name: "total".into(),
            ty: Ty::Int,
            init: Some(Expr::int(0)),
        },
        Stmt::If {
            condition: Expr::local("flag", Ty::Bool),
            then_branch: vec![Stmt::Return(Some(Expr::local("total", Ty::Int)))],
            else_branch: Vec::new(),
        },
        Stmt::Assign {
            target: LValue::Local("total".into()),
            value: Expr::int(5),
        },
        Stmt::Return(Some(Expr::local("total", Ty::Int))),
    ];
    let f = func(1, "f", vec![vec![Param::new("flag", Ty::Bool)]], Ty::Int, body);
    let lowered = lower(&unit(vec![Decl::Func(f)]));

    let f = lowered.artifact(&DeclarationKey::func(DeclId(1), 0)).unwrap();
    for block in f.body.blocks.values() {
        if block.terminator.is_return() {
            assert!(
                matches!(block.instructions.last(), Some(Instruction::DeallocStack { .. })),
                "every return deallocates the local slot"
            );
        }
    }
    let returns = f
        .body
        .blocks
        .values()
        .filter(|block| block.terminator.is_return())
        .count();
    assert_eq!(returns, 2);
    assert_well_formed(&lowered.module);
}

#[test]
fn test_local_functions_are_internal_at_any_depth() {
    let outer_ctx = main_context().nested(ContextFrame::Function {
        decl: DeclId(1),
        name: "outer".into(),
    });
    let mut innermost = func(3, "innermost", vec![vec![]], Ty::Unit, Vec::new());
    innermost.context = outer_ctx.nested(ContextFrame::Function {
        decl: DeclId(2),
        name: "inner".into(),
    });
    let mut inner = func(2, "inner", vec![vec![]], Ty::Unit, vec![Stmt::LocalFunc(Box::new(innermost))]);
    inner.context = outer_ctx;
    let outer = func(1, "outer", vec![vec![]], Ty::Unit, vec![Stmt::LocalFunc(Box::new(inner))]);
    let lowered = lower(&unit(vec![Decl::Func(outer)]));

    let linkage = |id| {
        lowered
            .artifact(&DeclarationKey::func(DeclId(id), 0))
            .map(|a| a.linkage)
    };
    assert_eq!(linkage(1), Some(Linkage::External));
    assert_eq!(linkage(2), Some(Linkage::Internal));
    assert_eq!(linkage(3), Some(Linkage::Internal));
    assert_eq!(
        lowered.artifact(&DeclarationKey::func(DeclId(3), 0)).unwrap().name,
        "main.outer.inner.innermost"
    );
}

#[test]
fn test_foreign_computed_property_has_thunk_linkage() {
    let host = ModuleRef::foreign("AppKit");
    let mut title = global_var(
        40,
        "title",
        Ty::Int,
        Storage::Computed {
            getter: vec![Stmt::Return(Some(Expr::int(1)))],
            setter: None,
        },
    );
    title.context = loam_ast::DeclContext::module(host);
    let mut unit = unit(Vec::new());
    unit.external_definitions.push(Decl::Var(title));
    let lowered = lower(&unit);

    let getter = lowered.artifact(&DeclarationKey::getter(DeclId(40))).unwrap();
    assert_eq!(getter.linkage, Linkage::ForeignThunk);
    assert_eq!(getter.name, "AppKit.title$get");
    assert!(getter.is_defined());
}

#[test]
fn test_default_argument_generators_are_numbered_by_position() {
    let f = func(
        1,
        "f",
        vec![vec![
            int_param("a").with_default(Expr::int(1)),
            int_param("b"),
            int_param("c").with_default(Expr::int(3)),
        ]],
        Ty::Unit,
        Vec::new(),
    );
    let lowered = lower(&unit(vec![Decl::Func(f)]));

    let first = lowered.artifact(&DeclarationKey::default_arg(DeclId(1), 0)).unwrap();
    assert_eq!(first.name, "main.f$default0");
    assert!(lowered.artifact_id(&DeclarationKey::default_arg(DeclId(1), 1)).is_none());
    let third = lowered.artifact(&DeclarationKey::default_arg(DeclId(1), 2)).unwrap();
    assert_eq!(third.name, "main.f$default2");
    assert!(third.signature.params.is_empty());
    assert_eq!(third.signature.result, Type::Int(64));
}

#[test]
fn test_foreign_constructor_default_argument_has_thunk_linkage() {
    let mut view = nominal(1, "NSView", NominalKind::Class, Vec::new());
    view.context = loam_ast::DeclContext::module(ModuleRef::foreign("AppKit"));
    let mut init = constructor(2, &view, vec![int_param("tag").with_default(Expr::int(0))], Vec::new());
    init.body = None;
    let mut unit = unit(Vec::new());
    unit.external_definitions.push(Decl::Nominal(view));
    unit.external_definitions.push(Decl::Constructor(init));
    let lowered = lower(&unit);

    let generator = lowered.artifact(&DeclarationKey::default_arg(DeclId(2), 0)).unwrap();
    assert_eq!(generator.linkage, Linkage::ForeignThunk);
    assert!(generator.is_defined());
}

#[test]
fn test_top_level_code_and_global_initializers() {
    let counter = global_var(1, "counter", Ty::Int, Storage::Stored);
    let later = global_var(2, "later", Ty::Int, Storage::Stored);
    let decls = vec![
        Decl::Var(counter),
        Decl::PatternBinding(PatternBindingDecl {
            var: DeclId(1),
            loc: None,
            init: Some(Expr::int(1)),
        }),
        Decl::TopLevelCode(TopLevelCodeDecl {
            loc: None,
            body: vec![Stmt::Return(None)],
        }),
        Decl::Var(later),
        Decl::PatternBinding(PatternBindingDecl {
            var: DeclId(2),
            loc: None,
            init: Some(Expr::int(2)),
        }),
    ];
    let lowered = lower(&unit(decls));

    let top = lowered.artifact(&DeclarationKey::top_level()).unwrap();
    assert_eq!(top.name, "top_level_code");
    assert_eq!(top.linkage, Linkage::Internal);
    assert_eq!(mnemonics(top), vec!["global_addr", "store"]);
    assert!(lowered.module.find_global("main.counter").is_some());
    // Storage exists even though its initializer is unreachable.
    assert!(lowered.module.find_global("main.later").is_some());
    assert_well_formed(&lowered.module);
}

#[test]
fn test_start_index_skips_earlier_declarations() {
    let decls = vec![
        Decl::Func(func(1, "old", vec![vec![]], Ty::Unit, Vec::new())),
        Decl::Func(func(2, "new", vec![vec![]], Ty::Unit, Vec::new())),
    ];
    let options = LoweringOptions {
        start_index: 1,
        ..LoweringOptions::default()
    };
    let (outcome, _) = try_lower(&unit(decls), options);
    let lowered = outcome.unwrap();

    assert!(lowered.artifact_id(&DeclarationKey::func(DeclId(1), 0)).is_none());
    assert!(lowered.artifact(&DeclarationKey::func(DeclId(2), 0)).unwrap().is_defined());
}

#[test]
fn test_closures_lower_to_internal_artifacts() {
    let closure = ClosureExpr {
        id: ClosureId(0),
        context: main_context(),
        loc: None,
        params: Vec::new(),
        result: Ty::Int,
        body: ClosureBody::Expr(Box::new(Expr::int(42))),
    };
    let closure_ty = Ty::function(Vec::new(), Ty::Int);
    let decls = vec![Decl::TopLevelCode(TopLevelCodeDecl {
        loc: None,
        body: vec![Stmt::Let {
            name: "answer".into(),
            init: Expr::new(ExprKind::Closure(Box::new(closure)), closure_ty),
        }],
    })];
    let lowered = lower(&unit(decls));

    let closure = lowered.artifact(&DeclarationKey::closure(ClosureId(0))).unwrap();
    assert_eq!(closure.name, "main.closure#0");
    assert_eq!(closure.linkage, Linkage::Internal);
    assert!(closure.body.last_block().unwrap().terminator.is_return());

    let top = lowered.artifact(&DeclarationKey::top_level()).unwrap();
    assert!(instructions(top).iter().any(|inst| matches!(
        inst,
        Instruction::FunctionRef { artifact, .. } if *artifact == closure.id
    )));
}

#[test]
fn test_unknown_reference_is_not_fatal() {
    let f = func(
        1,
        "f",
        vec![vec![]],
        Ty::Int,
        vec![Stmt::Return(Some(Expr::local("nope", Ty::Int)))],
    );
    let (outcome, sink) = try_lower(&unit(vec![Decl::Func(f)]), LoweringOptions::default());

    match outcome {
        Err(error @ LowerError::Unsupported { .. }) => assert!(!error.is_fatal()),
        other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
    }
    assert!(!sink.has_errors());
}
