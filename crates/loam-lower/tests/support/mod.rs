#![allow(dead_code)]

use loam_ast::{
    ConstructorDecl, ContextFrame, Decl, DeclContext, DeclId, FieldDecl, FuncDecl, ModuleRef,
    NominalDecl, NominalKind, Param, ParamClause, Stmt, Storage, TranslationUnit, Ty, VarDecl,
};
use loam_core::{Artifact, Instruction, IrModule, StructuralVerifier, Verifier};
use loam_lower::{
    CollectingSink, LowerError, LoweredModule, LoweringOptions, ModuleLowering, ModuleTable,
};

pub fn main_context() -> DeclContext {
    DeclContext::module(ModuleRef::source("main"))
}

pub fn func(id: u32, name: &str, clauses: Vec<Vec<Param>>, result: Ty, body: Vec<Stmt>) -> FuncDecl {
    FuncDecl {
        id: DeclId(id),
        name: name.to_string(),
        context: main_context(),
        loc: None,
        generic_params: Vec::new(),
        param_clauses: clauses.into_iter().map(ParamClause::new).collect(),
        result,
        body: Some(body),
        accessor: None,
        self_ty: None,
        interop: false,
    }
}

pub fn int_param(name: &str) -> Param {
    Param::new(name, Ty::Int)
}

pub fn nominal(id: u32, name: &str, kind: NominalKind, fields: Vec<FieldDecl>) -> NominalDecl {
    NominalDecl {
        id: DeclId(id),
        name: name.to_string(),
        kind,
        context: main_context(),
        loc: None,
        superclass: None,
        fields,
        members: Vec::new(),
    }
}

pub fn constructor(id: u32, owner: &NominalDecl, params: Vec<Param>, body: Vec<Stmt>) -> ConstructorDecl {
    ConstructorDecl {
        id: DeclId(id),
        context: member_context(owner),
        loc: None,
        self_ty: owner.nominal_ref(),
        params,
        body: Some(body),
    }
}

pub fn member_context(owner: &NominalDecl) -> DeclContext {
    owner.context.nested(ContextFrame::Type {
        decl: owner.id,
        name: owner.name.clone(),
    })
}

pub fn global_var(id: u32, name: &str, ty: Ty, storage: Storage) -> VarDecl {
    VarDecl {
        id: DeclId(id),
        name: name.to_string(),
        context: main_context(),
        loc: None,
        ty,
        storage,
        self_ty: None,
        interop: false,
    }
}

pub fn unit(decls: Vec<Decl>) -> TranslationUnit {
    TranslationUnit::new(ModuleRef::source("main"), decls)
}

pub fn bridging_table() -> ModuleTable {
    ModuleTable::with_bridging_support("Foundation", "ObjectiveC")
}

pub fn try_lower(
    unit: &TranslationUnit,
    options: LoweringOptions,
) -> (Result<LoweredModule, LowerError>, CollectingSink) {
    let table = bridging_table();
    let mut sink = CollectingSink::new();
    let outcome = ModuleLowering::new(unit, options, &table, &mut sink).lower();
    (outcome, sink)
}

pub fn lower(unit: &TranslationUnit) -> LoweredModule {
    let (outcome, sink) = try_lower(unit, LoweringOptions::default());
    assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
    match outcome {
        Ok(lowered) => lowered,
        Err(error) => panic!("lowering failed: {}", error),
    }
}

pub fn instructions(artifact: &Artifact) -> Vec<&Instruction> {
    artifact.body.instructions().collect()
}

pub fn mnemonics(artifact: &Artifact) -> Vec<&'static str> {
    artifact.body.instructions().map(Instruction::mnemonic).collect()
}

/// Every defined artifact passes the structural verifier.
pub fn assert_well_formed(module: &IrModule) {
    let verifier = StructuralVerifier::new();
    if let Err(error) = verifier.verify_module(module) {
        panic!("{}", error);
    }
    for artifact in module.defined_artifacts() {
        assert!(
            artifact.body.blocks.values().all(|block| block.is_terminated()),
            "`{}` has an open block",
            artifact.name
        );
    }
}
