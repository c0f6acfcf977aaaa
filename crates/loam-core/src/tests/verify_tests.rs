use crate::{
    artifact::{ArtifactId, Linkage, Parameter, Signature},
    builder::BodyBuilder,
    module::IrModule,
    types::Type,
    verify::{StructuralVerifier, Verifier, VerifyError},
};

fn module_with(signature: Signature, build: impl FnOnce(&mut BodyBuilder)) -> (IrModule, ArtifactId) {
    let mut module = IrModule::new("main");
    let id = module.declare_artifact("main.f".into(), Linkage::External, signature);
    let mut builder = BodyBuilder::new();
    build(&mut builder);
    module.artifact_mut(id).unwrap().define(builder.finish()).unwrap();
    (module, id)
}

#[test]
fn test_well_formed_artifact_passes() {
    let (module, id) = module_with(Signature::thin(Type::Unit), |b| {
        b.create_entry_block(&[]);
        b.ret(b.unit_value()).unwrap();
    });
    assert!(StructuralVerifier.verify_artifact(&module, id).is_ok());
    assert!(StructuralVerifier.verify_module(&module).is_ok());
}

#[test]
fn test_open_block_is_reported() {
    let (module, id) = module_with(Signature::thin(Type::Unit), |b| {
        b.create_entry_block(&[]);
    });
    let err = StructuralVerifier.verify_artifact(&module, id).unwrap_err();
    assert!(matches!(err, VerifyError::Unterminated { .. }));
}

#[test]
fn test_entry_arity_mismatch_is_reported() {
    let signature = Signature::new(vec![Parameter::new("x", Type::Bool)], Type::Unit);
    let (module, id) = module_with(signature, |b| {
        b.create_entry_block(&[]);
        b.ret(b.unit_value()).unwrap();
    });
    let err = StructuralVerifier.verify_artifact(&module, id).unwrap_err();
    assert_eq!(
        err,
        VerifyError::EntryArity {
            artifact: "main.f".into(),
            expected: 1,
            found: 0
        }
    );
}

#[test]
fn test_dangling_function_ref_is_reported() {
    let (module, id) = module_with(Signature::thin(Type::Unit), |b| {
        b.create_entry_block(&[]);
        b.function_ref(ArtifactId(42)).unwrap();
        b.ret(b.unit_value()).unwrap();
    });
    let err = StructuralVerifier.verify_artifact(&module, id).unwrap_err();
    assert!(matches!(err, VerifyError::DanglingFunctionRef { .. }));
}

#[test]
fn test_declaration_is_not_verifiable_as_definition() {
    let mut module = IrModule::new("main");
    let id = module.declare_artifact("main.g".into(), Linkage::External, Signature::thin(Type::Unit));
    let err = StructuralVerifier.verify_artifact(&module, id).unwrap_err();
    assert!(matches!(err, VerifyError::NotDefined { .. }));
    // Declarations are skipped at module level.
    assert!(StructuralVerifier.verify_module(&module).is_ok());
}

#[test]
fn test_duplicate_names_are_reported() {
    let mut module = IrModule::new("main");
    module.declare_artifact("main.g".into(), Linkage::External, Signature::thin(Type::Unit));
    module.declare_artifact("main.g".into(), Linkage::External, Signature::thin(Type::Unit));
    assert_eq!(
        StructuralVerifier.verify_module(&module).unwrap_err(),
        VerifyError::DuplicateName("main.g".into())
    );
}
