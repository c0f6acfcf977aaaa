use crate::{
    artifact::{Linkage, Parameter, Signature},
    builder::BodyBuilder,
    module::IrModule,
    types::Type,
    IrError,
};
use pretty_assertions::assert_eq;

#[test]
fn test_declared_artifact_is_external_declaration() {
    let mut module = IrModule::new("main");
    let id = module.declare_artifact(
        "main.f".into(),
        Linkage::External,
        Signature::new(vec![Parameter::new("x", Type::Int(64))], Type::Int(64)),
    );

    let artifact = module.artifact(id).unwrap();
    assert!(artifact.is_external_declaration());
    assert_eq!(artifact.signature.param_types(), vec![Type::Int(64)]);
}

#[test]
fn test_define_twice_is_an_error() {
    let mut module = IrModule::new("main");
    let id = module.declare_artifact("main.f".into(), Linkage::Internal, Signature::thin(Type::Unit));

    let mut builder = BodyBuilder::new();
    builder.create_entry_block(&[]);
    builder.ret(builder.unit_value()).unwrap();
    let body = builder.finish();

    module.artifact_mut(id).unwrap().define(body.clone()).unwrap();
    let err = module.artifact_mut(id).unwrap().define(body).unwrap_err();
    assert_eq!(err, IrError::AlreadyDefined("main.f".into()));
}

#[test]
fn test_globals_are_deduplicated_by_name() {
    let mut module = IrModule::new("main");
    let first = module.add_global("main.counter", Type::Int(64), None);
    let second = module.add_global("main.counter", Type::Int(64), None);
    let other = module.add_global("main.flag", Type::Bool, None);

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(module.global(other).unwrap().name, "main.flag");
}

#[test]
fn test_module_serializes() {
    let mut module = IrModule::new("main");
    module.declare_artifact("main.f".into(), Linkage::External, Signature::thin(Type::Bool));
    let json = serde_json::to_string(&module).unwrap();
    assert!(json.contains("main.f"));
}
