use loam_ast::{FuncDecl, NominalKind, NominalRef, Param, SourceLoc, Ty};
use loam_core::{Parameter, Signature, SourceLocation, Type};

pub fn lower_type(ty: &Ty) -> Type {
    match ty {
        Ty::Unit => Type::Unit,
        Ty::Bool => Type::Bool,
        Ty::Int => Type::Int(64),
        Ty::String => Type::String,
        Ty::HostString => Type::HostString,
        Ty::HostBool => Type::HostBool,
        Ty::Nominal(nominal) => lower_nominal(nominal),
        Ty::Tuple(elements) if elements.is_empty() => Type::Unit,
        Ty::Tuple(elements) => Type::Tuple(elements.iter().map(lower_type).collect()),
        Ty::Function(ft) => Type::function(
            ft.params.iter().map(lower_type).collect(),
            lower_type(&ft.result),
        ),
        Ty::InOut(inner) => Type::address_of(lower_type(inner)),
        Ty::Generic(name) => Type::Generic(name.clone()),
    }
}

pub fn lower_nominal(nominal: &NominalRef) -> Type {
    match nominal.kind {
        NominalKind::Struct => Type::Struct(nominal.name.clone()),
        NominalKind::Class => Type::Class(nominal.name.clone()),
    }
}

pub fn lower_location(loc: Option<&SourceLoc>) -> Option<SourceLocation> {
    loc.map(|l| SourceLocation::new(l.file.clone(), l.line, l.column))
}

/// Representation of a native type on the host side of an interop thunk.
pub fn bridged_type(ty: &Type) -> Type {
    match ty {
        Type::String => Type::HostString,
        Type::Bool => Type::HostBool,
        other => other.clone(),
    }
}

pub fn interop_signature(native: &Signature) -> Signature {
    Signature {
        generic_params: native.generic_params.clone(),
        params: native
            .params
            .iter()
            .map(|p| Parameter::new(p.name.clone(), bridged_type(&p.param_type)))
            .collect(),
        result: bridged_type(&native.result),
    }
}

fn lower_params(params: &[Param]) -> Vec<Parameter> {
    params
        .iter()
        .map(|p| Parameter::new(p.name.clone(), lower_type(&p.ty)))
        .collect()
}

fn self_parameter(self_ty: &Ty) -> Parameter {
    Parameter::new("self", lower_type(self_ty))
}

/// Parameter clauses of `decl` in application order: the implicit `self`
/// clause first for methods, then the explicit clauses.
fn application_clauses(decl: &FuncDecl) -> Vec<Vec<Parameter>> {
    let mut clauses = Vec::new();
    if let Some(self_ty) = &decl.self_ty {
        clauses.push(vec![self_parameter(self_ty)]);
    }
    if decl.param_clauses.is_empty() {
        clauses.push(Vec::new());
    }
    for clause in &decl.param_clauses {
        clauses.push(lower_params(&clause.params));
    }
    clauses
}

fn curried_result(rest: &[Vec<Parameter>], result: &Ty) -> Type {
    match rest.split_first() {
        None => lower_type(result),
        Some((clause, rest)) => Type::function(
            clause.iter().map(|p| p.param_type.clone()).collect(),
            curried_result(rest, result),
        ),
    }
}

/// Signature of `decl` at `uncurry_level`: the first `uncurry_level + 1`
/// clauses are flattened into the parameter list (with `self` last) and the
/// remaining clauses become a curried function result.
pub fn func_signature(decl: &FuncDecl, uncurry_level: u32) -> Signature {
    let clauses = application_clauses(decl);
    let level = uncurry_level as usize;
    assert!(
        level < clauses.len(),
        "uncurry level {} out of range for `{}`",
        uncurry_level,
        decl.name
    );

    let (applied, rest) = clauses.split_at(level + 1);
    let mut params = Vec::new();
    let mut self_param = None;
    for (index, clause) in applied.iter().enumerate() {
        if index == 0 && decl.self_ty.is_some() {
            self_param = clause.first().cloned();
        } else {
            params.extend(clause.iter().cloned());
        }
    }
    params.extend(self_param);

    Signature::new(params, curried_result(rest, &decl.result))
        .with_generics(decl.generic_params.clone())
}

pub fn closure_signature(params: &[Param], result: &Ty) -> Signature {
    Signature::new(lower_params(params), lower_type(result))
}

/// `(params) -> Self`, allocating storage for classes.
pub fn allocator_signature(params: &[Param], self_ty: &NominalRef) -> Signature {
    Signature::new(lower_params(params), lower_nominal(self_ty))
}

/// `(params, self) -> Self`, initializing already allocated storage.
pub fn initializer_signature(params: &[Param], self_ty: &NominalRef) -> Signature {
    let mut lowered = lower_params(params);
    lowered.push(Parameter::new("self", lower_nominal(self_ty)));
    Signature::new(lowered, lower_nominal(self_ty))
}

pub fn destroyer_signature(class: &NominalRef) -> Signature {
    Signature::new(
        vec![Parameter::new("self", lower_nominal(class))],
        Type::Unit,
    )
}

/// `(indices, self?) -> T`
pub fn getter_signature(ty: &Ty, self_ty: Option<&Ty>, indices: &[Param]) -> Signature {
    let mut params = lower_params(indices);
    params.extend(self_ty.map(self_parameter));
    Signature::new(params, lower_type(ty))
}

/// `(value, indices, self?) -> ()`
pub fn setter_signature(
    ty: &Ty,
    value_name: &str,
    self_ty: Option<&Ty>,
    indices: &[Param],
) -> Signature {
    let mut params = vec![Parameter::new(value_name, lower_type(ty))];
    params.extend(lower_params(indices));
    params.extend(self_ty.map(self_parameter));
    Signature::new(params, Type::Unit)
}

pub fn default_arg_signature(ty: &Ty) -> Signature {
    Signature::thin(lower_type(ty))
}
