use crate::context::DeclId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NominalKind {
    Struct,
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NominalRef {
    pub decl: DeclId,
    pub name: String,
    pub kind: NominalKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionTy {
    pub params: Vec<Ty>,
    pub result: Box<Ty>,
}

/// Resolved source-level types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    Unit,
    Bool,
    Int,
    String,
    HostString,
    HostBool,
    Nominal(NominalRef),
    Tuple(Vec<Ty>),
    Function(FunctionTy),
    InOut(Box<Ty>),
    Generic(String),
}

impl Ty {
    pub fn function(params: Vec<Ty>, result: Ty) -> Self {
        Ty::Function(FunctionTy {
            params,
            result: Box::new(result),
        })
    }

    pub fn class(decl: DeclId, name: impl Into<String>) -> Self {
        Ty::Nominal(NominalRef {
            decl,
            name: name.into(),
            kind: NominalKind::Class,
        })
    }

    pub fn structure(decl: DeclId, name: impl Into<String>) -> Self {
        Ty::Nominal(NominalRef {
            decl,
            name: name.into(),
            kind: NominalKind::Struct,
        })
    }

    pub fn is_void(&self) -> bool {
        match self {
            Ty::Unit => true,
            Ty::Tuple(elements) => elements.is_empty(),
            _ => false,
        }
    }

    pub fn nominal(&self) -> Option<&NominalRef> {
        match self {
            Ty::Nominal(nominal) => Some(nominal),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Ty::Nominal(NominalRef { kind: NominalKind::Class, .. }))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Unit => write!(f, "()"),
            Ty::Bool => write!(f, "Bool"),
            Ty::Int => write!(f, "Int"),
            Ty::String => write!(f, "String"),
            Ty::HostString => write!(f, "NSString"),
            Ty::HostBool => write!(f, "ObjCBool"),
            Ty::Nominal(nominal) => write!(f, "{}", nominal.name),
            Ty::Tuple(elements) => {
                let parts: Vec<String> = elements.iter().map(|t| t.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            Ty::Function(ft) => {
                let parts: Vec<String> = ft.params.iter().map(|t| t.to_string()).collect();
                write!(f, "({}) -> {}", parts.join(", "), ft.result)
            }
            Ty::InOut(inner) => write!(f, "inout {}", inner),
            Ty::Generic(name) => write!(f, "{}", name),
        }
    }
}
