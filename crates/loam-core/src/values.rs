use crate::types::Type;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Param(ParamId),
    Temp(TempId),
    Constant(Constant),
    Undefined,
}

impl Value {
    pub fn unit() -> Self {
        Value::Constant(Constant::Unit)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_temp(&self) -> Option<TempId> {
        match self {
            Value::Temp(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Param(p) => write!(f, "{}", p),
            Value::Temp(t) => write!(f, "{}", t),
            Value::Constant(c) => write!(f, "{}", c),
            Value::Undefined => write!(f, "undef"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId(pub u32);

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%arg{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempId(pub u32);

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Unit,
    Bool(bool),
    Int(BigInt, u16),
    String(String),
}

impl Constant {
    pub fn int(value: i64, bits: u16) -> Self {
        Constant::Int(BigInt::from(value), bits)
    }

    pub fn ty(&self) -> Type {
        match self {
            Constant::Unit => Type::Unit,
            Constant::Bool(_) => Type::Bool,
            Constant::Int(_, bits) => Type::Int(*bits),
            Constant::String(_) => Type::String,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Unit => write!(f, "()"),
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Int(value, bits) => write!(f, "{}:i{}", value, bits),
            Constant::String(s) => write!(f, "{:?}", s),
        }
    }
}
