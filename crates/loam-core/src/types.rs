use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowered types. Host types are the foreign runtime's native representations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Unit,
    Bool,
    Int(u16),
    String,
    HostString,
    HostBool,
    Struct(String),
    Class(String),
    Tuple(Vec<Type>),
    Address(Box<Type>),
    Function(Box<FunctionType>),
    Generic(String),
}

impl Type {
    pub fn function(params: Vec<Type>, result: Type) -> Self {
        Type::Function(Box::new(FunctionType::new(params, result)))
    }

    pub fn address_of(ty: Type) -> Self {
        Type::Address(Box::new(ty))
    }

    pub fn is_unit(&self) -> bool {
        match self {
            Type::Unit => true,
            Type::Tuple(elements) => elements.is_empty(),
            _ => false,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Function(_) | Type::HostString)
    }

    pub fn is_address(&self) -> bool {
        matches!(self, Type::Address(_))
    }

    pub fn is_generic(&self) -> bool {
        match self {
            Type::Generic(_) => true,
            Type::Tuple(elements) => elements.iter().any(Type::is_generic),
            Type::Address(inner) => inner.is_generic(),
            Type::Function(ft) => ft.is_polymorphic(),
            _ => false,
        }
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Address(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(ft) => Some(ft),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unit => write!(f, "()"),
            Type::Bool => write!(f, "bool"),
            Type::Int(bits) => write!(f, "i{}", bits),
            Type::String => write!(f, "string"),
            Type::HostString => write!(f, "host_string"),
            Type::HostBool => write!(f, "host_bool"),
            Type::Struct(name) => write!(f, "struct {}", name),
            Type::Class(name) => write!(f, "class {}", name),
            Type::Tuple(elements) => {
                let parts: Vec<String> = elements.iter().map(|t| t.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            Type::Address(inner) => write!(f, "*{}", inner),
            Type::Function(ft) => write!(f, "{}", ft),
            Type::Generic(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
    pub generic_params: Vec<String>,
    pub params: Vec<Type>,
    pub result: Type,
}

impl FunctionType {
    pub fn new(params: Vec<Type>, result: Type) -> Self {
        Self {
            generic_params: Vec::new(),
            params,
            result,
        }
    }

    pub fn is_polymorphic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_polymorphic() {
            write!(f, "<{}> ", self.generic_params.join(", "))?;
        }
        let params: Vec<String> = self.params.iter().map(|t| t.to_string()).collect();
        write!(f, "({}) -> {}", params.join(", "), self.result)
    }
}
