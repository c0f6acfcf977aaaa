use crate::bridging::BridgingFunction;
use loam_ast::{ClosureId, DeclId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyBase {
    Decl(DeclId),
    Closure(ClosureId),
    /// The implicit main sequence of top-level statements.
    TopLevel,
    /// A helper defined in another module. Lookup ids are not unit ids, so
    /// these never share a base with the unit's declarations.
    Bridging(BridgingFunction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyKind {
    Func,
    /// Allocating entry point of a constructor. For value types this is the
    /// only constructor artifact.
    Allocator,
    Initializer,
    Destroyer,
    Getter,
    Setter,
    /// Generator for the default value of the n-th parameter.
    DefaultArgGenerator(u32),
}

/// Identity of one emittable artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclarationKey {
    pub base: KeyBase,
    pub kind: KeyKind,
    pub uncurry_level: u32,
    /// Entry point callable from the foreign host runtime.
    pub foreign: bool,
}

impl DeclarationKey {
    pub fn new(base: KeyBase, kind: KeyKind, uncurry_level: u32) -> Self {
        Self {
            base,
            kind,
            uncurry_level,
            foreign: false,
        }
    }

    pub fn func(decl: DeclId, uncurry_level: u32) -> Self {
        Self::new(KeyBase::Decl(decl), KeyKind::Func, uncurry_level)
    }

    pub fn closure(closure: ClosureId) -> Self {
        Self::new(KeyBase::Closure(closure), KeyKind::Func, 0)
    }

    pub fn top_level() -> Self {
        Self::new(KeyBase::TopLevel, KeyKind::Func, 0)
    }

    pub fn bridging(function: BridgingFunction) -> Self {
        Self::new(KeyBase::Bridging(function), KeyKind::Func, 0)
    }

    pub fn allocator(ctor: DeclId) -> Self {
        Self::new(KeyBase::Decl(ctor), KeyKind::Allocator, 0)
    }

    pub fn initializer(ctor: DeclId) -> Self {
        Self::new(KeyBase::Decl(ctor), KeyKind::Initializer, 0)
    }

    /// Keyed by the class declaration, so implicit destroyers have a key too.
    pub fn destroyer(class: DeclId) -> Self {
        Self::new(KeyBase::Decl(class), KeyKind::Destroyer, 0)
    }

    pub fn getter(decl: DeclId) -> Self {
        Self::new(KeyBase::Decl(decl), KeyKind::Getter, 0)
    }

    pub fn setter(decl: DeclId) -> Self {
        Self::new(KeyBase::Decl(decl), KeyKind::Setter, 0)
    }

    pub fn default_arg(decl: DeclId, index: u32) -> Self {
        Self::new(KeyBase::Decl(decl), KeyKind::DefaultArgGenerator(index), 0)
    }

    pub fn as_foreign(self) -> Self {
        Self {
            foreign: true,
            ..self
        }
    }

    pub fn as_native(self) -> Self {
        Self {
            foreign: false,
            ..self
        }
    }

    pub fn decl(&self) -> Option<DeclId> {
        match self.base {
            KeyBase::Decl(id) => Some(id),
            KeyBase::Closure(_) | KeyBase::TopLevel | KeyBase::Bridging(_) => None,
        }
    }
}

impl fmt::Display for DeclarationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base {
            KeyBase::Decl(id) => write!(f, "{}", id)?,
            KeyBase::Closure(id) => write!(f, "closure#{}", id.0)?,
            KeyBase::TopLevel => write!(f, "top-level")?,
            KeyBase::Bridging(function) => write!(f, "bridging:{}", function)?,
        }
        match self.kind {
            KeyKind::Func => {}
            KeyKind::Allocator => write!(f, ".allocator")?,
            KeyKind::Initializer => write!(f, ".initializer")?,
            KeyKind::Destroyer => write!(f, ".destroyer")?,
            KeyKind::Getter => write!(f, ".getter")?,
            KeyKind::Setter => write!(f, ".setter")?,
            KeyKind::DefaultArgGenerator(index) => write!(f, ".default_arg{}", index)?,
        }
        write!(f, "@{}", self.uncurry_level)?;
        if self.foreign {
            write!(f, ".foreign")?;
        }
        Ok(())
    }
}
