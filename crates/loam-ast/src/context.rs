use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    Source,
    /// A module imported from the foreign host runtime.
    Foreign,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRef {
    pub name: String,
    pub kind: ModuleKind,
}

impl ModuleRef {
    pub fn source(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModuleKind::Source,
        }
    }

    pub fn foreign(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModuleKind::Foreign,
        }
    }

    pub fn is_foreign(&self) -> bool {
        self.kind == ModuleKind::Foreign
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextFrame {
    Type { decl: DeclId, name: String },
    Function { decl: DeclId, name: String },
    Closure { index: u32 },
}

impl ContextFrame {
    pub fn is_local(&self) -> bool {
        matches!(self, ContextFrame::Function { .. } | ContextFrame::Closure { .. })
    }
}

/// Lexical position of a declaration: its module plus the enclosing frames,
/// outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclContext {
    pub module: ModuleRef,
    pub frames: Vec<ContextFrame>,
}

impl DeclContext {
    pub fn module(module: ModuleRef) -> Self {
        Self {
            module,
            frames: Vec::new(),
        }
    }

    pub fn nested(&self, frame: ContextFrame) -> Self {
        let mut frames = self.frames.clone();
        frames.push(frame);
        Self {
            module: self.module.clone(),
            frames,
        }
    }

    pub fn is_module_scope(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_local(&self) -> bool {
        self.frames.iter().rev().any(ContextFrame::is_local)
    }

    pub fn is_type_context(&self) -> bool {
        matches!(self.frames.last(), Some(ContextFrame::Type { .. }))
    }

    /// Dotted path segments used for mangling, module first.
    pub fn path(&self) -> Vec<String> {
        let mut path = vec![self.module.name.clone()];
        for frame in &self.frames {
            match frame {
                ContextFrame::Type { name, .. } | ContextFrame::Function { name, .. } => {
                    path.push(name.clone())
                }
                ContextFrame::Closure { index } => path.push(format!("closure#{}", index)),
            }
        }
        path
    }
}
