use crate::block::{BasicBlock, BlockId};
use crate::source_location::SourceLocation;
use crate::types::{FunctionType, Type};
use crate::{IrError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId(pub u32);

impl ArtifactId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Linkage {
    External,
    Internal,
    ForeignThunk,
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Linkage::External => "external",
            Linkage::Internal => "internal",
            Linkage::ForeignThunk => "foreign_thunk",
        };
        f.write_str(name)
    }
}

/// An IR function. Starts life as a declaration (signature only) and becomes
/// defined once a body is installed through [`Artifact::define`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub name: String,
    pub linkage: Linkage,
    pub signature: Signature,
    pub debug_scope: Option<DebugScope>,
    pub location: Option<SourceLocation>,
    pub body: FunctionBody,
}

impl Artifact {
    pub fn declare(id: ArtifactId, name: String, linkage: Linkage, signature: Signature) -> Self {
        Self {
            id,
            name,
            linkage,
            signature,
            debug_scope: None,
            location: None,
            body: FunctionBody::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_external_declaration(&self) -> bool {
        self.body.is_empty()
    }

    pub fn is_defined(&self) -> bool {
        !self.body.is_empty()
    }

    pub fn define(&mut self, body: FunctionBody) -> Result<()> {
        if self.is_defined() {
            return Err(IrError::AlreadyDefined(self.name.clone()));
        }
        self.body = body;
        Ok(())
    }

    pub fn function_type(&self) -> FunctionType {
        self.signature.function_type()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub generic_params: Vec<String>,
    pub params: Vec<Parameter>,
    pub result: Type,
}

impl Signature {
    pub fn new(params: Vec<Parameter>, result: Type) -> Self {
        Self {
            generic_params: Vec::new(),
            params,
            result,
        }
    }

    pub fn thin(result: Type) -> Self {
        Self::new(Vec::new(), result)
    }

    pub fn with_generics(mut self, generic_params: Vec<String>) -> Self {
        self.generic_params = generic_params;
        self
    }

    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.param_type.clone()).collect()
    }

    pub fn function_type(&self) -> FunctionType {
        FunctionType {
            generic_params: self.generic_params.clone(),
            params: self.param_types(),
            result: self.result.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: Type,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: Type) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

/// A scope with no location is the "void" scope used for synthesized code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugScope {
    pub location: Option<SourceLocation>,
}

impl DebugScope {
    pub fn at(location: Option<SourceLocation>) -> Self {
        Self { location }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionBody {
    pub blocks: IndexMap<BlockId, BasicBlock>,
    next_block_id: u32,
    next_temp_id: u32,
}

impl FunctionBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.blocks.keys().next().copied()
    }

    pub fn create_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, BasicBlock::new(id));
        id
    }

    pub fn get_block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn get_block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(&id)
    }

    pub fn next_temp(&mut self) -> u32 {
        let id = self.next_temp_id;
        self.next_temp_id += 1;
        id
    }

    pub fn last_block(&self) -> Option<&BasicBlock> {
        self.blocks.values().last()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &crate::instructions::Instruction> {
        self.blocks.values().flat_map(|block| block.instructions.iter())
    }
}
