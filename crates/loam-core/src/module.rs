use crate::artifact::{Artifact, ArtifactId, Linkage, Signature};
use crate::source_location::SourceLocation;
use crate::types::Type;
use crate::values::GlobalId;
use crate::{IrError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrModule {
    pub name: String,
    pub artifacts: Vec<Artifact>,
    pub globals: IndexMap<String, GlobalVariable>,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifacts: Vec::new(),
            globals: IndexMap::new(),
        }
    }

    pub fn declare_artifact(
        &mut self,
        name: String,
        linkage: Linkage,
        signature: Signature,
    ) -> ArtifactId {
        let id = ArtifactId(self.artifacts.len() as u32);
        self.artifacts
            .push(Artifact::declare(id, name, linkage, signature));
        id
    }

    pub fn artifact(&self, id: ArtifactId) -> Result<&Artifact> {
        self.artifacts
            .get(id.index())
            .ok_or(IrError::UnknownArtifact(id))
    }

    pub fn artifact_mut(&mut self, id: ArtifactId) -> Result<&mut Artifact> {
        self.artifacts
            .get_mut(id.index())
            .ok_or(IrError::UnknownArtifact(id))
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn find_artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    pub fn defined_artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(|a| a.is_defined())
    }

    /// Registers stored global storage. Registering a name twice returns the
    /// existing id.
    pub fn add_global(
        &mut self,
        name: impl Into<String>,
        ty: Type,
        location: Option<SourceLocation>,
    ) -> GlobalId {
        let name = name.into();
        if let Some(existing) = self.globals.get(&name) {
            return existing.id;
        }
        let id = GlobalId(self.globals.len() as u32);
        self.globals.insert(
            name.clone(),
            GlobalVariable {
                id,
                name,
                ty,
                location,
            },
        );
        id
    }

    pub fn global(&self, id: GlobalId) -> Option<&GlobalVariable> {
        self.globals.get_index(id.0 as usize).map(|(_, g)| g)
    }

    pub fn find_global(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.get(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub id: GlobalId,
    pub name: String,
    pub ty: Type,
    pub location: Option<SourceLocation>,
}
