use crate::artifact::{Artifact, ArtifactId};
use crate::block::{BlockId, Terminator};
use crate::module::IrModule;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("artifact {0} does not exist")]
    UnknownArtifact(ArtifactId),
    #[error("`{artifact}`: expected a defined artifact, found an external declaration")]
    NotDefined { artifact: String },
    #[error("`{artifact}`: entry block takes {found} parameters, signature has {expected}")]
    EntryArity {
        artifact: String,
        expected: usize,
        found: usize,
    },
    #[error("`{artifact}`: block {block} is not terminated")]
    Unterminated { artifact: String, block: BlockId },
    #[error("`{artifact}`: block {block} branches to missing block {target}")]
    DanglingBranch {
        artifact: String,
        block: BlockId,
        target: BlockId,
    },
    #[error("`{artifact}`: reference to missing artifact {target}")]
    DanglingFunctionRef {
        artifact: String,
        target: ArtifactId,
    },
    #[error("artifact name `{0}` is defined more than once")]
    DuplicateName(String),
}

pub trait Verifier {
    fn verify_artifact(&self, module: &IrModule, id: ArtifactId) -> Result<(), VerifyError>;

    fn verify_module(&self, module: &IrModule) -> Result<(), VerifyError> {
        for artifact in module.defined_artifacts() {
            self.verify_artifact(module, artifact.id)?;
        }
        Ok(())
    }
}

/// Checks the structural well-formedness rules every finished artifact obeys.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralVerifier;

impl StructuralVerifier {
    pub fn new() -> Self {
        Self
    }

    fn check_blocks(&self, module: &IrModule, artifact: &Artifact) -> Result<(), VerifyError> {
        let name = || artifact.name.clone();

        for (id, block) in &artifact.body.blocks {
            if matches!(block.terminator, Terminator::Invalid) {
                return Err(VerifyError::Unterminated {
                    artifact: name(),
                    block: *id,
                });
            }
            for target in block.successors() {
                if !artifact.body.blocks.contains_key(&target) {
                    return Err(VerifyError::DanglingBranch {
                        artifact: name(),
                        block: *id,
                        target,
                    });
                }
            }
            for inst in &block.instructions {
                if let Some(target) = inst.referenced_artifact() {
                    if module.artifact(target).is_err() {
                        return Err(VerifyError::DanglingFunctionRef {
                            artifact: name(),
                            target,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl Verifier for StructuralVerifier {
    fn verify_artifact(&self, module: &IrModule, id: ArtifactId) -> Result<(), VerifyError> {
        let artifact = module
            .artifact(id)
            .map_err(|_| VerifyError::UnknownArtifact(id))?;

        let entry = artifact
            .body
            .entry_block()
            .and_then(|entry| artifact.body.get_block(entry))
            .ok_or_else(|| VerifyError::NotDefined {
                artifact: artifact.name.clone(),
            })?;

        if entry.params.len() != artifact.signature.params.len() {
            return Err(VerifyError::EntryArity {
                artifact: artifact.name.clone(),
                expected: artifact.signature.params.len(),
                found: entry.params.len(),
            });
        }

        self.check_blocks(module, artifact)
    }

    fn verify_module(&self, module: &IrModule) -> Result<(), VerifyError> {
        let mut seen = HashSet::new();
        for artifact in module.artifacts() {
            if !seen.insert(artifact.name.as_str()) {
                return Err(VerifyError::DuplicateName(artifact.name.clone()));
            }
        }
        for artifact in module.defined_artifacts() {
            self.verify_artifact(module, artifact.id)?;
        }
        Ok(())
    }
}
