//! JSON-file-backed attached-artifact list
//!
//! Stands in for the build tool's project model: a JSON array of
//! artifacts loaded before the run and saved back after the detached
//! ones have been removed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Artifact, AttachedArtifacts};

/// Errors for artifact list files
#[derive(Debug, thiserror::Error)]
pub enum ArtifactListError {
    #[error("failed to read artifact list {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write artifact list {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid artifact list {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered list of attached artifacts.
///
/// Artifact files are resolved for reading, but `save` writes each `file`
/// back exactly as it was declared in the loaded list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactList {
    artifacts: Vec<Artifact>,
    declared: Vec<PathBuf>,
}

impl ArtifactList {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        let declared = artifacts.iter().map(|a| a.file.clone()).collect();
        Self {
            artifacts,
            declared,
        }
    }

    /// Artifacts with resolved backing files
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<Artifact>>(json).map(Self::new)
    }

    /// Serialize to JSON, with files as declared
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let entries: Vec<Artifact> = self
            .artifacts
            .iter()
            .zip(&self.declared)
            .map(|(artifact, file)| Artifact {
                file: file.clone(),
                ..artifact.clone()
            })
            .collect();
        serde_json::to_string_pretty(&entries)
    }

    /// Load from file. Relative artifact paths resolve against the list's directory.
    pub fn load(path: &Path) -> Result<Self, ArtifactListError> {
        let json = fs::read_to_string(path).map_err(|source| ArtifactListError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut list = Self::from_json(&json).map_err(|source| ArtifactListError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for artifact in &mut list.artifacts {
            artifact.resolve_file(base);
        }
        Ok(list)
    }

    /// Write to file, replacing any previous content
    pub fn save(&self, path: &Path) -> Result<(), ArtifactListError> {
        let json = self.to_json().map_err(|source| ArtifactListError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ArtifactListError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl AttachedArtifacts for ArtifactList {
    fn attached(&self) -> &[Artifact] {
        &self.artifacts
    }

    fn remove(&mut self, artifact: &Artifact) -> bool {
        match self.artifacts.iter().position(|a| a == artifact) {
            Some(index) => {
                self.artifacts.remove(index);
                self.declared.remove(index);
                true
            }
            None => false,
        }
    }
}
