//! Build artifacts and the attached-artifact collection
//!
//! The build tool owns the artifacts; a run only reads their coordinates
//! and backing files and removes the detached ones from the collection.

mod list;
mod model;

pub use list::{ArtifactList, ArtifactListError};
pub use model::{Artifact, SIGNATURE_MARKER};

/// Mutable handle on the build's attached artifacts.
pub trait AttachedArtifacts {
    /// Current attached artifacts, in build order.
    fn attached(&self) -> &[Artifact];

    /// Remove the first artifact equal to `artifact`. Returns false if absent.
    fn remove(&mut self, artifact: &Artifact) -> bool;
}

impl AttachedArtifacts for Vec<Artifact> {
    fn attached(&self) -> &[Artifact] {
        self.as_slice()
    }

    fn remove(&mut self, artifact: &Artifact) -> bool {
        match self.iter().position(|a| a == artifact) {
            Some(index) => {
                Vec::remove(self, index);
                true
            }
            None => false,
        }
    }
}
