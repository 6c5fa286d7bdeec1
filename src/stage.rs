//! Copies detached artifacts into the working directory.
//!
//! The working directory is flat: each artifact lands under its original
//! base name and replaces any file of that name left by an earlier run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::artifact::Artifact;
use crate::error::{DetachError, DetachResult};

/// Create the working directory and any missing parents
pub fn ensure_working_directory(dir: &Path) -> DetachResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    info!(path = %dir.display(), "creating working directory");
    fs::create_dir_all(dir).map_err(|source| DetachError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

/// Destination of an artifact inside the working directory
pub fn staged_path(dir: &Path, artifact: &Artifact) -> Option<PathBuf> {
    artifact.file.file_name().map(|name| dir.join(name))
}

/// Copy every detached artifact into `dir`, returning the staged paths in order.
///
/// Stops at the first failed copy; files already copied are left in place.
pub fn stage_artifacts(detached: &[Artifact], dir: &Path) -> DetachResult<Vec<PathBuf>> {
    ensure_working_directory(dir)?;
    info!("Copying detached artifacts to working directory.");

    let mut staged = Vec::with_capacity(detached.len());
    for artifact in detached {
        staged.push(stage_artifact(artifact, dir)?);
    }
    Ok(staged)
}

fn stage_artifact(artifact: &Artifact, dir: &Path) -> DetachResult<PathBuf> {
    let destination = staged_path(dir, artifact).ok_or_else(|| DetachError::Copy {
        from: artifact.file.clone(),
        to: dir.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "artifact path has no file name"),
    })?;

    info!("Copying: {}", artifact.file_name().unwrap_or_default());
    fs::copy(&artifact.file, &destination).map_err(|source| DetachError::Copy {
        from: artifact.file.clone(),
        to: destination.clone(),
        source,
    })?;
    Ok(destination)
}
