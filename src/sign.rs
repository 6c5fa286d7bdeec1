//! Writes `.md5` and `.sha1` sidecar files for staged artifacts.
//!
//! Each sidecar holds exactly one line: the lower-case hex digest of the
//! staged copy followed by a newline. Signature files (names containing
//! "asc") get no sidecars.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::artifact::Artifact;
use crate::digest::FileDigests;
use crate::error::{DetachError, DetachResult};

/// Sidecar extension for MD5 digests
pub const MD5_EXTENSION: &str = "md5";

/// Sidecar extension for SHA-1 digests
pub const SHA1_EXTENSION: &str = "sha1";

/// Sidecars written for one staged artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sidecars {
    pub file_name: String,
    pub md5_path: PathBuf,
    pub sha1_path: PathBuf,
    pub digests: FileDigests,
}

/// `<dir>/<file_name>.<extension>`
pub fn sidecar_path(dir: &Path, file_name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", file_name, extension))
}

/// Write sidecars for every non-signature artifact staged in `dir`.
pub fn sign_artifacts(detached: &[Artifact], dir: &Path) -> DetachResult<Vec<Sidecars>> {
    let mut written = Vec::new();

    for artifact in detached {
        let Some(file_name) = artifact.file_name() else {
            continue;
        };
        if artifact.is_signature() {
            debug!(file = %file_name, "skipping signature file");
            continue;
        }
        written.push(sign_staged_file(dir, &file_name)?);
    }

    Ok(written)
}

/// Hash the staged copy of `file_name` and write both sidecars
pub fn sign_staged_file(dir: &Path, file_name: &str) -> DetachResult<Sidecars> {
    let wrap = |source: io::Error| DetachError::Sign {
        file_name: file_name.to_string(),
        source,
    };

    let digests = FileDigests::compute(&dir.join(file_name)).map_err(wrap)?;

    info!("{} md5: {}", file_name, digests.md5);
    let md5_path = sidecar_path(dir, file_name, MD5_EXTENSION);
    write_sidecar(&md5_path, &digests.md5).map_err(wrap)?;

    info!("{} sha1: {}", file_name, digests.sha1);
    let sha1_path = sidecar_path(dir, file_name, SHA1_EXTENSION);
    write_sidecar(&sha1_path, &digests.sha1).map_err(wrap)?;

    Ok(Sidecars {
        file_name: file_name.to_string(),
        md5_path,
        sha1_path,
        digests,
    })
}

/// Truncate `path` and write `digest` plus a newline. The handle closes on drop.
fn write_sidecar(path: &Path, digest: &str) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", digest)?;
    writer.flush()
}
