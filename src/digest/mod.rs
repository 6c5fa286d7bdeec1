//! Content digests and the per-run digest map
//!
//! MD5 and SHA-1 hex digests over whole files, plus the `DigestMap` that
//! records the SHA-1 of every attached artifact and is persisted as
//! `sha1.properties` in the working directory.

pub mod properties;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use md5::Md5;
use serde::Serialize;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::artifact::Artifact;
use crate::error::{DetachError, DetachResult};

pub use properties::PropertiesError;

/// Name of the persisted digest map inside the working directory
pub const SHA1_PROPERTIES_FILE: &str = "sha1.properties";

/// Comment header written at the top of `sha1.properties`
pub const SHA1_PROPERTIES_COMMENT: &str = "release sha1s";

/// Lower-case hex MD5 (32 characters)
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Lower-case hex SHA-1 (40 characters)
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// MD5 and SHA-1 of a file's full contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDigests {
    pub md5: String,
    pub sha1: String,
}

impl FileDigests {
    /// Read the file once and compute both digests
    pub fn compute(path: &Path) -> io::Result<Self> {
        let contents = fs::read(path)?;
        Ok(Self {
            md5: md5_hex(&contents),
            sha1: sha1_hex(&contents),
        })
    }
}

/// SHA-1 of a file's full contents
pub fn sha1_file(path: &Path) -> io::Result<String> {
    Ok(sha1_hex(&fs::read(path)?))
}

/// Coordinate key -> SHA-1 hex of every artifact seen by a run.
///
/// Backed by a `BTreeMap` so iteration, and therefore the properties
/// file, is sorted by key. Recording the same key twice keeps the last
/// digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DigestMap {
    entries: BTreeMap<String, String>,
}

impl DigestMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a digest, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, digest: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), digest.into())
    }

    /// Hash the artifact's backing file and record it under its coordinate key
    pub fn record(&mut self, artifact: &Artifact) -> DetachResult<String> {
        let digest = sha1_file(&artifact.file).map_err(|source| DetachError::Digest {
            group_id: artifact.group_id.clone(),
            artifact_id: artifact.artifact_id.clone(),
            version: artifact.version.clone(),
            type_tag: artifact.type_tag.clone(),
            source,
        })?;

        let key = artifact.coordinate_key();
        debug!(key = %key, sha1 = %digest, "recorded artifact digest");
        self.entries.insert(key, digest.clone());
        Ok(digest)
    }

    /// Record every artifact, stopping at the first unreadable file
    pub fn record_all(&mut self, artifacts: &[Artifact]) -> DetachResult<()> {
        for artifact in artifacts {
            self.record(artifact)?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Persist as `sha1.properties` in `dir`, replacing any previous file
    pub fn write_properties(&self, dir: &Path) -> DetachResult<()> {
        let path = dir.join(SHA1_PROPERTIES_FILE);
        properties::store(&path, self.iter(), SHA1_PROPERTIES_COMMENT)
            .map_err(|source| DetachError::WriteProperties { path, source })
    }

    /// Load a previously written `sha1.properties`
    pub fn read_properties(path: &Path) -> Result<Self, PropertiesError> {
        let entries = properties::load(path)?;
        Ok(Self { entries })
    }
}

impl FromIterator<(String, String)> for DigestMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
