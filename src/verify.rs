//! Re-verification of a working directory left by an earlier run
//!
//! Checks, without modifying anything:
//! 1. sha1.properties exists, parses, and every value is a 40-character hex digest
//! 2. every sidecar holds exactly one lower-case hex line of the right length
//! 3. every sidecar matches a fresh digest of the staged file it names
//! 4. every staged non-signature file has both sidecars

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use crate::artifact::SIGNATURE_MARKER;
use crate::digest::{DigestMap, FileDigests, SHA1_PROPERTIES_FILE};
use crate::sign::{MD5_EXTENSION, SHA1_EXTENSION};

/// Sidecar kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SidecarKind {
    Md5,
    Sha1,
}

impl SidecarKind {
    pub fn extension(&self) -> &'static str {
        match self {
            SidecarKind::Md5 => MD5_EXTENSION,
            SidecarKind::Sha1 => SHA1_EXTENSION,
        }
    }

    /// Hex length of the digest
    pub fn hex_len(&self) -> usize {
        match self {
            SidecarKind::Md5 => 32,
            SidecarKind::Sha1 => 40,
        }
    }

    fn from_file_name(name: &str) -> Option<(SidecarKind, &str)> {
        if let Some(target) = name.strip_suffix(".md5") {
            Some((SidecarKind::Md5, target))
        } else {
            name.strip_suffix(".sha1").map(|target| (SidecarKind::Sha1, target))
        }
    }
}

/// Problems found in a working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum VerificationError {
    /// Working directory could not be read
    Unreadable { path: String, detail: String },

    MissingProperties,

    MalformedProperties { detail: String },

    /// A properties value is not a SHA-1 hex digest
    MalformedPropertiesEntry { key: String, value: String },

    /// Sidecar whose staged file is absent
    OrphanSidecar { sidecar: String },

    MalformedSidecar { sidecar: String },

    DigestMismatch {
        file: String,
        kind: SidecarKind,
        expected: String,
        actual: String,
    },

    MissingSidecar { file: String, kind: SidecarKind },
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationError::Unreadable { path, detail } => {
                write!(f, "{}: unreadable ({})", path, detail)
            }
            VerificationError::MissingProperties => {
                write!(f, "{}: missing", SHA1_PROPERTIES_FILE)
            }
            VerificationError::MalformedProperties { detail } => {
                write!(f, "{}: {}", SHA1_PROPERTIES_FILE, detail)
            }
            VerificationError::MalformedPropertiesEntry { key, value } => {
                write!(f, "{}: {}={} is not a sha1 digest", SHA1_PROPERTIES_FILE, key, value)
            }
            VerificationError::OrphanSidecar { sidecar } => {
                write!(f, "{}: staged file missing", sidecar)
            }
            VerificationError::MalformedSidecar { sidecar } => {
                write!(f, "{}: not a single hex digest line", sidecar)
            }
            VerificationError::DigestMismatch {
                file,
                kind,
                expected,
                actual,
            } => write!(
                f,
                "{}: {} mismatch (sidecar {}, actual {})",
                file,
                kind.extension(),
                expected,
                actual
            ),
            VerificationError::MissingSidecar { file, kind } => {
                write!(f, "{}: no .{} sidecar", file, kind.extension())
            }
        }
    }
}

/// Result of verifying a working directory
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub passed: bool,

    /// Staged files checked (sidecars and sha1.properties excluded)
    pub checked_files: Vec<String>,

    /// Number of entries in sha1.properties
    pub recorded_digests: usize,

    pub errors: Vec<VerificationError>,

    pub summary: String,
}

impl VerificationResult {
    fn from_errors(
        checked_files: Vec<String>,
        recorded_digests: usize,
        errors: Vec<VerificationError>,
    ) -> Self {
        let summary = match errors.len() {
            0 => format!(
                "Working directory verification passed ({} file(s))",
                checked_files.len()
            ),
            1 => format!("Working directory verification failed: {}", errors[0]),
            n => format!(
                "Working directory verification failed: {} errors (first: {})",
                n, errors[0]
            ),
        };

        Self {
            passed: errors.is_empty(),
            checked_files,
            recorded_digests,
            errors,
            summary,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Sidecar body must be the digest plus one line terminator
fn parse_sidecar(contents: &str, kind: SidecarKind) -> Option<&str> {
    let digest = contents
        .strip_suffix("\r\n")
        .or_else(|| contents.strip_suffix('\n'))?;
    is_lower_hex(digest, kind.hex_len()).then_some(digest)
}

/// Verify the layout and checksums of `dir`
pub fn verify_working_directory(dir: &Path) -> VerificationResult {
    let mut errors = Vec::new();
    let mut files = BTreeSet::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                files.insert(entry.file_name().to_string_lossy().into_owned());
            }
            Ok(_) => {}
            Err(e) => {
                errors.push(VerificationError::Unreadable {
                    path: dir.display().to_string(),
                    detail: e.to_string(),
                });
                return VerificationResult::from_errors(Vec::new(), 0, errors);
            }
        }
    }

    let recorded_digests = check_properties(dir, &files, &mut errors);

    let mut checked_files = Vec::new();

    for name in &files {
        if name == SHA1_PROPERTIES_FILE {
            continue;
        }

        if let Some((kind, target)) = SidecarKind::from_file_name(name) {
            if !files.contains(target) {
                errors.push(VerificationError::OrphanSidecar {
                    sidecar: name.clone(),
                });
                continue;
            }
            let contents = match std::fs::read_to_string(dir.join(name)) {
                Ok(contents) => contents,
                Err(e) => {
                    errors.push(VerificationError::Unreadable {
                        path: name.clone(),
                        detail: e.to_string(),
                    });
                    continue;
                }
            };
            let Some(expected) = parse_sidecar(&contents, kind) else {
                errors.push(VerificationError::MalformedSidecar {
                    sidecar: name.clone(),
                });
                continue;
            };

            let digests = match FileDigests::compute(&dir.join(target)) {
                Ok(digests) => digests,
                Err(e) => {
                    errors.push(VerificationError::Unreadable {
                        path: target.to_string(),
                        detail: e.to_string(),
                    });
                    continue;
                }
            };
            let actual = match kind {
                SidecarKind::Md5 => digests.md5,
                SidecarKind::Sha1 => digests.sha1,
            };
            if actual != expected {
                errors.push(VerificationError::DigestMismatch {
                    file: target.to_string(),
                    kind,
                    expected: expected.to_string(),
                    actual,
                });
            }
            continue;
        }

        checked_files.push(name.clone());
        if name.contains(SIGNATURE_MARKER) {
            continue;
        }
        for kind in [SidecarKind::Md5, SidecarKind::Sha1] {
            if !files.contains(&format!("{}.{}", name, kind.extension())) {
                errors.push(VerificationError::MissingSidecar {
                    file: name.clone(),
                    kind,
                });
            }
        }
    }

    VerificationResult::from_errors(checked_files, recorded_digests, errors)
}

fn check_properties(
    dir: &Path,
    files: &BTreeSet<String>,
    errors: &mut Vec<VerificationError>,
) -> usize {
    if !files.contains(SHA1_PROPERTIES_FILE) {
        errors.push(VerificationError::MissingProperties);
        return 0;
    }

    match DigestMap::read_properties(&dir.join(SHA1_PROPERTIES_FILE)) {
        Ok(map) => {
            for (key, value) in map.iter() {
                if !is_lower_hex(value, SidecarKind::Sha1.hex_len()) {
                    errors.push(VerificationError::MalformedPropertiesEntry {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
            }
            map.len()
        }
        Err(e) => {
            errors.push(VerificationError::MalformedProperties {
                detail: e.to_string(),
            });
            0
        }
    }
}
