//! Artifact coordinates and backing file

use std::path::{Path, PathBuf};

use dist_classifier::TypeTagged;
use serde::{Deserialize, Serialize};

/// File-name substring marking a detached PGP signature
pub const SIGNATURE_MARKER: &str = "asc";

/// A build artifact: coordinates plus exactly one file on disk
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    pub group_id: String,

    pub artifact_id: String,

    pub version: String,

    /// Type tag, e.g. "jar", "zip", "tar.gz.asc"
    #[serde(rename = "type")]
    pub type_tag: String,

    /// Backing file
    pub file: PathBuf,
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        type_tag: impl Into<String>,
        file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            type_tag: type_tag.into(),
            file: file.into(),
        }
    }

    /// Composite key `groupId-artifactId-version-type`
    pub fn coordinate_key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.group_id, self.artifact_id, self.version, self.type_tag
        )
    }

    /// Base name of the backing file, if the path has one
    pub fn file_name(&self) -> Option<String> {
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Whether the backing file is a signature (its name contains "asc")
    pub fn is_signature(&self) -> bool {
        self.file_name()
            .map(|name| name.contains(SIGNATURE_MARKER))
            .unwrap_or(false)
    }

    /// Resolve a relative backing file against `base`.
    pub fn resolve_file(&mut self, base: &Path) {
        if self.file.is_relative() {
            self.file = base.join(&self.file);
        }
    }
}

impl TypeTagged for Artifact {
    fn type_tag(&self) -> &str {
        &self.type_tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_key() {
        let a = Artifact::new(
            "org.example",
            "widget",
            "2.1",
            "tar.gz",
            "/build/widget-2.1-bin.tar.gz",
        );
        assert_eq!(a.coordinate_key(), "org.example-widget-2.1-tar.gz");
    }

    #[test]
    fn test_file_name_strips_directories() {
        let a = Artifact::new("g", "a", "1", "zip", "/deep/nested/dir/a-1-src.zip");
        assert_eq!(a.file_name().as_deref(), Some("a-1-src.zip"));
    }

    #[test]
    fn test_is_signature() {
        let sig = Artifact::new("g", "a", "1", "zip.asc", "/b/a-1-src.zip.asc");
        let zip = Artifact::new("g", "a", "1", "zip", "/b/a-1-src.zip");
        assert!(sig.is_signature());
        assert!(!zip.is_signature());
    }

    #[test]
    fn test_is_signature_matches_substring_anywhere() {
        // The marker is a plain substring of the file name, not a suffix
        let a = Artifact::new("g", "basc", "1", "zip", "/b/basc-1-src.zip");
        assert!(a.is_signature());
    }

    #[test]
    fn test_serde_uses_type_field() {
        let a = Artifact::new("g", "a", "1", "zip", "/b/a-1.zip");
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "zip");
        assert!(json.get("type_tag").is_none());
    }

    #[test]
    fn test_resolve_relative_file() {
        let mut a = Artifact::new("g", "a", "1", "zip", "target/a-1.zip");
        a.resolve_file(Path::new("/project"));
        assert_eq!(a.file, PathBuf::from("/project/target/a-1.zip"));

        let mut b = Artifact::new("g", "a", "1", "zip", "/abs/a-1.zip");
        b.resolve_file(Path::new("/project"));
        assert_eq!(b.file, PathBuf::from("/abs/a-1.zip"));
    }
}
