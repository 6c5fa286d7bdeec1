//! Errors raised by a detachment run.
//!
//! Every stage failure is fatal for the whole run. Each variant carries
//! enough context to name the responsible artifact or file and keeps the
//! underlying I/O error as its source.

use std::io;
use std::path::PathBuf;

use crate::state::DetachState;

/// Detachment run errors
#[derive(Debug, thiserror::Error)]
pub enum DetachError {
    #[error("could not compute sha1 for {artifact_id}-{version} type: {type_tag}")]
    Digest {
        group_id: String,
        artifact_id: String,
        version: String,
        type_tag: String,
        #[source]
        source: io::Error,
    },

    #[error("could not create working directory {}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write sha1 properties to {}", path.display())]
    WriteProperties {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to copy {} to {}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not sign file {file_name}")]
    Sign {
        file_name: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: DetachState, to: DetachState },
}

impl DetachError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            DetachError::Digest { .. } => 30,
            DetachError::CreateDirectory { .. } => 40,
            DetachError::Copy { .. } => 40,
            DetachError::Sign { .. } => 50,
            DetachError::WriteProperties { .. } => 60,
            DetachError::InvalidTransition { .. } => 70,
        }
    }
}

/// Result type for detachment operations
pub type DetachResult<T> = Result<T, DetachError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_digest_error_names_artifact() {
        let err = DetachError::Digest {
            group_id: "org.example".to_string(),
            artifact_id: "widget".to_string(),
            version: "1.0".to_string(),
            type_tag: "zip".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.to_string(), "could not compute sha1 for widget-1.0 type: zip");
        assert_eq!(err.source().unwrap().to_string(), "no such file");
        assert_eq!(err.exit_code(), 30);
    }

    #[test]
    fn test_copy_error_names_both_paths() {
        let err = DetachError::Copy {
            from: PathBuf::from("/build/widget-1.0-src.zip"),
            to: PathBuf::from("/work/widget-1.0-src.zip"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/build/widget-1.0-src.zip"));
        assert!(msg.contains("/work/widget-1.0-src.zip"));
        assert_eq!(err.exit_code(), 40);
    }
}
