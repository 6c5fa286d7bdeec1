//! Resolved run configuration and the config document schema

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::defaults::{DEFAULT_BUILD_DIRECTORY, WORKING_DIRECTORY_NAME};
use crate::state::DetachState;

/// `[build]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Build output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Working directory; defaults to `<directory>/dist-detach`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,
}

/// `[staging]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagingSection {
    /// Destination the staging step uploads to. Unset or empty disables the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Shape shared by the config file, environment and CLI layers.
///
/// Every field is optional so a layer only overrides what it sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_distribution_module: Option<bool>,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub staging: StagingSection,
}

impl ConfigDocument {
    /// Parse a TOML document, rejecting unknown keys
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// JSON value carrying only the fields this document sets
    pub fn to_value(&self) -> serde_json::Value {
        let mut value = serde_json::json!({});
        if let Some(flag) = self.non_distribution_module {
            value["non_distribution_module"] = flag.into();
        }
        if let Some(ref dir) = self.build.directory {
            value["build"]["directory"] = dir.to_string_lossy().into_owned().into();
        }
        if let Some(ref dir) = self.build.working_directory {
            value["build"]["working_directory"] = dir.to_string_lossy().into_owned().into();
        }
        if let Some(ref url) = self.staging.url {
            value["staging"]["url"] = url.clone().into();
        }
        value
    }

    /// Resolve into a run configuration
    pub fn resolve(self) -> DetachConfig {
        let working_directory = match self.build.working_directory {
            Some(dir) => dir,
            None => self
                .build
                .directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIRECTORY))
                .join(WORKING_DIRECTORY_NAME),
        };

        DetachConfig {
            working_directory,
            staging_url: self.staging.url,
            non_distribution_module: self.non_distribution_module.unwrap_or(false),
        }
    }
}

/// Configuration consumed by a detachment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachConfig {
    /// Flat directory receiving sha1.properties, staged files and sidecars
    pub working_directory: PathBuf,

    /// Staging destination; `None` or empty means the run does nothing
    pub staging_url: Option<String>,

    /// Module is not part of the distribution; the run does nothing
    pub non_distribution_module: bool,
}

impl Default for DetachConfig {
    fn default() -> Self {
        ConfigDocument::default().resolve()
    }
}

impl DetachConfig {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            staging_url: None,
            non_distribution_module: false,
        }
    }

    pub fn with_staging_url(mut self, url: impl Into<String>) -> Self {
        self.staging_url = Some(url.into());
        self
    }

    pub fn with_non_distribution_module(mut self, flag: bool) -> Self {
        self.non_distribution_module = flag;
        self
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Whether a staging destination is configured (exact emptiness test, no trimming)
    pub fn has_staging_url(&self) -> bool {
        self.staging_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// Skip state the run ends in before classification, if any.
    ///
    /// The module flag is checked first.
    pub fn skip_state(&self) -> Option<DetachState> {
        if self.non_distribution_module {
            Some(DetachState::SkippedNotDistModule)
        } else if !self.has_staging_url() {
            Some(DetachState::SkippedNoStagingUrl)
        } else {
            None
        }
    }
}
