//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Build output directory used when none is configured
pub const DEFAULT_BUILD_DIRECTORY: &str = "target";

/// Working directory name under the build output directory
pub const WORKING_DIRECTORY_NAME: &str = "dist-detach";

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Build output directory (default: "target")
    pub build_directory: String,

    /// Skip the module entirely (default: false)
    pub non_distribution_module: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            build_directory: DEFAULT_BUILD_DIRECTORY.to_string(),
            non_distribution_module: false,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging.
    ///
    /// The working directory and staging URL have no built-in value: the
    /// former derives from the build directory, the latter stays unset.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "build": {
                "directory": self.build_directory,
            },
            "non_distribution_module": self.non_distribution_module,
        })
    }
}
