//! Layered configuration
//!
//! Merges, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. Config file (.dist/detach.toml)
//! 3. Environment (DIST_DETACH_*)
//! 4. CLI flags

mod defaults;
mod detach_config;
mod effective;
mod merge;

pub use defaults::{BuiltinDefaults, DEFAULT_BUILD_DIRECTORY, WORKING_DIRECTORY_NAME};
pub use detach_config::{ConfigDocument, DetachConfig};
pub use effective::{
    ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, DEFAULT_CONFIG_PATH, ENV_BUILD_DIR,
    ENV_NON_DIST_MODULE, ENV_STAGING_URL, ENV_WORKING_DIR,
};
pub use merge::{deep_merge, merge_layers};
