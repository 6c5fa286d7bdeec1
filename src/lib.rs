//! dist-detach - detach distribution archives from a build
//!
//! Removes the source/binary zip and tar.gz packages (and their PGP
//! signatures) from a build's attached artifacts, copies them into a
//! flat working directory, and writes the checksum files the staging
//! step publishes alongside them.

pub mod artifact;
pub mod config;
pub mod digest;
pub mod error;
pub mod pipeline;
pub mod sign;
pub mod stage;
pub mod state;
pub mod verify;

pub use artifact::{Artifact, ArtifactList, AttachedArtifacts};
pub use config::{DetachConfig, EffectiveConfig};
pub use digest::DigestMap;
pub use error::{DetachError, DetachResult};
pub use pipeline::{run_detach, DetachReport, DetachRun};
pub use state::DetachState;
pub use verify::{verify_working_directory, VerificationResult};
