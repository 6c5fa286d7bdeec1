//! Detachment run orchestration
//!
//! Runs the four stages in order against the build's attached artifacts:
//! - Classify: pick the distribution archives
//! - Record: SHA-1 every attached artifact, remove the archives from the
//!   build, write sha1.properties
//! - Stage: copy the detached files into the working directory
//! - Sign: write .md5/.sha1 sidecars for the non-signature files
//!
//! The first failure stops the run; nothing already written is rolled back.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::artifact::{Artifact, AttachedArtifacts};
use crate::config::DetachConfig;
use crate::digest::{DigestMap, SHA1_PROPERTIES_FILE};
use crate::error::DetachResult;
use crate::sign::{sign_artifacts, Sidecars};
use crate::stage::{ensure_working_directory, stage_artifacts};
use crate::state::{DetachProgress, DetachState, StateChange};

/// A detached artifact as listed in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetachedEntry {
    pub key: String,
    pub file_name: Option<String>,
}

impl From<&Artifact> for DetachedEntry {
    fn from(artifact: &Artifact) -> Self {
        Self {
            key: artifact.coordinate_key(),
            file_name: artifact.file_name(),
        }
    }
}

/// Outcome of a run
#[derive(Debug, Clone, Serialize)]
pub struct DetachReport {
    /// Terminal state: DONE or one of the skips
    pub state: DetachState,

    pub working_directory: PathBuf,

    pub detached: Vec<DetachedEntry>,

    /// Attached artifacts left in the build after detachment
    pub remaining_attached: usize,

    /// SHA-1 of every artifact attached at the start of the run
    pub digests: DigestMap,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_file: Option<PathBuf>,

    pub staged: Vec<PathBuf>,

    pub sidecars: Vec<Sidecars>,

    pub history: Vec<StateChange>,
}

impl DetachReport {
    /// True when the pipeline was skipped
    pub fn skipped(&self) -> bool {
        self.state.is_skip()
    }

    /// Human-readable summary
    pub fn to_human(&self) -> String {
        let mut out = format!("State: {}\n", self.state.as_str());
        if self.skipped() {
            return out;
        }

        out.push_str(&format!(
            "Working directory: {}\n",
            self.working_directory.display()
        ));
        out.push_str(&format!(
            "Detached {} artifact(s), {} still attached\n",
            self.detached.len(),
            self.remaining_attached
        ));
        for entry in &self.detached {
            out.push_str(&format!(
                "  {} ({})\n",
                entry.key,
                entry.file_name.as_deref().unwrap_or("?")
            ));
        }
        out.push_str(&format!("Recorded {} sha1 digest(s)\n", self.digests.len()));
        for sidecar in &self.sidecars {
            out.push_str(&format!(
                "  {}  md5 {}  sha1 {}\n",
                sidecar.file_name, sidecar.digests.md5, sidecar.digests.sha1
            ));
        }
        out
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One detachment run. Execute it once.
pub struct DetachRun {
    config: DetachConfig,
    progress: DetachProgress,
    detached: Vec<Artifact>,
    digests: DigestMap,
    properties_file: Option<PathBuf>,
    staged: Vec<PathBuf>,
    sidecars: Vec<Sidecars>,
}

impl DetachRun {
    pub fn new(config: DetachConfig) -> Self {
        Self {
            config,
            progress: DetachProgress::new(),
            detached: Vec::new(),
            digests: DigestMap::new(),
            properties_file: None,
            staged: Vec::new(),
            sidecars: Vec::new(),
        }
    }

    pub fn state(&self) -> DetachState {
        self.progress.state
    }

    pub fn progress(&self) -> &DetachProgress {
        &self.progress
    }

    /// The detached set, in attached-artifact order
    pub fn detached(&self) -> &[Artifact] {
        &self.detached
    }

    /// Run the pipeline. On error the run ends in FAILED.
    pub fn execute<A>(&mut self, attached: &mut A) -> DetachResult<DetachReport>
    where
        A: AttachedArtifacts + ?Sized,
    {
        match self.execute_stages(attached) {
            Ok(()) => Ok(self.report(attached.attached().len())),
            Err(e) => {
                error!(state = self.progress.state.as_str(), "detachment failed: {}", e);
                self.progress.fail();
                Err(e)
            }
        }
    }

    fn execute_stages<A>(&mut self, attached: &mut A) -> DetachResult<()>
    where
        A: AttachedArtifacts + ?Sized,
    {
        if let Some(skip) = self.config.skip_state() {
            match skip {
                DetachState::SkippedNotDistModule => info!(
                    "This module is marked as a non distribution or assembly module, and the plugin will not run."
                ),
                _ => warn!("No staging URL is configured, distributions will not be detached."),
            }
            return self.progress.transition(skip);
        }

        info!("Detaching Assemblies");
        let snapshot: Vec<Artifact> = attached.attached().to_vec();
        if !self.classify(&snapshot)? {
            return Ok(());
        }

        let dir = self.config.working_directory.clone();

        // The build's collection is only shrunk once every artifact has a digest
        self.digests.record_all(&snapshot)?;
        for artifact in &self.detached {
            attached.remove(artifact);
        }

        ensure_working_directory(&dir)?;
        self.digests.write_properties(&dir)?;
        self.properties_file = Some(dir.join(SHA1_PROPERTIES_FILE));
        self.progress.transition(DetachState::Recorded)?;

        self.staged = stage_artifacts(&self.detached, &dir)?;
        self.progress.transition(DetachState::Staged)?;

        self.sidecars = sign_artifacts(&self.detached, &dir)?;
        self.progress.transition(DetachState::Signed)?;

        self.progress.transition(DetachState::Done)
    }

    /// Build the detached set from `snapshot`.
    ///
    /// Returns false when nothing matched and the run is over.
    fn classify(&mut self, snapshot: &[Artifact]) -> DetachResult<bool> {
        let classification = dist_classifier::classify(snapshot);
        for (artifact, decision) in snapshot.iter().zip(&classification.decisions) {
            debug!(key = %artifact.coordinate_key(), ?decision, "classified artifact");
        }
        self.detached = classification.detached.into_iter().cloned().collect();
        self.progress.transition(DetachState::Classified)?;

        if self.detached.is_empty() {
            info!("Current project contains no distributions. Not executing.");
            self.progress.transition(DetachState::SkippedEmptySet)?;
            return Ok(false);
        }
        Ok(true)
    }

    fn report(&self, remaining_attached: usize) -> DetachReport {
        DetachReport {
            state: self.progress.state,
            working_directory: self.config.working_directory.clone(),
            detached: self.detached.iter().map(DetachedEntry::from).collect(),
            remaining_attached,
            digests: self.digests.clone(),
            properties_file: self.properties_file.clone(),
            staged: self.staged.clone(),
            sidecars: self.sidecars.clone(),
            history: self.progress.history.clone(),
        }
    }
}

/// Convenience wrapper: run once with `config` against `attached`
pub fn run_detach<A>(config: DetachConfig, attached: &mut A) -> DetachResult<DetachReport>
where
    A: AttachedArtifacts + ?Sized,
{
    DetachRun::new(config).execute(attached)
}
