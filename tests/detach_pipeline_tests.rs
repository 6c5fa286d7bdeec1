//! Detachment pipeline tests
//!
//! End-to-end runs over a temporary build directory: classification,
//! digest recording, staging, sidecar generation, skips and failures.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use dist_detach::digest::{md5_hex, sha1_hex, SHA1_PROPERTIES_FILE};
use dist_detach::{
    run_detach, verify_working_directory, Artifact, DetachConfig, DetachError, DetachRun,
    DetachState, DigestMap,
};
use tempfile::TempDir;

const STAGING_URL: &str = "https://dist.example.org/repos/dist/dev/widget";

/// A build directory with a few artifacts on disk
struct Build {
    dir: TempDir,
}

impl Build {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        Self { dir }
    }

    fn artifact(&self, type_tag: &str, file_name: &str, contents: &[u8]) -> Artifact {
        let path = self.dir.path().join("target").join(file_name);
        fs::write(&path, contents).unwrap();
        Artifact::new("org.example", "widget", "1.0", type_tag, path)
    }

    fn working_dir(&self) -> PathBuf {
        self.dir.path().join("target").join("dist-detach")
    }

    fn config(&self) -> DetachConfig {
        DetachConfig::new(self.working_dir()).with_staging_url(STAGING_URL)
    }
}

fn dir_listing(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn scenario(build: &Build) -> Vec<Artifact> {
    vec![
        build.artifact("jar", "widget-1.0.jar", b"jar contents"),
        build.artifact("zip", "widget-1.0-src.zip", b"zip contents"),
        build.artifact("zip.asc", "widget-1.0-src.zip.asc", b"signature"),
    ]
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_jar_zip_signature_scenario() {
    let build = Build::new();
    let mut attached = scenario(&build);
    let original = attached.clone();

    let report = run_detach(build.config(), &mut attached).unwrap();

    assert_eq!(report.state, DetachState::Done);
    assert_eq!(report.detached.len(), 2);
    assert_eq!(report.detached[0].key, "org.example-widget-1.0-zip");
    assert_eq!(report.detached[1].key, "org.example-widget-1.0-zip.asc");
    assert_eq!(attached, vec![original[0].clone()]);
    assert_eq!(report.digests.len(), 3);

    let work = build.working_dir();
    let expected: BTreeSet<String> = [
        "sha1.properties",
        "widget-1.0-src.zip",
        "widget-1.0-src.zip.asc",
        "widget-1.0-src.zip.md5",
        "widget-1.0-src.zip.sha1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(dir_listing(&work), expected);

    let properties = fs::read_to_string(work.join(SHA1_PROPERTIES_FILE)).unwrap();
    let entries: Vec<&str> = properties.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(entries.len(), 3);
    assert!(properties.starts_with("#release sha1s\n"));
    assert!(entries.contains(&format!("org.example-widget-1.0-jar={}", sha1_hex(b"jar contents")).as_str()));
}

// =============================================================================
// Classification invariants
// =============================================================================

#[test]
fn test_detached_set_matches_allow_list_exactly() {
    let build = Build::new();
    let mut attached = vec![
        build.artifact("pom", "widget-1.0.pom", b"pom"),
        build.artifact("tar.gz", "widget-1.0-bin.tar.gz", b"tgz"),
        build.artifact("ZIP", "widget-1.0-upper.ZIP", b"upper"),
        build.artifact("tar.gz.asc", "widget-1.0-bin.tar.gz.asc", b"tgz sig"),
        build.artifact("zip.sha512", "widget-1.0-src.zip.sha512", b"sha512"),
        build.artifact("zip", "widget-1.0-bin.zip", b"bin zip"),
        build.artifact("jar.asc", "widget-1.0.jar.asc", b"jar sig"),
    ];
    let original = attached.clone();

    let mut run = DetachRun::new(build.config());
    run.execute(&mut attached).unwrap();

    let detached_types: Vec<&str> = run.detached().iter().map(|a| a.type_tag.as_str()).collect();
    assert_eq!(detached_types, vec!["tar.gz", "tar.gz.asc", "zip"]);

    // original - detached == remaining, and the two views are disjoint
    let expected_remaining: Vec<Artifact> = original
        .iter()
        .filter(|a| !run.detached().contains(a))
        .cloned()
        .collect();
    assert_eq!(attached, expected_remaining);
    assert!(attached.iter().all(|a| !run.detached().contains(a)));
}

#[test]
fn test_digest_map_covers_kept_artifacts() {
    let build = Build::new();
    let mut attached = vec![
        build.artifact("jar", "widget-1.0.jar", b"jar"),
        build.artifact("pom", "widget-1.0.pom", b"pom"),
        build.artifact("zip", "widget-1.0-src.zip", b"zip"),
    ];

    let report = run_detach(build.config(), &mut attached).unwrap();

    let persisted =
        DigestMap::read_properties(&build.working_dir().join(SHA1_PROPERTIES_FILE)).unwrap();
    assert_eq!(persisted, report.digests);
    assert_eq!(persisted.get("org.example-widget-1.0-pom"), Some(sha1_hex(b"pom").as_str()));
    assert_eq!(persisted.len(), 3);
}

// =============================================================================
// Sidecars
// =============================================================================

#[test]
fn test_sidecars_match_staged_bytes() {
    let build = Build::new();
    let mut attached = vec![
        build.artifact("zip", "widget-1.0-src.zip", b"source zip"),
        build.artifact("tar.gz", "widget-1.0-src.tar.gz", b"source tarball"),
    ];

    run_detach(build.config(), &mut attached).unwrap();

    let work = build.working_dir();
    for name in ["widget-1.0-src.zip", "widget-1.0-src.tar.gz"] {
        let staged = fs::read(work.join(name)).unwrap();
        let md5 = fs::read_to_string(work.join(format!("{}.md5", name))).unwrap();
        let sha1 = fs::read_to_string(work.join(format!("{}.sha1", name))).unwrap();

        assert_eq!(md5, format!("{}\n", md5_hex(&staged)));
        assert_eq!(sha1, format!("{}\n", sha1_hex(&staged)));
        assert_eq!(md5.trim_end().len(), 32);
        assert_eq!(sha1.trim_end().len(), 40);
        assert!(sha1.trim_end().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

#[test]
fn test_rerun_is_idempotent() {
    let build = Build::new();

    let mut first = scenario(&build);
    let first_report = run_detach(build.config(), &mut first).unwrap();
    let work = build.working_dir();
    let md5_before = fs::read(work.join("widget-1.0-src.zip.md5")).unwrap();
    let sha1_before = fs::read(work.join("widget-1.0-src.zip.sha1")).unwrap();

    let mut second = scenario(&build);
    let second_report = run_detach(build.config(), &mut second).unwrap();

    assert_eq!(fs::read(work.join("widget-1.0-src.zip.md5")).unwrap(), md5_before);
    assert_eq!(fs::read(work.join("widget-1.0-src.zip.sha1")).unwrap(), sha1_before);
    assert_eq!(first_report.digests, second_report.digests);
    assert_eq!(
        DigestMap::read_properties(&work.join(SHA1_PROPERTIES_FILE)).unwrap(),
        second_report.digests
    );
    assert!(verify_working_directory(&work).passed);
}

#[test]
fn test_rerun_after_partial_failure_overwrites() {
    let build = Build::new();
    let work = build.working_dir();
    fs::create_dir_all(&work).unwrap();
    fs::write(work.join("widget-1.0-src.zip"), b"leftover from failed run").unwrap();
    fs::write(work.join("widget-1.0-src.zip.md5"), b"garbage").unwrap();
    fs::write(work.join(SHA1_PROPERTIES_FILE), b"stale=entry\nmore=stale\n").unwrap();

    let mut attached = scenario(&build);
    run_detach(build.config(), &mut attached).unwrap();

    assert_eq!(fs::read(work.join("widget-1.0-src.zip")).unwrap(), b"zip contents");
    let persisted = DigestMap::read_properties(&work.join(SHA1_PROPERTIES_FILE)).unwrap();
    assert_eq!(persisted.len(), 3);
    assert!(!persisted.contains_key("stale"));
    assert!(verify_working_directory(&work).passed);
}

// =============================================================================
// Skips
// =============================================================================

#[test]
fn test_no_staging_url_writes_nothing() {
    for url in [None, Some("")] {
        let build = Build::new();
        let mut attached = scenario(&build);
        let original = attached.clone();

        let mut config = DetachConfig::new(build.working_dir());
        config.staging_url = url.map(str::to_string);
        let report = run_detach(config, &mut attached).unwrap();

        assert_eq!(report.state, DetachState::SkippedNoStagingUrl);
        assert!(!build.working_dir().exists());
        assert_eq!(attached, original);
        assert!(report.digests.is_empty());
    }
}

#[test]
fn test_non_distribution_module_writes_nothing() {
    let build = Build::new();
    let mut attached = scenario(&build);
    let original = attached.clone();

    let config = build.config().with_non_distribution_module(true);
    let report = run_detach(config, &mut attached).unwrap();

    assert_eq!(report.state, DetachState::SkippedNotDistModule);
    assert!(!build.working_dir().exists());
    assert_eq!(attached, original);
}

#[test]
fn test_nothing_to_detach() {
    let build = Build::new();
    let mut attached = vec![
        build.artifact("jar", "widget-1.0.jar", b"jar"),
        build.artifact("jar.asc", "widget-1.0.jar.asc", b"sig"),
    ];

    let report = run_detach(build.config(), &mut attached).unwrap();

    assert_eq!(report.state, DetachState::SkippedEmptySet);
    assert!(!build.working_dir().exists());
    assert_eq!(attached.len(), 2);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unreadable_kept_artifact_aborts_run() {
    let build = Build::new();
    let mut attached = vec![
        build.artifact("zip", "widget-1.0-src.zip", b"zip"),
        Artifact::new(
            "org.example",
            "widget",
            "1.0",
            "jar",
            build.dir.path().join("target/missing.jar"),
        ),
    ];

    let mut run = DetachRun::new(build.config());
    let err = run.execute(&mut attached).unwrap_err();

    match &err {
        DetachError::Digest {
            artifact_id,
            type_tag,
            ..
        } => {
            assert_eq!(artifact_id, "widget");
            assert_eq!(type_tag, "jar");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("widget-1.0 type: jar"));
    assert_eq!(run.state(), DetachState::Failed);
    assert!(!build.working_dir().join("widget-1.0-src.zip").exists());
}

#[test]
fn test_digest_failure_leaves_attached_artifacts_untouched() {
    let build = Build::new();
    let mut attached = vec![
        build.artifact("zip", "widget-1.0-src.zip", b"zip"),
        build.artifact("tar.gz", "widget-1.0-bin.tar.gz", b"tgz"),
        Artifact::new(
            "org.example",
            "widget",
            "1.0",
            "jar",
            build.dir.path().join("target/missing.jar"),
        ),
    ];
    let original = attached.clone();

    let err = run_detach(build.config(), &mut attached).unwrap_err();

    assert!(matches!(err, DetachError::Digest { .. }));
    assert_eq!(attached, original);
    assert!(!build.working_dir().exists());
}

#[test]
fn test_unwritable_working_directory() {
    let build = Build::new();
    let blocker = build.dir.path().join("blocker");
    fs::write(&blocker, b"a file, not a directory").unwrap();

    let mut attached = scenario(&build);
    let config = DetachConfig::new(blocker.join("work")).with_staging_url(STAGING_URL);
    let mut run = DetachRun::new(config);
    let err = run.execute(&mut attached).unwrap_err();

    assert!(matches!(err, DetachError::CreateDirectory { .. }));
    assert_eq!(err.exit_code(), 40);
    assert_eq!(run.state(), DetachState::Failed);
}
