use std::fs;
use std::path::{Path, PathBuf};

use embedsync_core::{Manifest, SourceMapping, SyncConfig};
use embedsync_sync::{
    ConfirmPolicy, InMemoryVcs, Pipeline, PipelineError, PipelineOptions, PipelineState,
    RefreshOutcome, StampOutcome, StampStatus, SyncStatus, EXIT_OK, EXIT_PARTIAL,
};
use tempfile::TempDir;

const ENTRY: &str = "int main(int argc, char* argv[]) {\n    return 0;\n}\n";
const DEFS: &str = "#pragma once\n#define HYMO_VERSION 1\n";
const CORE: &str = "#include \"../defs.hpp\"\n#include \"../utils.hpp\"\nint d;\n";

/// `<ws>/YukiSU/userspace/ksud/scripts` layout with a five-entry table.
struct Fixture {
    _ws: TempDir,
    config: SyncConfig,
    source_dir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let ws = TempDir::new().expect("workspace");
        let mut config = SyncConfig::for_tool_dir(ws.path().join("YukiSU/userspace/ksud/scripts"))
            .expect("config");
        config
            .apply_manifest(Manifest {
                entry_point: Some(PathBuf::from("a.cpp")),
                mappings: Some(vec![
                    SourceMapping::new("a.cpp", "hymo_cli.cpp"),
                    SourceMapping::new("b.hpp", "b.hpp"),
                    SourceMapping::new("c.cpp", "c.cpp"),
                    SourceMapping::new("core/d.cpp", "core/d.cpp"),
                    SourceMapping::new("defs.hpp", "hymo_defs.hpp"),
                ]),
                ..Manifest::default()
            })
            .expect("manifest");

        let source_dir = config.source_dir(&config.upstream_candidates[0]);
        let fixture = Self {
            _ws: ws,
            config,
            source_dir,
        };
        fixture.upstream("a.cpp", ENTRY);
        fixture.upstream("b.hpp", "#include \"utils.hpp\"\n");
        fixture.upstream("c.cpp", "int c;\n");
        fixture.upstream("core/d.cpp", CORE);
        fixture.upstream("defs.hpp", DEFS);
        fixture
    }

    fn upstream(&self, rel: &str, content: &str) {
        let path = self.source_dir.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write upstream");
    }

    fn embedded(&self, rel: &str) -> PathBuf {
        self.config.embedded_root.join(rel)
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.embedded(rel)).expect("read embedded")
    }

    fn snapshot(&self) -> Vec<(PathBuf, Vec<u8>)> {
        self.config
            .mappings
            .iter()
            .map(|m| {
                let path = self.embedded(m.destination.to_str().expect("utf8"));
                let bytes = fs::read(&path).unwrap_or_default();
                (path, bytes)
            })
            .collect()
    }
}

fn stamp_lines(content: &str) -> usize {
    content
        .lines()
        .filter(|l| l.starts_with("// Synced from hymo "))
        .count()
}

#[test]
fn one_missing_source_is_partial_success() {
    let fx = Fixture::new();
    fs::remove_file(fx.source_dir.join("c.cpp")).expect("remove c");
    let vcs = InMemoryVcs::clean("v1.0");

    let outcome = Pipeline::new(&fx.config, &vcs).run().expect("run");

    assert_eq!((outcome.report.succeeded(), outcome.report.total()), (4, 5));
    assert_eq!(outcome.report.results[2].status, SyncStatus::SourceMissing);
    assert_eq!(outcome.exit_code(), EXIT_PARTIAL);
    assert!(outcome.warnings.iter().any(|w| w.contains("c.cpp")));

    assert!(!fx.embedded("c.cpp").exists());
    assert!(fx.read("hymo_cli.cpp").contains("int hymo_main(int argc, char** argv)"));
    assert!(fx.read("b.hpp").contains("#include \"hymo_utils.hpp\""));
    assert!(fx.read("core/d.cpp").starts_with("#include \"../hymo_defs.hpp\"\n"));
    assert!(fx.read("hymo_defs.hpp").starts_with("// Synced from hymo v1.0\n"));
}

#[test]
fn second_run_is_byte_identical_with_one_stamp() {
    let fx = Fixture::new();
    let vcs = InMemoryVcs::clean("v1.0");

    let first = Pipeline::new(&fx.config, &vcs).run().expect("first");
    assert_eq!(first.exit_code(), EXIT_OK);
    assert_eq!(first.stamp, StampStatus::Stamped(StampOutcome::Inserted));
    let before = fx.snapshot();

    let second = Pipeline::new(&fx.config, &vcs).run().expect("second");
    assert_eq!(second.exit_code(), EXIT_OK);
    assert_eq!(fx.snapshot(), before);
    assert_eq!(stamp_lines(&fx.read("hymo_defs.hpp")), 1);
    // The raw transform of the target lacks the stamp, so it is rewritten and
    // stamped again with identical bytes.
    assert_eq!(second.stamp, StampStatus::Stamped(StampOutcome::Inserted));
}

#[test]
fn many_runs_never_duplicate_stamp() {
    let fx = Fixture::new();
    for label in ["v1.0", "v1.0", "v1.1", "v1.1"] {
        let vcs = InMemoryVcs::clean(label);
        Pipeline::new(&fx.config, &vcs).run().expect("run");
    }
    let defs = fx.read("hymo_defs.hpp");
    assert_eq!(stamp_lines(&defs), 1);
    assert!(defs.starts_with("// Synced from hymo v1.1\n"));
}

#[test]
fn declined_confirmation_aborts_without_writes() {
    let fx = Fixture::new();
    let vcs = InMemoryVcs::clean("v1.0").with_modified(Some(true));

    let err = Pipeline::new(&fx.config, &vcs)
        .confirm(ConfirmPolicy::Ask(Box::new(|_: &Path| false)))
        .run()
        .unwrap_err();
    assert!(matches!(err, PipelineError::ConfirmationDeclined { .. }));
    assert!(!fx.config.embedded_root.exists());
    assert!(!vcs.calls().contains(&"refresh"));
}

#[test]
fn accepted_confirmation_proceeds_with_warning() {
    let fx = Fixture::new();
    let vcs = InMemoryVcs::clean("v1.0").with_modified(Some(true));

    let outcome = Pipeline::new(&fx.config, &vcs)
        .confirm(ConfirmPolicy::Proceed)
        .run()
        .expect("run");
    assert!(outcome.upstream_modified);
    assert!(outcome.warnings[0].contains("uncommitted changes"));
    assert_eq!(outcome.exit_code(), EXIT_OK);
}

#[test]
fn refresh_failure_is_soft() {
    let fx = Fixture::new();
    let vcs = InMemoryVcs::clean("v1.0").with_refresh(Err("could not resolve host".to_string()));

    let outcome = Pipeline::new(&fx.config, &vcs).run().expect("run");
    assert!(matches!(outcome.refresh, RefreshOutcome::Failed(_)));
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("could not resolve host")));
    assert_eq!(outcome.exit_code(), EXIT_OK);
}

#[test]
fn no_refresh_skips_pull() {
    let fx = Fixture::new();
    let vcs = InMemoryVcs::clean("v1.0");

    let outcome = Pipeline::new(&fx.config, &vcs)
        .options(PipelineOptions {
            dry_run: false,
            refresh: false,
        })
        .run()
        .expect("run");
    assert_eq!(outcome.refresh, RefreshOutcome::Skipped);
    assert!(!vcs.calls().contains(&"refresh"));
}

#[test]
fn unusable_vcs_during_check_is_fatal() {
    let fx = Fixture::new();
    let vcs = InMemoryVcs::clean("v1.0").with_modified(None);

    let err = Pipeline::new(&fx.config, &vcs).run().unwrap_err();
    assert!(matches!(err, PipelineError::Vcs { .. }));
    assert!(!fx.config.embedded_root.exists());
}

#[test]
fn fallback_location_is_used() {
    let fx = Fixture::new();
    let primary = fx.config.upstream_candidates[0].clone();
    let fallback = fx.config.upstream_candidates[1].clone();
    fs::rename(&primary, &fallback).expect("move upstream to fallback");
    let vcs = InMemoryVcs::clean("v1.0");

    let outcome = Pipeline::new(&fx.config, &vcs).run().expect("run");
    assert_eq!(outcome.upstream_root, fallback);
    assert!(fx.embedded("hymo_cli.cpp").exists());
}

#[test]
fn missing_label_stamps_unknown() {
    let fx = Fixture::new();
    let vcs = InMemoryVcs::clean("ignored").with_describe(None);

    let outcome = Pipeline::new(&fx.config, &vcs).run().expect("run");
    assert_eq!(outcome.version, "unknown");
    assert!(fx.read("hymo_defs.hpp").starts_with("// Synced from hymo unknown\n"));
}

#[test]
fn unwritable_stamp_target_only_warns() {
    let mut fx = Fixture::new();
    fx.config.stamp_target = PathBuf::from("stamp.d");
    fs::create_dir_all(fx.embedded("stamp.d")).expect("mkdir stamp.d");
    let vcs = InMemoryVcs::clean("v1.0");

    let outcome = Pipeline::new(&fx.config, &vcs).run().expect("run");

    assert!(matches!(outcome.stamp, StampStatus::Failed(_)), "got {:?}", outcome.stamp);
    assert_eq!(outcome.states.last(), Some(&PipelineState::Done));
    assert!(outcome.report.is_complete());
    assert_eq!(outcome.exit_code(), EXIT_OK);
    assert!(
        outcome.warnings.iter().any(|w| w.starts_with("failed to stamp version")),
        "warnings: {:?}",
        outcome.warnings
    );
    assert!(fx.embedded("stamp.d").is_dir());
}

