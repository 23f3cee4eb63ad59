//! Pipeline entrypoint shared by every `embedsync` command that syncs.
//!
//! `Init → LocateUpstream → CheckLocalModifications → RefreshUpstream →
//! SyncEntries → StampVersion → Done`. Any [`PipelineError`] is the
//! `Aborted` terminal state; it is always raised before the first write.

use std::fmt;
use std::path::PathBuf;

use embedsync_core::SyncConfig;
use embedsync_transform::ContentTransformer;

use crate::confirm::ConfirmPolicy;
use crate::error::PipelineError;
use crate::locator::Locator;
use crate::orchestrator::{sync_entries, SyncReport};
use crate::stamp::{resolve_version_label, stamp, stamp_line, StampOutcome};
use crate::vcs::UpstreamVcs;

/// Every entry synced.
pub const EXIT_OK: u8 = 0;
/// Fatal error before any entry was attempted.
pub const EXIT_ABORTED: u8 = 1;
/// Pipeline finished, some entries failed.
pub const EXIT_PARTIAL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    LocateUpstream,
    CheckLocalModifications,
    RefreshUpstream,
    SyncEntries,
    StampVersion,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::LocateUpstream => "locate-upstream",
            Self::CheckLocalModifications => "check-local-modifications",
            Self::RefreshUpstream => "refresh-upstream",
            Self::SyncEntries => "sync-entries",
            Self::StampVersion => "stamp-version",
            Self::Done => "done",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Transform and compare only: no confirmation, refresh, writes or stamp.
    pub dry_run: bool,
    /// Pull the upstream before syncing.
    pub refresh: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            refresh: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed(String),
    Skipped,
    /// Soft failure; the existing tree was used.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampStatus {
    Stamped(StampOutcome),
    Skipped,
    /// Soft failure.
    Failed(String),
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub upstream_root: PathBuf,
    pub upstream_modified: bool,
    pub refresh: RefreshOutcome,
    pub report: SyncReport,
    pub version: String,
    pub stamp: StampStatus,
    /// Soft failures, in the order they happened.
    pub warnings: Vec<String>,
    pub states: Vec<PipelineState>,
}

impl PipelineOutcome {
    pub fn exit_code(&self) -> u8 {
        if self.report.is_complete() {
            EXIT_OK
        } else {
            EXIT_PARTIAL
        }
    }
}

/// One configured pipeline run.
pub struct Pipeline<'a> {
    config: &'a SyncConfig,
    vcs: &'a dyn UpstreamVcs,
    confirm: ConfirmPolicy,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a SyncConfig, vcs: &'a dyn UpstreamVcs) -> Self {
        Self {
            config,
            vcs,
            confirm: ConfirmPolicy::Abort,
            options: PipelineOptions::default(),
        }
    }

    pub fn confirm(mut self, confirm: ConfirmPolicy) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        let config = self.config;
        let dry_run = self.options.dry_run;
        let mut states = Vec::new();
        let mut warnings = Vec::new();
        let mut enter = |state: PipelineState| {
            tracing::debug!(%state, "pipeline state");
            states.push(state);
        };

        enter(PipelineState::Init);
        config.validate()?;
        let transformer = ContentTransformer::from_config(config)?;

        enter(PipelineState::LocateUpstream);
        let root = Locator::new(config.upstream_candidates.clone())
            .clone_url(&config.upstream_url)
            .locate()?;
        tracing::info!(root = %root.display(), "upstream located");

        enter(PipelineState::CheckLocalModifications);
        let mut upstream_modified = false;
        if !dry_run {
            upstream_modified = self
                .vcs
                .has_local_modifications(&root)
                .map_err(|source| PipelineError::Vcs {
                    root: root.clone(),
                    source,
                })?;
            if upstream_modified {
                if !self.confirm.decide(&root) {
                    return Err(PipelineError::ConfirmationDeclined { root });
                }
                warnings.push(format!(
                    "{} has uncommitted changes; syncing anyway",
                    root.display()
                ));
            }
        }

        enter(PipelineState::RefreshUpstream);
        let refresh = if dry_run || !self.options.refresh {
            RefreshOutcome::Skipped
        } else {
            match self.vcs.refresh(&root) {
                Ok(output) => RefreshOutcome::Refreshed(output),
                Err(err) => {
                    tracing::warn!(error = %err, "refresh failed, using existing tree");
                    warnings.push(format!("failed to refresh upstream: {err}"));
                    RefreshOutcome::Failed(err.to_string())
                }
            }
        };

        enter(PipelineState::SyncEntries);
        let report = sync_entries(
            &config.mappings,
            &transformer,
            &config.source_dir(&root),
            &config.embedded_root,
            dry_run,
        );
        for failure in report.failures() {
            warnings.push(format!(
                "{}: {} ({})",
                failure.mapping.upstream.display(),
                failure.status,
                failure.detail.as_deref().unwrap_or("no detail"),
            ));
        }

        enter(PipelineState::StampVersion);
        let version = resolve_version_label(self.vcs, &root, &config.unknown_version);
        let stamp = if dry_run {
            StampStatus::Skipped
        } else {
            let line = stamp_line(&config.stamp_prefix, &version);
            let target = config.stamp_target_path();
            match stamp(&target, &line, &config.stamp_prefix) {
                Ok(StampOutcome::TargetMissing) => {
                    warnings.push(format!("{} not found, version not stamped", target.display()));
                    StampStatus::Stamped(StampOutcome::TargetMissing)
                }
                Ok(outcome) => StampStatus::Stamped(outcome),
                Err(err) => {
                    tracing::warn!(error = %err, "stamp failed");
                    warnings.push(format!("failed to stamp version: {err}"));
                    StampStatus::Failed(err.to_string())
                }
            }
        };

        enter(PipelineState::Done);
        Ok(PipelineOutcome {
            upstream_root: root,
            upstream_modified,
            refresh,
            report,
            version,
            stamp,
            warnings,
            states,
        })
    }
}

/// Exit status for a run that may have aborted.
pub fn exit_code_for(result: &Result<PipelineOutcome, PipelineError>) -> u8 {
    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(_) => EXIT_ABORTED,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use crate::vcs::InMemoryVcs;

    use super::*;

    fn config_in(workspace: &Path) -> SyncConfig {
        SyncConfig::for_tool_dir(workspace.join("YukiSU/userspace/ksud/scripts")).expect("config")
    }

    #[test]
    fn missing_upstream_aborts_before_vcs() {
        let ws = TempDir::new().expect("ws");
        let config = config_in(ws.path());
        let vcs = InMemoryVcs::clean("v1");

        let err = Pipeline::new(&config, &vcs).run().unwrap_err();
        assert!(matches!(err, PipelineError::Location(_)));
        assert!(vcs.calls().is_empty());
        assert_eq!(exit_code_for(&Err(err)), EXIT_ABORTED);
    }

    #[test]
    fn dry_run_skips_vcs_side_effects() {
        let ws = TempDir::new().expect("ws");
        let config = config_in(ws.path());
        std::fs::create_dir_all(&config.upstream_candidates[1]).expect("mkdir");
        let vcs = InMemoryVcs::default().with_modified(Some(true));

        let outcome = Pipeline::new(&config, &vcs)
            .options(PipelineOptions {
                dry_run: true,
                refresh: true,
            })
            .run()
            .expect("dry run");
        assert!(!vcs.calls().contains(&"has_local_modifications"));
        assert!(!vcs.calls().contains(&"refresh"));
        assert_eq!(outcome.refresh, RefreshOutcome::Skipped);
        assert_eq!(outcome.stamp, StampStatus::Skipped);
        assert!(!config.embedded_root.exists());
        assert_eq!(outcome.states.last(), Some(&PipelineState::Done));
    }

    #[test]
    fn state_trail_is_in_order() {
        let ws = TempDir::new().expect("ws");
        let config = config_in(ws.path());
        std::fs::create_dir_all(&config.upstream_candidates[0]).expect("mkdir");
        let vcs = InMemoryVcs::clean("v1");

        let outcome = Pipeline::new(&config, &vcs).run().expect("run");
        assert_eq!(
            outcome.states,
            vec![
                PipelineState::Init,
                PipelineState::LocateUpstream,
                PipelineState::CheckLocalModifications,
                PipelineState::RefreshUpstream,
                PipelineState::SyncEntries,
                PipelineState::StampVersion,
                PipelineState::Done,
            ]
        );
        // Empty upstream: every entry is missing.
        assert_eq!(outcome.report.succeeded(), 0);
        assert_eq!(outcome.exit_code(), EXIT_PARTIAL);
    }
}
