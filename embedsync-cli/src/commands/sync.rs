//! `embedsync sync`: run the full pipeline.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use embedsync_sync::{
    ConfirmPolicy, GitCli, Pipeline, PipelineOptions, PipelineOutcome, RefreshOutcome,
    StampOutcome, StampStatus, SyncStatus, WriteResult,
};

use crate::GlobalArgs;

/// Arguments for `embedsync sync`.
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Proceed even if the upstream tree has uncommitted changes.
    #[arg(short, long)]
    pub yes: bool,

    /// Do not pull the upstream before syncing.
    #[arg(long)]
    pub no_refresh: bool,

    /// Show what would be written without touching the embedded tree.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<u8> {
        let config = super::load_config(global)?;
        let vcs = GitCli::new();
        let confirm = if self.yes {
            ConfirmPolicy::Proceed
        } else {
            ConfirmPolicy::stdin_prompt()
        };

        let outcome = Pipeline::new(&config, &vcs)
            .confirm(confirm)
            .options(PipelineOptions {
                dry_run: self.dry_run,
                refresh: !self.no_refresh,
            })
            .run()?;

        print_outcome(&outcome, self.dry_run);
        Ok(outcome.exit_code())
    }
}

fn warn(message: impl std::fmt::Display) {
    eprintln!("{} {message}", "warning:".yellow().bold());
}

fn print_outcome(outcome: &PipelineOutcome, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!("Found upstream at {}", outcome.upstream_root.display());

    if let RefreshOutcome::Refreshed(output) = &outcome.refresh {
        println!("✓ Pulled latest upstream changes");
        for line in output.lines() {
            println!("  {}", line.dimmed());
        }
    }

    for result in &outcome.report.results {
        if result.status != SyncStatus::Synced {
            continue;
        }
        let marker = match &result.write {
            Some(WriteResult::Unchanged { .. }) => " (unchanged)".dimmed().to_string(),
            _ => String::new(),
        };
        println!("{prefix}✓ Synced: {}{marker}", result.mapping);
    }

    match &outcome.stamp {
        StampStatus::Stamped(StampOutcome::Inserted) => {
            println!("✓ Stamped upstream version {}", outcome.version)
        }
        StampStatus::Stamped(StampOutcome::AlreadyPresent) => {
            println!("✓ Upstream version {} already stamped", outcome.version)
        }
        _ => {}
    }

    for warning in &outcome.warnings {
        warn(warning);
    }

    let report = &outcome.report;
    println!(
        "\n{prefix}Sync complete: {}/{} files synced successfully (started {}, {} ms)",
        report.succeeded(),
        report.total(),
        report.started_at.format("%H:%M:%S UTC"),
        report.elapsed_ms()
    );
}
