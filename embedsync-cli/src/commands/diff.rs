//! `embedsync diff`: show unified diffs for what sync would write.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use embedsync_sync::{diff_entries, Locator, EXIT_OK};
use embedsync_transform::ContentTransformer;

use crate::GlobalArgs;

/// Arguments for `embedsync diff`.
#[derive(Args, Debug, Default)]
pub struct DiffArgs {}

impl DiffArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<u8> {
        let config = super::load_config(global)?;
        let transformer = ContentTransformer::from_config(&config)?;
        let root = Locator::new(config.upstream_candidates.clone())
            .clone_url(&config.upstream_url)
            .locate()?;

        let report = diff_entries(
            &config.mappings,
            &transformer,
            &config.source_dir(&root),
            &config.embedded_root,
        );

        for missing in &report.missing {
            eprintln!(
                "{} {}: source missing",
                "warning:".yellow().bold(),
                missing.upstream.display()
            );
        }

        for (mapping, reason) in &report.unreadable {
            eprintln!(
                "{} {}: cannot diff ({reason})",
                "warning:".yellow().bold(),
                mapping.upstream.display()
            );
        }

        if report.is_clean() {
            println!("No differences in {}.", config.embedded_root.display());
            return Ok(EXIT_OK);
        }

        for diff in report.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(EXIT_OK)
    }
}
