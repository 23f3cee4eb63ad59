//! `embedsync list`: the mapping table in processing order.

use anyhow::Result;
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use embedsync_core::SyncConfig;
use embedsync_sync::EXIT_OK;

use crate::GlobalArgs;

/// Arguments for `embedsync list`.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct MappingRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "upstream")]
    upstream: String,
    #[tabled(rename = "destination")]
    destination: String,
    #[tabled(rename = "role")]
    role: &'static str,
}

impl ListArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<u8> {
        let config = super::load_config(global)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(config.mappings.entries())?);
            return Ok(EXIT_OK);
        }

        let mut table = Table::new(rows(&config));
        table.with(Style::rounded());
        println!("{table}");
        println!(
            "{} entries -> {}",
            config.mappings.len(),
            config.embedded_root.display()
        );
        Ok(EXIT_OK)
    }
}

fn rows(config: &SyncConfig) -> Vec<MappingRow> {
    config
        .mappings
        .iter()
        .enumerate()
        .map(|(i, m)| MappingRow {
            index: i + 1,
            upstream: m.upstream.display().to_string(),
            destination: m.destination.display().to_string(),
            role: if m.upstream == config.entry_point {
                "entry point"
            } else if m.destination == config.stamp_target {
                "stamp target"
            } else {
                ""
            },
        })
        .collect()
}
