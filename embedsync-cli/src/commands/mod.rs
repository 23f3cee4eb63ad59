pub mod diff;
pub mod list;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};

use embedsync_core::{load_manifest_at, SyncConfig};

use crate::GlobalArgs;

/// Build the run configuration from `--tool-dir` / `--manifest`.
pub fn load_config(global: &GlobalArgs) -> Result<SyncConfig> {
    let tool_dir = match &global.tool_dir {
        Some(dir) => dir.clone(),
        None => exe_dir()?,
    };
    let mut config = SyncConfig::for_tool_dir(&tool_dir)
        .with_context(|| format!("invalid tool directory {}", tool_dir.display()))?;

    if let Some(path) = &global.manifest {
        let manifest = load_manifest_at(path)?;
        config
            .apply_manifest(manifest)
            .with_context(|| format!("manifest {} rejected", path.display()))?;
    }
    tracing::debug!(
        embedded_root = %config.embedded_root.display(),
        entries = config.mappings.len(),
        "configuration loaded"
    );
    Ok(config)
}

fn exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("could not determine executable path")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(PathBuf::from)
        .context("executable has no parent directory")
}
