//! Error types for embedsync-sync.
//!
//! Only [`PipelineError`] is fatal. Everything else is caught at the narrowest
//! scope and turned into a per-entry status or a warning.

use std::path::PathBuf;

use thiserror::Error;

use embedsync_core::ConfigError;
use embedsync_transform::TransformError;

/// I/O failure while reading or writing one synced file.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// No upstream candidate exists.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error(
        "upstream tree not found; probed: {}{}",
        display_paths(.candidates),
        clone_hint(.candidates, .clone_url.as_deref())
    )]
    NotFound {
        candidates: Vec<PathBuf>,
        /// Repository to suggest cloning into the first candidate.
        clone_url: Option<String>,
    },
}

/// Failure of the external version-control client.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The client binary could not be spawned at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The client ran and exited unsuccessfully.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The client ran but produced nothing usable.
    #[error("`{command}` produced no output")]
    EmptyOutput { command: String },

    /// Scripted failure from an in-memory client.
    #[error("{0}")]
    Scripted(String),
}

/// Failure to record the provenance stamp. Always soft.
#[derive(Debug, Error)]
pub enum StampError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors that abort the pipeline before any entry is synced.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("transformer setup error: {0}")]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Location(#[from] LocationError),

    /// Upstream has uncommitted changes and the operator did not confirm.
    #[error("upstream at {root} has uncommitted changes; sync declined")]
    ConfirmationDeclined { root: PathBuf },

    /// The version-control client was unusable during the modification check.
    #[error("cannot inspect upstream at {root}: {source}")]
    Vcs {
        root: PathBuf,
        #[source]
        source: VcsError,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn clone_hint(candidates: &[PathBuf], clone_url: Option<&str>) -> String {
    match (clone_url, candidates.first()) {
        (Some(url), Some(first)) => {
            format!("\nclone it with: git clone {url} {}", first.display())
        }
        _ => String::new(),
    }
}
