//! Error types for embedsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while building or validating configuration.
///
/// Every variant is fatal and raised before the pipeline touches the
/// filesystem (manifest loading aside).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two upstream files would be written onto the same destination.
    #[error("duplicate destination '{destination}' (mapped from '{first}' and '{second}')")]
    DuplicateDestination {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// The same upstream path appears twice in the table.
    #[error("duplicate upstream path '{upstream}'")]
    DuplicateUpstream { upstream: PathBuf },

    /// A mapping entry has an empty upstream or destination path.
    #[error("mapping entry #{index} has an empty path")]
    EmptyPath { index: usize },

    /// A destination is absolute or climbs out of the embedded root.
    #[error("destination '{destination}' escapes the embedded root")]
    DestinationEscapesRoot { destination: PathBuf },

    /// A destination names the embedded root itself rather than a file in it.
    #[error("destination '{destination}' names the embedded root, not a file")]
    DestinationIsRoot { destination: PathBuf },

    /// The configured entry point is not an upstream key of the table.
    #[error("entry point '{entry_point}' is not in the mapping table")]
    UnknownEntryPoint { entry_point: PathBuf },

    /// The tool directory is too shallow to derive the host layout from.
    #[error("cannot derive host layout from tool directory {tool_dir}")]
    ToolDirTooShallow { tool_dir: PathBuf },

    /// A manifest file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest YAML failed to parse; carries the file path and serde_yaml's
    /// line context.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
