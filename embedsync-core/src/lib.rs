//! embedsync core library: domain types, mapping table, configuration, errors.
//!
//! Public API surface:
//! - [`types`]: mappings, include rewrites, embedding names
//! - [`mapping`]: the validated [`MappingTable`]
//! - [`config`]: [`SyncConfig`] and the optional YAML [`Manifest`]
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod mapping;
pub mod types;

pub use config::{load_manifest_at, Manifest, SyncConfig};
pub use error::ConfigError;
pub use mapping::MappingTable;
pub use types::{EmbedNames, IncludeRewrite, SourceMapping};
