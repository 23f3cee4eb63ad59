//! Run configuration, built once at startup and passed by reference.
//!
//! # Layout derived from the tool directory
//!
//! ```text
//! <workspace>/                  sibling-workspace fallback
//!   meta-hymo/                  upstream candidate #2
//!   <host project>/
//!     meta-hymo/                upstream candidate #1 (co-located)
//!     userspace/
//!       ksud/                   host_dir
//!         scripts/              tool_dir
//!         src/hymo/             embedded_root
//! ```
//!
//! # API pattern
//!
//! - [`SyncConfig::for_tool_dir`] derives every path from one directory.
//! - [`load_manifest_at`] reads an optional YAML manifest.
//! - [`SyncConfig::apply_manifest`] merges it and re-validates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::mapping::MappingTable;
use crate::types::{EmbedNames, IncludeRewrite, SourceMapping};

pub const DEFAULT_UPSTREAM_DIR_NAME: &str = "meta-hymo";
pub const DEFAULT_UPSTREAM_URL: &str = "https://github.com/Anatdx/meta-hymo";
pub const DEFAULT_SOURCE_SUBDIR: &str = "src";
pub const DEFAULT_ENTRY_POINT: &str = "main.cpp";
pub const DEFAULT_STAMP_TARGET: &str = "hymo_defs.hpp";
pub const DEFAULT_STAMP_PREFIX: &str = "// Synced from hymo ";
pub const UNKNOWN_VERSION: &str = "unknown";

/// Include rewrites for renamed `defs.hpp` / `utils.hpp`, at every depth the
/// upstream tree uses. Applied in this order.
pub fn default_include_rewrites() -> Vec<IncludeRewrite> {
    let mut rewrites = Vec::new();
    for prefix in ["", "../", "../../"] {
        for header in ["defs.hpp", "utils.hpp"] {
            rewrites.push(IncludeRewrite::new(
                format!("#include \"{prefix}{header}\""),
                format!("#include \"{prefix}hymo_{header}\""),
            ));
        }
    }
    rewrites
}

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

/// Everything a pipeline run needs to know, with no ambient globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Directory the tool is installed in.
    pub tool_dir: PathBuf,
    /// Host component directory (`tool_dir/..`).
    pub host_dir: PathBuf,
    /// Directory name of the upstream checkout.
    pub upstream_dir_name: String,
    /// Upstream roots to probe, in order.
    pub upstream_candidates: Vec<PathBuf>,
    /// Repository suggested for cloning when no candidate exists.
    pub upstream_url: String,
    /// Subdirectory of the upstream root that mapping paths are relative to.
    pub source_subdir: PathBuf,
    /// Root every destination is nested under.
    pub embedded_root: PathBuf,
    /// Upstream path of the file that receives structural rewrites.
    pub entry_point: PathBuf,
    /// Destination path that carries the provenance stamp.
    pub stamp_target: PathBuf,
    pub stamp_prefix: String,
    /// Label used when no version can be probed.
    pub unknown_version: String,
    pub naming: EmbedNames,
    pub include_rewrites: Vec<IncludeRewrite>,
    pub mappings: MappingTable,
}

impl SyncConfig {
    /// Derive the standard layout from the tool's install directory.
    pub fn for_tool_dir(tool_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let tool_dir = tool_dir.into();
        let host_dir = tool_dir
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::ToolDirTooShallow {
                tool_dir: tool_dir.clone(),
            })?;
        let upstream_dir_name = DEFAULT_UPSTREAM_DIR_NAME.to_string();
        let upstream_candidates = upstream_candidates_for(&tool_dir, &host_dir, &upstream_dir_name)?;
        let embedded_root = host_dir.join("src").join("hymo");

        let config = Self {
            tool_dir,
            host_dir,
            upstream_dir_name,
            upstream_candidates,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            source_subdir: PathBuf::from(DEFAULT_SOURCE_SUBDIR),
            embedded_root,
            entry_point: PathBuf::from(DEFAULT_ENTRY_POINT),
            stamp_target: PathBuf::from(DEFAULT_STAMP_TARGET),
            stamp_prefix: DEFAULT_STAMP_PREFIX.to_string(),
            unknown_version: UNKNOWN_VERSION.to_string(),
            naming: EmbedNames::default(),
            include_rewrites: default_include_rewrites(),
            mappings: MappingTable::builtin(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Merge a manifest over this configuration and re-validate.
    pub fn apply_manifest(&mut self, manifest: Manifest) -> Result<(), ConfigError> {
        if let Some(name) = manifest.upstream_dir_name {
            self.upstream_candidates = upstream_candidates_for(&self.tool_dir, &self.host_dir, &name)?;
            self.upstream_dir_name = name;
        }
        if let Some(url) = manifest.upstream_url {
            self.upstream_url = url;
        }
        if let Some(subdir) = manifest.source_subdir {
            self.source_subdir = subdir;
        }
        if let Some(entry_point) = manifest.entry_point {
            self.entry_point = entry_point;
        }
        if let Some(stamp_target) = manifest.stamp_target {
            self.stamp_target = stamp_target;
        }
        if let Some(naming) = manifest.naming {
            self.stamp_prefix = format!("// Synced from {} ", naming.upstream_label);
            self.naming = naming;
        }
        if let Some(rewrites) = manifest.include_rewrites {
            self.include_rewrites = rewrites;
        }
        if let Some(mappings) = manifest.mappings {
            self.mappings = MappingTable::new(mappings)?;
        }
        self.validate()
    }

    /// Cross-field checks that a bare [`MappingTable`] cannot make.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mappings.get(&self.entry_point).is_none() {
            return Err(ConfigError::UnknownEntryPoint {
                entry_point: self.entry_point.clone(),
            });
        }
        Ok(())
    }

    /// `<upstream_root>/<source_subdir>`.
    pub fn source_dir(&self, upstream_root: &Path) -> PathBuf {
        upstream_root.join(&self.source_subdir)
    }

    /// Destination of the entry point file, relative to the embedded root.
    pub fn entry_point_destination(&self) -> Option<&Path> {
        self.mappings.destination_of(&self.entry_point)
    }

    /// Absolute path of the stamp target.
    pub fn stamp_target_path(&self) -> PathBuf {
        self.embedded_root.join(&self.stamp_target)
    }
}

fn upstream_candidates_for(
    tool_dir: &Path,
    host_dir: &Path,
    dir_name: &str,
) -> Result<Vec<PathBuf>, ConfigError> {
    let too_shallow = || ConfigError::ToolDirTooShallow {
        tool_dir: tool_dir.to_path_buf(),
    };
    let project_root = host_dir
        .parent()
        .and_then(Path::parent)
        .ok_or_else(too_shallow)?;
    let workspace = project_root.parent().ok_or_else(too_shallow)?;
    Ok(vec![project_root.join(dir_name), workspace.join(dir_name)])
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Optional YAML overrides for [`SyncConfig`].
///
/// ```yaml
/// upstream_dir_name: meta-hymo
/// upstream_url: https://github.com/Anatdx/meta-hymo
/// entry_point: main.cpp
/// include_rewrites:
///   - from: '#include "defs.hpp"'
///     to: '#include "hymo_defs.hpp"'
/// mappings:
///   - upstream: main.cpp
///     destination: hymo_cli.cpp
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub upstream_dir_name: Option<String>,
    pub upstream_url: Option<String>,
    pub source_subdir: Option<PathBuf>,
    pub entry_point: Option<PathBuf>,
    pub stamp_target: Option<PathBuf>,
    pub naming: Option<EmbedNames>,
    pub include_rewrites: Option<Vec<IncludeRewrite>>,
    pub mappings: Option<Vec<SourceMapping>>,
}

/// Load a manifest from `path`.
///
/// Returns `ConfigError::Io` if unreadable, `ConfigError::Parse` (with path +
/// line context) if malformed.
pub fn load_manifest_at(path: &Path) -> Result<Manifest, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
