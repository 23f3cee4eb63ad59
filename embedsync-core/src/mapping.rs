//! The mapping table: which upstream files are vendored, and where they land.
//!
//! A [`MappingTable`] can only be obtained through [`MappingTable::new`], so
//! every table in circulation has already passed validation:
//!
//! - no two entries share a destination,
//! - no two entries share an upstream path,
//! - every destination stays inside the embedded root.
//!
//! Declaration order is preserved and defines processing and report order.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::SourceMapping;

/// Built-in table for vendoring meta-hymo into ksud.
const HYMO_MAPPINGS: &[(&str, &str)] = &[
    // Configuration
    ("conf/config.cpp", "conf/config.cpp"),
    ("conf/config.hpp", "conf/config.hpp"),
    // Core
    ("core/executor.cpp", "core/executor.cpp"),
    ("core/executor.hpp", "core/executor.hpp"),
    ("core/inventory.cpp", "core/inventory.cpp"),
    ("core/inventory.hpp", "core/inventory.hpp"),
    ("core/json.hpp", "core/json.hpp"),
    ("core/modules.cpp", "core/modules.cpp"),
    ("core/modules.hpp", "core/modules.hpp"),
    ("core/planner.cpp", "core/planner.cpp"),
    ("core/planner.hpp", "core/planner.hpp"),
    ("core/state.cpp", "core/state.cpp"),
    ("core/state.hpp", "core/state.hpp"),
    ("core/storage.cpp", "core/storage.cpp"),
    ("core/storage.hpp", "core/storage.hpp"),
    ("core/sync.cpp", "core/sync.cpp"),
    ("core/sync.hpp", "core/sync.hpp"),
    ("core/user_rules.cpp", "core/user_rules.cpp"),
    ("core/user_rules.hpp", "core/user_rules.hpp"),
    // Mount
    ("mount/hymo_magic.h", "mount/hymo_magic.h"),
    ("mount/hymofs.cpp", "mount/hymofs.cpp"),
    ("mount/hymofs.hpp", "mount/hymofs.hpp"),
    ("mount/magic.cpp", "mount/magic.cpp"),
    ("mount/magic.hpp", "mount/magic.hpp"),
    ("mount/overlay.cpp", "mount/overlay.cpp"),
    ("mount/overlay.hpp", "mount/overlay.hpp"),
    // Renamed to avoid clashing with the host's own utils/defs
    ("utils.cpp", "hymo_utils.cpp"),
    ("utils.hpp", "hymo_utils.hpp"),
    ("defs.hpp", "hymo_defs.hpp"),
    // Entry point, structurally adapted
    ("main.cpp", "hymo_cli.cpp"),
];

/// Validated, ordered registry of [`SourceMapping`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SourceMapping>", into = "Vec<SourceMapping>")]
pub struct MappingTable {
    entries: Vec<SourceMapping>,
}

impl MappingTable {
    /// Build a table, rejecting duplicates and escaping destinations.
    pub fn new(entries: Vec<SourceMapping>) -> Result<Self, ConfigError> {
        let mut by_destination: HashMap<PathBuf, &Path> = HashMap::new();
        let mut upstreams: HashSet<PathBuf> = HashSet::new();

        for (index, entry) in entries.iter().enumerate() {
            if entry.upstream.as_os_str().is_empty() || entry.destination.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath { index });
            }
            if !stays_inside(&entry.destination) {
                return Err(ConfigError::DestinationEscapesRoot {
                    destination: entry.destination.clone(),
                });
            }
            let destination = normalize(&entry.destination);
            if destination.as_os_str().is_empty() {
                return Err(ConfigError::DestinationIsRoot {
                    destination: entry.destination.clone(),
                });
            }
            if !upstreams.insert(normalize(&entry.upstream)) {
                return Err(ConfigError::DuplicateUpstream {
                    upstream: entry.upstream.clone(),
                });
            }
            if let Some(first) = by_destination.insert(destination, &entry.upstream) {
                return Err(ConfigError::DuplicateDestination {
                    destination: entry.destination.clone(),
                    first: first.to_path_buf(),
                    second: entry.upstream.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    /// The built-in meta-hymo → ksud table.
    pub fn builtin() -> Self {
        Self {
            entries: HYMO_MAPPINGS
                .iter()
                .map(|&(from, to)| SourceMapping::new(from, to))
                .collect(),
        }
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[SourceMapping] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceMapping> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its upstream path.
    pub fn get(&self, upstream: impl AsRef<Path>) -> Option<&SourceMapping> {
        let upstream = upstream.as_ref();
        self.entries.iter().find(|e| e.upstream == upstream)
    }

    /// Destination for `upstream`, if mapped.
    pub fn destination_of(&self, upstream: impl AsRef<Path>) -> Option<&Path> {
        self.get(upstream).map(|e| e.destination.as_path())
    }

    pub fn contains_destination(&self, destination: impl AsRef<Path>) -> bool {
        let destination = destination.as_ref();
        self.entries.iter().any(|e| e.destination == destination)
    }
}

impl TryFrom<Vec<SourceMapping>> for MappingTable {
    type Error = ConfigError;

    fn try_from(entries: Vec<SourceMapping>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<MappingTable> for Vec<SourceMapping> {
    fn from(table: MappingTable) -> Self {
        table.entries
    }
}

impl<'a> IntoIterator for &'a MappingTable {
    type Item = &'a SourceMapping;
    type IntoIter = std::slice::Iter<'a, SourceMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// `true` when `path` is relative and never climbs above its base.
fn stays_inside(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// `path` with every `.` component dropped.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Join a validated destination onto the embedded root.
pub fn destination_path(embedded_root: &Path, mapping: &SourceMapping) -> PathBuf {
    embedded_root.join(&mapping.destination)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let builtin = MappingTable::builtin();
        let rebuilt = MappingTable::new(builtin.entries().to_vec()).expect("valid");
        assert_eq!(rebuilt.len(), 30);
    }

    #[test]
    fn builtin_renames_utils_and_entry_point() {
        let table = MappingTable::builtin();
        assert_eq!(
            table.destination_of("utils.hpp"),
            Some(Path::new("hymo_utils.hpp"))
        );
        assert_eq!(
            table.destination_of("main.cpp"),
            Some(Path::new("hymo_cli.cpp"))
        );
        assert!(table.contains_destination("hymo_defs.hpp"));
    }

    #[test]
    fn order_is_declaration_order() {
        let table = MappingTable::new(vec![
            SourceMapping::new("z.cpp", "z.cpp"),
            SourceMapping::new("a.cpp", "a.cpp"),
        ])
        .unwrap();
        let ups: Vec<_> = table.iter().map(|e| e.upstream.clone()).collect();
        assert_eq!(ups, vec![PathBuf::from("z.cpp"), PathBuf::from("a.cpp")]);
    }

    #[test]
    fn stays_inside_accepts_nested_relative_paths() {
        assert!(stays_inside(Path::new("core/state.cpp")));
        assert!(stays_inside(Path::new("./core/state.cpp")));
        assert!(!stays_inside(Path::new("../state.cpp")));
        assert!(!stays_inside(Path::new("/etc/passwd")));
    }

    #[test]
    fn normalize_drops_current_dir_components() {
        assert_eq!(
            normalize(Path::new("./core/./state.cpp")),
            PathBuf::from("core/state.cpp")
        );
        assert!(normalize(Path::new("./.")).as_os_str().is_empty());
    }
}
