//! Unified diff of what a sync would write, for `embedsync diff`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use embedsync_core::{mapping::destination_path, MappingTable, SourceMapping};
use embedsync_transform::ContentTransformer;

/// A single destination that would change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diff result across the whole mapping table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub diffs: Vec<FileDiff>,
    /// Entries whose upstream source is absent; nothing to compare.
    pub missing: Vec<SourceMapping>,
    /// Entries whose source or destination could not be read as UTF-8 text,
    /// with the reason.
    pub unreadable: Vec<(SourceMapping, String)>,
}

impl DiffReport {
    pub fn is_clean(&self) -> bool {
        self.diffs.is_empty()
    }
}

/// Transform every entry and compare with the embedded tree. Writes nothing.
///
/// Missing and unreadable entries are recorded and skipped.
pub fn diff_entries(
    table: &MappingTable,
    transformer: &ContentTransformer,
    source_dir: &Path,
    embedded_root: &Path,
) -> DiffReport {
    let mut report = DiffReport::default();

    for mapping in table {
        let source = source_dir.join(&mapping.upstream);
        let raw = match read_text(&source) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                report.missing.push(mapping.clone());
                continue;
            }
            Err(reason) => {
                tracing::warn!(source = %source.display(), %reason, "cannot diff entry");
                report.unreadable.push((mapping.clone(), reason));
                continue;
            }
        };
        let rendered = transformer.transform(&raw, &mapping.upstream);

        let dest = destination_path(embedded_root, mapping);
        let existing = match read_text(&dest) {
            Ok(existing) => existing.unwrap_or_default(),
            Err(reason) => {
                tracing::warn!(dest = %dest.display(), %reason, "cannot diff entry");
                report.unreadable.push((mapping.clone(), reason));
                continue;
            }
        };
        if existing == rendered {
            continue;
        }

        let old_header = format!("a/{}", mapping.destination.display());
        let new_header = format!("b/{}", mapping.destination.display());
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        report.diffs.push(FileDiff {
            path: dest,
            unified_diff: unified,
        });
    }

    report
}

/// `Ok(None)` when `path` does not exist, `Err` with a reason when it cannot
/// be read as UTF-8 text.
fn read_text(path: &Path) -> Result<Option<String>, String> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(format!("{}: {err}", path.display())),
    };
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|err| format!("{}: {err}", path.display()))
}
