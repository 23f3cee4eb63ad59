//! Fail-soft per-entry sync loop and its report.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};

use embedsync_core::{mapping::destination_path, MappingTable, SourceMapping};
use embedsync_transform::ContentTransformer;

use crate::writer::{atomic_write, WriteResult};

/// Per-entry outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Written, already up to date, or (dry-run) would be written.
    Synced,
    SourceMissing,
    ReadError,
    WriteError,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Synced => "synced",
            Self::SourceMissing => "source missing",
            Self::ReadError => "read error",
            Self::WriteError => "write error",
        })
    }
}

/// One row of the sync report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub mapping: SourceMapping,
    pub status: SyncStatus,
    /// Human-readable context for non-`Synced` statuses.
    pub detail: Option<String>,
    /// Writer outcome when the entry reached the write phase successfully.
    pub write: Option<WriteResult>,
}

impl SyncResult {
    fn failed(mapping: &SourceMapping, status: SyncStatus, detail: String) -> Self {
        Self {
            mapping: mapping.clone(),
            status,
            detail: Some(detail),
            write: None,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.status == SyncStatus::Synced
    }
}

/// Ordered results for every mapping entry.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<SyncResult>,
}

impl SyncReport {
    /// Wall-clock time spent in the entry loop, in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_synced()).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn is_complete(&self) -> bool {
        self.succeeded() == self.total()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncResult> {
        self.results.iter().filter(|r| !r.is_synced())
    }

    /// Entries whose destination content changed (or would change).
    pub fn changed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.write.as_ref().is_some_and(WriteResult::is_change))
            .count()
    }
}

/// Process every entry of `table` in order. Never aborts early.
pub fn sync_entries(
    table: &MappingTable,
    transformer: &ContentTransformer,
    source_dir: &Path,
    embedded_root: &Path,
    dry_run: bool,
) -> SyncReport {
    let started_at = Utc::now();
    let results = table
        .iter()
        .map(|mapping| sync_entry(mapping, transformer, source_dir, embedded_root, dry_run))
        .collect();
    SyncReport {
        started_at,
        finished_at: Utc::now(),
        results,
    }
}

fn sync_entry(
    mapping: &SourceMapping,
    transformer: &ContentTransformer,
    source_dir: &Path,
    embedded_root: &Path,
    dry_run: bool,
) -> SyncResult {
    let source = source_dir.join(&mapping.upstream);
    tracing::debug!(%mapping, "syncing entry");

    let raw = match std::fs::read(&source) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::warn!(source = %source.display(), "source missing");
            return SyncResult::failed(
                mapping,
                SyncStatus::SourceMissing,
                format!("{} not found", source.display()),
            );
        }
        Err(err) => {
            tracing::warn!(source = %source.display(), error = %err, "read failed");
            return SyncResult::failed(
                mapping,
                SyncStatus::ReadError,
                format!("{}: {err}", source.display()),
            );
        }
    };
    let content = match String::from_utf8(raw) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(source = %source.display(), "source is not UTF-8");
            return SyncResult::failed(
                mapping,
                SyncStatus::ReadError,
                format!("{}: {err}", source.display()),
            );
        }
    };

    let transformed = transformer.transform(&content, &mapping.upstream);
    let dest = destination_path(embedded_root, mapping);

    match atomic_write(&dest, &transformed, dry_run) {
        Ok(write) => {
            if write.is_change() && !dry_run {
                tracing::info!(dest = %dest.display(), "wrote");
            }
            SyncResult {
                mapping: mapping.clone(),
                status: SyncStatus::Synced,
                detail: None,
                write: Some(write),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "write failed");
            SyncResult::failed(mapping, SyncStatus::WriteError, err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn table(names: &[&str]) -> MappingTable {
        MappingTable::new(names.iter().map(|n| SourceMapping::new(*n, *n)).collect()).unwrap()
    }

    fn plain_transformer() -> ContentTransformer {
        ContentTransformer::new(vec![], "main.cpp", vec![])
    }

    #[test]
    fn missing_source_is_recorded_and_loop_continues() {
        let up = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(up.path().join("a"), "A").unwrap();
        fs::write(up.path().join("c"), "C").unwrap();

        let report = sync_entries(
            &table(&["a", "b", "c"]),
            &plain_transformer(),
            up.path(),
            out.path(),
            false,
        );
        assert_eq!((report.succeeded(), report.total()), (2, 3));
        assert_eq!(report.results[1].status, SyncStatus::SourceMissing);
        assert!(out.path().join("c").exists());
        assert!(!out.path().join("b").exists());
    }

    #[test]
    fn unreadable_source_is_read_error_without_partial_write() {
        let up = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        // A directory in place of the source file fails to read.
        fs::create_dir(up.path().join("a")).unwrap();

        let report = sync_entries(&table(&["a"]), &plain_transformer(), up.path(), out.path(), false);
        assert_eq!(report.results[0].status, SyncStatus::ReadError);
        assert!(!out.path().join("a").exists());
    }

    #[test]
    fn blocked_destination_is_write_error() {
        let up = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(up.path().join("a"), "A").unwrap();
        fs::write(up.path().join("b"), "B").unwrap();
        // A plain file where a parent directory should go.
        fs::write(out.path().join("sub"), "file").unwrap();

        let mappings = MappingTable::new(vec![
            SourceMapping::new("a", "sub/a"),
            SourceMapping::new("b", "b"),
        ])
        .unwrap();
        let report = sync_entries(&mappings, &plain_transformer(), up.path(), out.path(), false);
        assert_eq!(report.results[0].status, SyncStatus::WriteError);
        assert!(report.results[0].detail.is_some());
        assert_eq!(report.results[1].status, SyncStatus::Synced);
    }

    #[test]
    fn dry_run_reports_synced_without_writing() {
        let up = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(up.path().join("a"), "A").unwrap();

        let report = sync_entries(&table(&["a"]), &plain_transformer(), up.path(), out.path(), true);
        assert!(report.is_complete());
        assert!(matches!(report.results[0].write, Some(WriteResult::WouldWrite { .. })));
        assert_eq!(report.changed(), 1);
        assert!(!out.path().join("a").exists());
    }

    #[test]
    fn report_records_when_the_loop_ran() {
        let up = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(up.path().join("a"), "A").unwrap();

        let before = Utc::now();
        let report = sync_entries(&table(&["a"]), &plain_transformer(), up.path(), out.path(), false);
        assert!(report.started_at >= before);
        assert!(report.finished_at >= report.started_at);
        assert!(report.elapsed_ms() >= 0);
    }
}
