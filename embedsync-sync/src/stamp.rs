//! Version provenance stamp.
//!
//! One line, `<prefix><label>`, at the top of a single destination file.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{StampError, SyncError};
use crate::vcs::UpstreamVcs;
use crate::writer::atomic_write;

/// What [`stamp`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampOutcome {
    Inserted,
    AlreadyPresent,
    /// Target does not exist; nothing written.
    TargetMissing,
}

/// Descriptive label, then short revision, then `sentinel`.
pub fn resolve_version_label(vcs: &dyn UpstreamVcs, root: &Path, sentinel: &str) -> String {
    match vcs.describe(root) {
        Ok(label) => return label,
        Err(err) => tracing::debug!(error = %err, "describe failed, trying short revision"),
    }
    match vcs.short_revision(root) {
        Ok(label) => label,
        Err(err) => {
            tracing::debug!(error = %err, "short revision failed, using sentinel");
            sentinel.to_string()
        }
    }
}

/// The stamp line for `label`, newline included.
pub fn stamp_line(prefix: &str, label: &str) -> String {
    format!("{prefix}{label}\n")
}

/// Ensure `target` carries `line` exactly once.
///
/// Nothing is written when `line` is the only line starting with `prefix`.
/// Otherwise every line starting with `prefix` is dropped and `line` is
/// prepended.
pub fn stamp(target: &Path, line: &str, prefix: &str) -> Result<StampOutcome, StampError> {
    let content = match std::fs::read_to_string(target) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::warn!(file = %target.display(), "stamp target missing");
            return Ok(StampOutcome::TargetMissing);
        }
        Err(source) => {
            return Err(StampError::Io {
                path: target.to_path_buf(),
                source,
            })
        }
    };

    let bare = line.trim_end_matches('\n');
    let stamps: Vec<&str> = content.lines().filter(|l| l.starts_with(prefix)).collect();
    if stamps == [bare] {
        tracing::debug!(file = %target.display(), "stamp already present");
        return Ok(StampOutcome::AlreadyPresent);
    }

    let mut stamped = String::with_capacity(line.len() + content.len());
    stamped.push_str(line);
    for kept in content.split_inclusive('\n').filter(|l| !l.starts_with(prefix)) {
        stamped.push_str(kept);
    }

    atomic_write(target, &stamped, false).map_err(|err| match err {
        SyncError::Io { path, source } => StampError::Io { path, source },
    })?;
    tracing::info!(file = %target.display(), stamp = bare, "stamped");
    Ok(StampOutcome::Inserted)
}
