//! Narrow interface to the upstream's version-control client.
//!
//! [`GitCli`] shells out to `git` synchronously; calls block until the child
//! exits. [`InMemoryVcs`] is a scripted stand-in for tests.

use std::cell::RefCell;
use std::path::Path;
use std::process::Command;

use crate::error::VcsError;

/// Operations the pipeline needs from version control.
pub trait UpstreamVcs {
    /// `true` if the working tree has uncommitted changes.
    fn has_local_modifications(&self, root: &Path) -> Result<bool, VcsError>;

    /// Pull the latest upstream changes; returns the client's output.
    fn refresh(&self, root: &Path) -> Result<String, VcsError>;

    /// Descriptive version label (tag-based where possible).
    fn describe(&self, root: &Path) -> Result<String, VcsError>;

    /// Short commit identifier.
    fn short_revision(&self, root: &Path) -> Result<String, VcsError>;
}

// ---------------------------------------------------------------------------
// GitCli
// ---------------------------------------------------------------------------

/// [`UpstreamVcs`] backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different client binary (e.g. a wrapper script).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run a git command in `root` and return trimmed stdout.
    fn git_command(&self, root: &Path, args: &[&str]) -> Result<String, VcsError> {
        let command = format!("{} {}", self.program, args.join(" "));
        tracing::debug!(%command, root = %root.display(), "running");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(root)
            .output()
            .map_err(|source| VcsError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(VcsError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn non_empty(&self, root: &Path, args: &[&str]) -> Result<String, VcsError> {
        let out = self.git_command(root, args)?;
        if out.is_empty() {
            return Err(VcsError::EmptyOutput {
                command: format!("{} {}", self.program, args.join(" ")),
            });
        }
        Ok(out)
    }
}

impl UpstreamVcs for GitCli {
    fn has_local_modifications(&self, root: &Path) -> Result<bool, VcsError> {
        Ok(!self.git_command(root, &["status", "--porcelain"])?.is_empty())
    }

    fn refresh(&self, root: &Path) -> Result<String, VcsError> {
        self.git_command(root, &["pull"])
    }

    fn describe(&self, root: &Path) -> Result<String, VcsError> {
        self.non_empty(root, &["describe", "--tags", "--always"])
    }

    fn short_revision(&self, root: &Path) -> Result<String, VcsError> {
        self.non_empty(root, &["rev-parse", "--short", "HEAD"])
    }
}

// ---------------------------------------------------------------------------
// InMemoryVcs
// ---------------------------------------------------------------------------

/// Scripted [`UpstreamVcs`]; every answer is configured up front and every
/// call is recorded.
#[derive(Debug)]
pub struct InMemoryVcs {
    modified: Option<bool>,
    refresh: Result<String, String>,
    describe: Option<String>,
    short_revision: Option<String>,
    calls: RefCell<Vec<&'static str>>,
}

impl Default for InMemoryVcs {
    fn default() -> Self {
        Self {
            modified: Some(false),
            refresh: Ok(String::new()),
            describe: None,
            short_revision: None,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl InMemoryVcs {
    /// A clean tree that refreshes successfully and describes as `label`.
    pub fn clean(label: impl Into<String>) -> Self {
        Self::default()
            .with_refresh(Ok("Already up to date.".to_string()))
            .with_describe(Some(label.into()))
    }

    /// `None` makes the modification check fail.
    pub fn with_modified(mut self, modified: Option<bool>) -> Self {
        self.modified = modified;
        self
    }

    pub fn with_refresh(mut self, refresh: Result<String, String>) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_describe(mut self, label: Option<String>) -> Self {
        self.describe = label;
        self
    }

    pub fn with_short_revision(mut self, revision: Option<String>) -> Self {
        self.short_revision = revision;
        self
    }

    /// Names of the operations invoked so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, op: &'static str) {
        self.calls.borrow_mut().push(op);
    }
}

impl UpstreamVcs for InMemoryVcs {
    fn has_local_modifications(&self, _root: &Path) -> Result<bool, VcsError> {
        self.record("has_local_modifications");
        self.modified
            .ok_or_else(|| VcsError::Scripted("status unavailable".to_string()))
    }

    fn refresh(&self, _root: &Path) -> Result<String, VcsError> {
        self.record("refresh");
        self.refresh.clone().map_err(VcsError::Scripted)
    }

    fn describe(&self, _root: &Path) -> Result<String, VcsError> {
        self.record("describe");
        self.describe
            .clone()
            .ok_or_else(|| VcsError::Scripted("no tags".to_string()))
    }

    fn short_revision(&self, _root: &Path) -> Result<String, VcsError> {
        self.record("short_revision");
        self.short_revision
            .clone()
            .ok_or_else(|| VcsError::Scripted("no HEAD".to_string()))
    }
}
