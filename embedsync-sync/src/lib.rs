//! # embedsync-sync
//!
//! Locates the upstream tree, syncs every mapped file through the content
//! transformer with hash-gated atomic writes, and stamps the upstream version.
//!
//! Build a [`Pipeline`] from a [`embedsync_core::SyncConfig`] and an
//! [`UpstreamVcs`], then call [`Pipeline::run`].

pub mod confirm;
pub mod diff;
pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod pipeline;
pub mod stamp;
pub mod vcs;
pub mod writer;

pub use confirm::ConfirmPolicy;
pub use diff::{diff_entries, DiffReport, FileDiff};
pub use error::{LocationError, PipelineError, StampError, SyncError, VcsError};
pub use locator::Locator;
pub use orchestrator::{sync_entries, SyncReport, SyncResult, SyncStatus};
pub use pipeline::{
    exit_code_for, Pipeline, PipelineOptions, PipelineOutcome, PipelineState, RefreshOutcome,
    StampStatus, EXIT_ABORTED, EXIT_OK, EXIT_PARTIAL,
};
pub use stamp::{resolve_version_label, stamp, stamp_line, StampOutcome};
pub use vcs::{GitCli, InMemoryVcs, UpstreamVcs};
pub use writer::{atomic_write, WriteResult};
