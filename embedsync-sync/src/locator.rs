//! Repository locator: first existing upstream candidate wins.

use std::path::{Path, PathBuf};

use crate::error::LocationError;

/// Probes a fixed, ordered list of candidate upstream roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    candidates: Vec<PathBuf>,
    clone_url: Option<String>,
}

impl Locator {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            clone_url: None,
        }
    }

    /// Suggest cloning `url` when nothing is found.
    pub fn clone_url(mut self, url: impl Into<String>) -> Self {
        self.clone_url = Some(url.into());
        self
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Return the first candidate that exists as a directory.
    pub fn locate(&self) -> Result<PathBuf, LocationError> {
        for candidate in &self.candidates {
            tracing::debug!(candidate = %candidate.display(), "probing upstream");
            if is_dir(candidate) {
                return Ok(candidate.clone());
            }
        }
        Err(LocationError::NotFound {
            candidates: self.candidates.clone(),
            clone_url: self.clone_url.clone(),
        })
    }
}

fn is_dir(path: &Path) -> bool {
    path.metadata().map(|m| m.is_dir()).unwrap_or(false)
}
