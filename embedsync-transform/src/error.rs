//! Error types for embedsync-transform.

use thiserror::Error;

/// Errors raised while building a [`crate::ContentTransformer`].
///
/// Applying a built transformer never fails.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// A structural rule pattern failed to compile.
    #[error("invalid pattern for rule '{rule}': {source}")]
    Pattern {
        rule: &'static str,
        #[source]
        source: regex::Error,
    },

    /// The configured entry point has no destination in the mapping table.
    #[error("entry point '{0}' has no mapped destination")]
    UnmappedEntryPoint(String),
}
