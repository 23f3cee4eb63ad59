//! # embedsync-transform
//!
//! Ordered, deterministic text-transformation pipeline that adapts vendored
//! upstream sources for embedding in the host.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use embedsync_core::SyncConfig;
//! use embedsync_transform::ContentTransformer;
//!
//! fn adapt(config: &SyncConfig, raw: &str) -> Option<String> {
//!     let transformer = ContentTransformer::from_config(config).ok()?;
//!     Some(transformer.transform(raw, Path::new("main.cpp")))
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod rules;
pub mod transformer;

pub use context::TemplateContext;
pub use engine::{Fragments, TemplateEngine};
pub use error::TransformError;
pub use rules::{
    AdapterRule, EntryPointRule, HelpFunctionRule, LiteralRule, ProvenanceHeaderRule,
    TransformRule, UsageBannerRule,
};
pub use transformer::ContentTransformer;
