//! [`ContentTransformer`]: the ordered rule pipeline.

use std::path::{Path, PathBuf};

use embedsync_core::SyncConfig;

use crate::context::TemplateContext;
use crate::engine::TemplateEngine;
use crate::error::TransformError;
use crate::rules::{
    AdapterRule, EntryPointRule, HelpFunctionRule, LiteralRule, ProvenanceHeaderRule,
    TransformRule, UsageBannerRule,
};

/// Pure `(content, source path) → content` function built from config.
///
/// Literal rules run on every file in declared order; structural rules run
/// afterwards, and only when the source path equals the entry point.
pub struct ContentTransformer {
    literal: Vec<LiteralRule>,
    entry_point: PathBuf,
    structural: Vec<Box<dyn TransformRule>>,
}

impl ContentTransformer {
    /// Build the pipeline for `config`, rendering header and adapter once.
    pub fn from_config(config: &SyncConfig) -> Result<Self, TransformError> {
        let ctx = TemplateContext::from_config(config)?;
        let fragments = TemplateEngine::new()?.render(&ctx)?;
        let names = &config.naming;

        let structural: Vec<Box<dyn TransformRule>> = vec![
            Box::new(EntryPointRule::new(names)?),
            Box::new(HelpFunctionRule::new(names)?),
            Box::new(UsageBannerRule::new(names)?),
            Box::new(ProvenanceHeaderRule::new(fragments.header)),
            Box::new(AdapterRule::new(fragments.adapter)),
        ];

        Ok(Self::new(
            config.include_rewrites.iter().map(LiteralRule::from).collect(),
            config.entry_point.clone(),
            structural,
        ))
    }

    /// Assemble a transformer from explicit parts.
    pub fn new(
        literal: Vec<LiteralRule>,
        entry_point: impl Into<PathBuf>,
        structural: Vec<Box<dyn TransformRule>>,
    ) -> Self {
        Self {
            literal,
            entry_point: entry_point.into(),
            structural,
        }
    }

    /// Apply the pipeline. `source_path` is relative to the upstream source
    /// directory, exactly as it appears in the mapping table.
    pub fn transform(&self, content: &str, source_path: &Path) -> String {
        let mut content = content.replace("\r\n", "\n");
        for rule in &self.literal {
            content = rule.apply(&content);
        }
        if self.is_entry_point(source_path) {
            for rule in &self.structural {
                tracing::debug!(rule = rule.name(), path = %source_path.display(), "structural rule");
                content = rule.apply(&content);
            }
        }
        content
    }

    pub fn is_entry_point(&self, source_path: &Path) -> bool {
        source_path == self.entry_point
    }

    /// Rule names in application order (literal rules collapsed to one entry).
    pub fn rule_names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(self.structural.len() + 1);
        if !self.literal.is_empty() {
            names.push("literal");
        }
        names.extend(self.structural.iter().map(|r| r.name()));
        names
    }
}

impl std::fmt::Debug for ContentTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentTransformer")
            .field("literal", &self.literal)
            .field("entry_point", &self.entry_point)
            .field("structural", &self.rule_names())
            .finish()
    }
}
