//! Tera engine for the two generated fragments of the entry-point file.
//!
//! | Template                  | Placement in the entry-point file |
//! |---------------------------|-----------------------------------|
//! | `provenance_header.tera`  | prepended                         |
//! | `adapter.tera`            | appended                          |
//!
//! Both are rendered once per transformer; rendering is the only fallible
//! step, so applying rules afterwards cannot fail.

use tera::Tera;

use crate::context::TemplateContext;
use crate::error::TransformError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

pub const HEADER_TEMPLATE: &str = "provenance_header.tera";
pub const ADAPTER_TEMPLATE: &str = "adapter.tera";

const TPLS: &[(&str, &str)] = &[
    (HEADER_TEMPLATE, include_str!("templates/provenance_header.tera")),
    (ADAPTER_TEMPLATE, include_str!("templates/adapter.tera")),
];

/// Rendered, line-ending-normalised fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragments {
    /// Header block, ending in one blank line.
    pub header: String,
    /// Adapter block, starting with a blank line and ending in `\n`.
    pub adapter: String,
}

/// Tera-based engine holding the embedded templates.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, TransformError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.iter().copied())?;
        Ok(TemplateEngine { tera })
    }

    /// Render header and adapter for `ctx`.
    pub fn render(&self, ctx: &TemplateContext) -> Result<Fragments, TransformError> {
        let tera_ctx = ctx.to_tera_context()?;
        let header = self.tera.render(HEADER_TEMPLATE, &tera_ctx)?;
        let adapter = self.tera.render(ADAPTER_TEMPLATE, &tera_ctx)?;

        // Pin the surrounding blank lines regardless of template trailing whitespace.
        Ok(Fragments {
            header: format!("{}\n\n", normalize(&header).trim_end()),
            adapter: format!("\n{}\n", normalize(&adapter).trim_matches('\n')),
        })
    }
}

fn normalize(s: &str) -> String {
    s.replace("\r\n", "\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use embedsync_core::SyncConfig;

    fn fragments() -> Fragments {
        let config = SyncConfig::for_tool_dir("/w/p/userspace/ksud/scripts").unwrap();
        let ctx = TemplateContext::from_config(&config).unwrap();
        TemplateEngine::new().unwrap().render(&ctx).unwrap()
    }

    #[test]
    fn engine_new_succeeds() {
        TemplateEngine::new().expect("embedded templates must parse");
    }

    #[test]
    fn header_lists_renames() {
        let header = fragments().header;
        assert!(header.starts_with("// hymo_cli.cpp - HymoFS module management CLI\n"));
        assert!(header.contains("// Auto-synced from hymo/src/main.cpp"));
        assert!(header.contains("int main() -> int hymo_main()"));
        assert!(header.contains("print_help() -> print_hymo_help()"));
        assert!(header.contains("\"hymod\" -> \"ksud hymo\""));
        assert!(header.ends_with("overwritten!\n\n"));
    }

    #[test]
    fn adapter_prefixes_placeholder_and_calls_entry() {
        let adapter = fragments().adapter;
        assert!(adapter.starts_with("\nnamespace hymo {"));
        assert!(adapter.contains("int cmd_hymo(const std::vector<std::string>& args)"));
        assert!(adapter.contains("argv_ptrs.push_back(\"hymo\");"));
        assert!(adapter.contains("return hymo_main(argc, argv);"));
        assert!(adapter.ends_with("}  // namespace hymo\n"));
    }

    #[test]
    fn no_crlf_in_fragments() {
        let f = fragments();
        assert!(!f.header.contains('\r'));
        assert!(!f.adapter.contains('\r'));
    }
}
