//! Individually named transformation rules.
//!
//! Every rule implements [`TransformRule`]: one pass over the whole content,
//! returning the new content. Rules never re-run on their own output; the
//! [`crate::ContentTransformer`] composes them in declared order.
//!
//! | Rule                     | Scope        | Edit                                          |
//! |--------------------------|--------------|-----------------------------------------------|
//! | [`LiteralRule`]          | every file   | exact substring replacement                   |
//! | [`EntryPointRule`]       | entry point  | `int main(argc, argv)` → renamed entry        |
//! | [`HelpFunctionRule`]     | entry point  | `print_help` declaration + calls → renamed    |
//! | [`UsageBannerRule`]      | entry point  | `Usage: <prog>` / `<prog> <cmd>` → host form  |
//! | [`ProvenanceHeaderRule`] | entry point  | prepend generated-file header                 |
//! | [`AdapterRule`]          | entry point  | append string-list → argc/argv adapter        |

use regex::{NoExpand, Regex};

use embedsync_core::{EmbedNames, IncludeRewrite};

use crate::error::TransformError;

/// Uniform `apply(content) → content` contract.
pub trait TransformRule: Send + Sync {
    /// Stable rule name, used in logs and [`crate::ContentTransformer::rule_names`].
    fn name(&self) -> &'static str;

    fn apply(&self, content: &str) -> String;
}

fn compile(rule: &'static str, pattern: &str) -> Result<Regex, TransformError> {
    Regex::new(pattern).map_err(|source| TransformError::Pattern { rule, source })
}

/// Escape `$` so a literal survives use inside an expanding replacement.
fn escape_replacement(s: &str) -> String {
    s.replace('$', "$$")
}

// ---------------------------------------------------------------------------
// LiteralRule
// ---------------------------------------------------------------------------

/// Replace every exact occurrence of `from` with `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRule {
    from: String,
    to: String,
}

impl LiteralRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl From<&IncludeRewrite> for LiteralRule {
    fn from(rewrite: &IncludeRewrite) -> Self {
        Self::new(rewrite.from.clone(), rewrite.to.clone())
    }
}

impl TransformRule for LiteralRule {
    fn name(&self) -> &'static str {
        "literal"
    }

    fn apply(&self, content: &str) -> String {
        if self.from.is_empty() {
            return content.to_owned();
        }
        content.replace(&self.from, &self.to)
    }
}

// ---------------------------------------------------------------------------
// EntryPointRule
// ---------------------------------------------------------------------------

/// Rewrites the standalone `main` signature to the embedded entry name with
/// canonical spacing. Accepts `char* argv[]`, `char **argv` and any
/// whitespace inside the parameter list.
#[derive(Debug, Clone)]
pub struct EntryPointRule {
    pattern: Regex,
    replacement: String,
}

impl EntryPointRule {
    pub fn new(names: &EmbedNames) -> Result<Self, TransformError> {
        let pattern = compile(
            "entry-point",
            r"\bint\s+main\s*\(\s*int\s+argc\s*,\s*char(?:\s*\*)+\s*argv\s*(?:\[\s*\]\s*)?\)",
        )?;
        Ok(Self {
            pattern,
            replacement: format!("int {}(int argc, char** argv)", names.entry_function),
        })
    }
}

impl TransformRule for EntryPointRule {
    fn name(&self) -> &'static str {
        "entry-point"
    }

    fn apply(&self, content: &str) -> String {
        self.pattern
            .replace_all(content, NoExpand(&self.replacement))
            .into_owned()
    }
}

// ---------------------------------------------------------------------------
// HelpFunctionRule
// ---------------------------------------------------------------------------

/// Renames `print_help`: the (possibly `static`) declaration becomes a plain
/// `void <help>()`, and every call site follows.
#[derive(Debug, Clone)]
pub struct HelpFunctionRule {
    declaration: Regex,
    call: Regex,
    declaration_replacement: String,
    call_replacement: String,
}

impl HelpFunctionRule {
    pub fn new(names: &EmbedNames) -> Result<Self, TransformError> {
        Ok(Self {
            declaration: compile(
                "help-function",
                r"\b(?:static\s+)?void\s+print_help\s*\(\s*\)",
            )?,
            call: compile("help-function", r"\bprint_help\s*\(")?,
            declaration_replacement: format!("void {}()", names.help_function),
            call_replacement: format!("{}(", names.help_function),
        })
    }
}

impl TransformRule for HelpFunctionRule {
    fn name(&self) -> &'static str {
        "help-function"
    }

    fn apply(&self, content: &str) -> String {
        let declared = self
            .declaration
            .replace_all(content, NoExpand(&self.declaration_replacement));
        self.call
            .replace_all(&declared, NoExpand(&self.call_replacement))
            .into_owned()
    }
}

// ---------------------------------------------------------------------------
// UsageBannerRule
// ---------------------------------------------------------------------------

/// Rewrites help text from the standalone program name to the embedded
/// subcommand form.
///
/// 1. `Usage: <prog>` → `USAGE: <host> <sub>`.
/// 2. `<prog> <token>` after a line start, whitespace, quote, `(` or an
///    escaped `\n` inside a string literal →
///    `<host> <sub> <token>`, where `<token>` is `[\w-]+`.
#[derive(Debug, Clone)]
pub struct UsageBannerRule {
    banner_from: String,
    banner_to: String,
    command: Regex,
    command_replacement: String,
}

impl UsageBannerRule {
    pub fn new(names: &EmbedNames) -> Result<Self, TransformError> {
        let program = regex::escape(&names.standalone_program);
        let invocation = names.embedded_invocation();
        Ok(Self {
            banner_from: format!("Usage: {}", names.standalone_program),
            banner_to: format!("USAGE: {invocation}"),
            command: compile(
                "usage-banner",
                &format!(r#"(?m)(^|["'(\s]|\\n){program}[ \t]+([\w-]+)"#),
            )?,
            command_replacement: format!("${{1}}{} ${{2}}", escape_replacement(&invocation)),
        })
    }
}

impl TransformRule for UsageBannerRule {
    fn name(&self) -> &'static str {
        "usage-banner"
    }

    fn apply(&self, content: &str) -> String {
        let bannered = content.replace(&self.banner_from, &self.banner_to);
        self.command
            .replace_all(&bannered, self.command_replacement.as_str())
            .into_owned()
    }
}

// ---------------------------------------------------------------------------
// ProvenanceHeaderRule / AdapterRule
// ---------------------------------------------------------------------------

/// Prepends the pre-rendered generated-file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceHeaderRule {
    header: String,
}

impl ProvenanceHeaderRule {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl TransformRule for ProvenanceHeaderRule {
    fn name(&self) -> &'static str {
        "provenance-header"
    }

    fn apply(&self, content: &str) -> String {
        let mut out = String::with_capacity(self.header.len() + content.len());
        out.push_str(&self.header);
        out.push_str(content);
        out
    }
}

/// Appends the pre-rendered adapter that bridges the host's string-list
/// dispatch to the renamed argc/argv entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRule {
    adapter: String,
}

impl AdapterRule {
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
        }
    }
}

impl TransformRule for AdapterRule {
    fn name(&self) -> &'static str {
        "adapter"
    }

    fn apply(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len() + self.adapter.len());
        out.push_str(content);
        out.push_str(&self.adapter);
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
