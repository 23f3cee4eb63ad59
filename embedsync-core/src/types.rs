//! Domain types shared by every embedsync crate.
//!
//! All path fields use `PathBuf`; mapping paths are always relative (upstream
//! paths to the upstream source directory, destinations to the embedded root).
//! All types are serializable/deserializable via serde + serde_yaml so a
//! manifest can override them.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SourceMapping
// ---------------------------------------------------------------------------

/// One `upstream path → destination path` pair of the mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceMapping {
    /// Path relative to the upstream source directory.
    pub upstream: PathBuf,
    /// Path relative to the embedded destination root.
    pub destination: PathBuf,
}

impl SourceMapping {
    pub fn new(upstream: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            upstream: upstream.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for SourceMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.upstream.display(),
            self.destination.display()
        )
    }
}

// ---------------------------------------------------------------------------
// IncludeRewrite
// ---------------------------------------------------------------------------

/// A literal `from → to` substitution applied to every synced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeRewrite {
    pub from: String,
    pub to: String,
}

impl IncludeRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// EmbedNames
// ---------------------------------------------------------------------------

/// Names used when turning the standalone program into an embedded
/// subcommand of the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbedNames {
    /// Host binary that dispatches the subcommand (`ksud`).
    pub host_command: String,
    /// Subcommand name under the host (`hymo`).
    pub subcommand: String,
    /// Name of the standalone program in its own help text (`hymod`).
    pub standalone_program: String,
    /// Replacement for `main`.
    pub entry_function: String,
    /// Replacement for `print_help`.
    pub help_function: String,
    /// Name of the appended string-list adapter.
    pub adapter_function: String,
    /// Namespace the adapter is declared in.
    pub adapter_namespace: String,
    /// `argv[0]` the adapter synthesizes.
    pub argv0_placeholder: String,
    /// Short upstream label used in headers and stamps.
    pub upstream_label: String,
    /// One-line description for the generated file header.
    pub description: String,
}

impl Default for EmbedNames {
    fn default() -> Self {
        Self {
            host_command: "ksud".into(),
            subcommand: "hymo".into(),
            standalone_program: "hymod".into(),
            entry_function: "hymo_main".into(),
            help_function: "print_hymo_help".into(),
            adapter_function: "cmd_hymo".into(),
            adapter_namespace: "hymo".into(),
            argv0_placeholder: "hymo".into(),
            upstream_label: "hymo".into(),
            description: "HymoFS module management CLI".into(),
        }
    }
}

impl EmbedNames {
    /// `<host> <subcommand>`, the embedded invocation form.
    pub fn embedded_invocation(&self) -> String {
        format!("{} {}", self.host_command, self.subcommand)
    }

    /// The argument vector the generated adapter hands to the renamed entry
    /// point: the placeholder program name followed by `args` in order.
    pub fn adapter_argv<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        std::iter::once(self.argv0_placeholder.clone())
            .chain(args.iter().map(|a| a.as_ref().to_owned()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_display() {
        let m = SourceMapping::new("utils.cpp", "hymo_utils.cpp");
        assert_eq!(m.to_string(), "utils.cpp -> hymo_utils.cpp");
    }

    #[test]
    fn adapter_argv_prefixes_placeholder() {
        let names = EmbedNames::default();
        assert_eq!(names.adapter_argv(&["status"]), vec!["hymo", "status"]);
        assert_eq!(names.adapter_argv::<&str>(&[]), vec!["hymo"]);
    }

    #[test]
    fn embedded_invocation_joins_host_and_subcommand() {
        assert_eq!(EmbedNames::default().embedded_invocation(), "ksud hymo");
    }

    #[test]
    fn names_yaml_partial_override_keeps_defaults() {
        let names: EmbedNames = serde_yaml::from_str("host_command: apd\n").expect("parse");
        assert_eq!(names.host_command, "apd");
        assert_eq!(names.subcommand, "hymo");
    }
}
