//! Template context: serializable rendering payload for the generated
//! header and adapter, built from [`SyncConfig`].

use serde::{Deserialize, Serialize};

use embedsync_core::SyncConfig;

use crate::error::TransformError;

/// Flat rendering payload shared by both embedded templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContext {
    /// File name of the generated entry point (e.g. `hymo_cli.cpp`).
    pub generated_name: String,
    pub description: String,
    pub upstream_label: String,
    pub source_subdir: String,
    /// Upstream path of the entry point (e.g. `main.cpp`).
    pub entry_point: String,
    pub entry_function: String,
    pub help_function: String,
    pub standalone_program: String,
    pub embedded_invocation: String,
    pub host_command: String,
    pub adapter_namespace: String,
    pub adapter_function: String,
    pub argv0_placeholder: String,
}

impl TemplateContext {
    /// Build the context from run configuration.
    pub fn from_config(config: &SyncConfig) -> Result<Self, TransformError> {
        let entry_point = config.entry_point.to_string_lossy().replace('\\', "/");
        let destination = config
            .entry_point_destination()
            .ok_or_else(|| TransformError::UnmappedEntryPoint(entry_point.clone()))?;
        let generated_name = destination
            .file_name()
            .unwrap_or(destination.as_os_str())
            .to_string_lossy()
            .into_owned();
        let names = &config.naming;

        Ok(Self {
            generated_name,
            description: names.description.clone(),
            upstream_label: names.upstream_label.clone(),
            source_subdir: config.source_subdir.to_string_lossy().replace('\\', "/"),
            entry_point,
            entry_function: names.entry_function.clone(),
            help_function: names.help_function.clone(),
            standalone_program: names.standalone_program.clone(),
            embedded_invocation: names.embedded_invocation(),
            host_command: names.host_command.clone(),
            adapter_namespace: names.adapter_namespace.clone(),
            adapter_function: names.adapter_function.clone(),
            argv0_placeholder: names.argv0_placeholder.clone(),
        })
    }

    /// Convert to a [`tera::Context`].
    pub fn to_tera_context(&self) -> Result<tera::Context, TransformError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_uses_entry_point_destination_file_name() {
        let config = SyncConfig::for_tool_dir("/w/p/userspace/ksud/scripts").unwrap();
        let ctx = TemplateContext::from_config(&config).unwrap();
        assert_eq!(ctx.generated_name, "hymo_cli.cpp");
        assert_eq!(ctx.entry_point, "main.cpp");
        assert_eq!(ctx.embedded_invocation, "ksud hymo");
    }
}
