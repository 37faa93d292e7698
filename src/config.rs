//! Uninstaller configuration: external command templates and registry sources.
//!
//! Defaults reproduce the stock WMIC behaviour. A JSON file passed with
//! `--config` may override any field; missing fields keep their defaults.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::UninstallError;
use crate::registry::RegistryLocation;

/// Placeholder substituted with the exact application name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Command lists installed MSI products, one name per record.
pub const DEFAULT_ENUMERATE_COMMAND: &str = "wmic product get name";

/// Command uninstalls one MSI product by name.
pub const DEFAULT_UNINSTALL_COMMAND: &str = "wmic product where name=\"{name}\" call uninstall";

/// Shell command lines used to talk to the installer service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandTemplates {
    pub enumerate: String,
    /// Must contain `{name}`.
    pub uninstall: String,
}

impl Default for CommandTemplates {
    fn default() -> Self {
        Self {
            enumerate: DEFAULT_ENUMERATE_COMMAND.to_string(),
            uninstall: DEFAULT_UNINSTALL_COMMAND.to_string(),
        }
    }
}

impl CommandTemplates {
    /// Uninstall command line for `name`, or `None` if the name contains a
    /// double quote. The placeholder sits inside a quoted WQL literal and
    /// `cmd` offers no reliable way to escape a quote within it.
    pub fn uninstall_command(&self, name: &str) -> Option<String> {
        if name.contains('"') {
            return None;
        }
        Some(self.uninstall.replace(NAME_PLACEHOLDER, name))
    }
}

/// Full uninstaller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UninstallConfig {
    pub commands: CommandTemplates,
    /// Each source must have at least one subkey.
    pub registry_sources: Vec<RegistryLocation>,
    /// Log uninstall commands instead of running them.
    pub dry_run: bool,
}

impl Default for UninstallConfig {
    fn default() -> Self {
        Self {
            commands: CommandTemplates::default(),
            registry_sources: vec![
                RegistryLocation::current_user_products(),
                RegistryLocation::classes_root_products(),
            ],
            dry_run: false,
        }
    }
}

impl UninstallConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.commands.enumerate.trim().is_empty() {
            return Err(UninstallError::config("Enumerate command must not be empty"));
        }

        if !self.commands.uninstall.contains(NAME_PLACEHOLDER) {
            return Err(UninstallError::config(format!(
                "Uninstall command must contain the {} placeholder",
                NAME_PLACEHOLDER
            )));
        }

        if self.registry_sources.is_empty() {
            return Err(UninstallError::config(
                "At least one registry source is required",
            ));
        }

        if let Some(source) = self
            .registry_sources
            .iter()
            .find(|s| s.path.trim().is_empty())
        {
            return Err(UninstallError::config(format!(
                "Registry source under {} has an empty path",
                source.hive
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Hive;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = UninstallConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry_sources.len(), 2);
        assert_eq!(config.registry_sources[0].hive, Hive::CurrentUser);
        assert_eq!(config.registry_sources[1].hive, Hive::ClassesRoot);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_uninstall_command_substitutes_name() {
        let commands = CommandTemplates::default();
        assert_eq!(
            commands.uninstall_command("Foo Bar 1.0").as_deref(),
            Some("wmic product where name=\"Foo Bar 1.0\" call uninstall")
        );
    }

    #[test]
    fn test_uninstall_command_refuses_embedded_quote() {
        let commands = CommandTemplates::default();
        assert_eq!(commands.uninstall_command("Tool \"Pro\" 2.0"), None);
        assert!(commands.uninstall_command("Tool 'Pro' 2.0").is_some());
    }

    #[test]
    fn test_validate_rejects_template_without_placeholder() {
        let mut config = UninstallConfig::default();
        config.commands.uninstall = "wmic product call uninstall".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, UninstallError::Config(_)));
        assert!(err.to_string().contains("{name}"));
    }

    #[test]
    fn test_validate_rejects_empty_sources() {
        let config = UninstallConfig {
            registry_sources: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_enumerate() {
        let mut config = UninstallConfig::default();
        config.commands.enumerate = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "commands": { "enumerate": "my-lister" }, "dry_run": true }"#;
        let config: UninstallConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.commands.enumerate, "my-lister");
        assert_eq!(config.commands.uninstall, DEFAULT_UNINSTALL_COMMAND);
        assert_eq!(config.registry_sources, UninstallConfig::default().registry_sources);
        assert!(config.dry_run);
    }

    #[test]
    fn test_registry_sources_from_json() {
        let json = r#"{
            "registry_sources": [
                { "hive": "HKEY_LOCAL_MACHINE", "path": "SOFTWARE\\Classes\\Installer\\Products" }
            ]
        }"#;
        let config: UninstallConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.registry_sources.len(), 1);
        assert_eq!(config.registry_sources[0].hive, Hive::LocalMachine);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_file() {
        let file = NamedTempFile::new().expect("temp file");
        let mut config = UninstallConfig::default();
        config.dry_run = true;
        config.save_to_file(file.path()).expect("save");

        let loaded = UninstallConfig::load_from_file(file.path()).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_fails_with_context() {
        let err = UninstallConfig::load_from_file("/nonexistent/uninstall.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration"));
    }
}
