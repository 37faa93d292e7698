//! Error handling module for mass-uninstall
//!
//! Provides centralized error types using thiserror. Library code returns
//! these; the binary adds path context with `anyhow` at the boundary.

use thiserror::Error;

use crate::registry::Hive;

/// Main error type for the uninstaller
#[derive(Error, Debug)]
pub enum UninstallError {
    /// IO errors (reading the uninstall list, config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A registry source that must list installer products has no subkeys
    #[error("{hive}\\{path} is unexpectedly empty")]
    RegistryEmpty { hive: Hive, path: String },

    /// Every source has subkeys but none of them carries a product name
    #[error("No installer product in the registry has a ProductName value")]
    NoProductNames,

    /// Registry access failures other than an empty source
    #[error("Registry error: {0}")]
    Registry(String),

    /// External command could not be launched
    #[error("Command error: {0}")]
    Command(String),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for uninstaller operations
pub type Result<T> = std::result::Result<T, UninstallError>;

impl UninstallError {
    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a command error
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true when the registry yields no known applications at all.
    pub fn is_registry_empty(&self) -> bool {
        matches!(self, Self::RegistryEmpty { .. } | Self::NoProductNames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_empty_names_hive_and_path() {
        let err = UninstallError::RegistryEmpty {
            hive: Hive::ClassesRoot,
            path: "Installer\\Products".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HKEY_CLASSES_ROOT\\Installer\\Products is unexpectedly empty"
        );
        assert!(err.is_registry_empty());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: UninstallError = io_err.into();
        assert!(matches!(err, UninstallError::Io(_)));
        assert!(!err.is_registry_empty());
    }

    #[test]
    fn test_no_product_names_is_fatal_registry_state() {
        assert!(UninstallError::NoProductNames.is_registry_empty());
        assert!(!UninstallError::config("bad").is_registry_empty());
    }

    #[test]
    fn test_error_constructors() {
        let err = UninstallError::command("wmic not found");
        assert_eq!(err.to_string(), "Command error: wmic not found");

        let err = UninstallError::config("missing {name}");
        assert!(matches!(err, UninstallError::Config(_)));

        let err = UninstallError::registry("access denied");
        assert!(matches!(err, UninstallError::Registry(_)));
    }
}
