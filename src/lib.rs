//! mass-uninstall library
//!
//! Reconciles the Windows Installer product registry with the live product
//! listing and uninstalls applications named in a text file.

pub mod cli;
pub mod command_runner;
pub mod config;
pub mod enumeration;
pub mod error;
pub mod platform;
pub mod registry;
pub mod uninstaller;

// Re-export main types for convenience
pub use command_runner::{CommandRunner, RecordedCommand, RecordingRunner, ShellRunner};
pub use config::{CommandTemplates, UninstallConfig};
pub use enumeration::parse_installed_applications;
pub use error::{Result, UninstallError};
pub use registry::{Hive, InMemoryRegistry, RegistryLocation, RegistryReader};
#[cfg(windows)]
pub use registry::WindowsRegistry;
pub use uninstaller::{UninstallOutcome, Uninstaller};
