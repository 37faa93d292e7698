//! Read-only access to the Windows registry.
//!
//! The uninstaller only ever needs two things from the registry: the names of
//! the subkeys under a key, and a string value stored on one of those subkeys.
//! `RegistryReader` captures exactly that, so the orchestration logic can be
//! driven by `InMemoryRegistry` fixtures on any platform.
//!
//! # Implementations
//!
//! - `WindowsRegistry` (Windows only): backed by `winreg`, opens keys with
//!   `KEY_READ` and the 64-bit view on a 64-bit OS.
//! - `InMemoryRegistry`: builder-style fixture for tests and non-Windows builds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

use crate::error::Result;

/// Value holding the human-readable name of an installer product.
pub const PRODUCT_NAME_VALUE: &str = "ProductName";

/// Top-level registry root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
pub enum Hive {
    #[strum(serialize = "HKEY_CLASSES_ROOT")]
    #[serde(rename = "HKEY_CLASSES_ROOT")]
    ClassesRoot,
    #[strum(serialize = "HKEY_CURRENT_USER")]
    #[serde(rename = "HKEY_CURRENT_USER")]
    CurrentUser,
    #[strum(serialize = "HKEY_LOCAL_MACHINE")]
    #[serde(rename = "HKEY_LOCAL_MACHINE")]
    LocalMachine,
    #[strum(serialize = "HKEY_USERS")]
    #[serde(rename = "HKEY_USERS")]
    Users,
}

/// A key path under a specific hive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLocation {
    pub hive: Hive,
    pub path: String,
}

impl RegistryLocation {
    pub fn new(hive: Hive, path: impl Into<String>) -> Self {
        Self {
            hive,
            path: path.into(),
        }
    }

    /// Per-user installer products.
    pub fn current_user_products() -> Self {
        Self::new(Hive::CurrentUser, "Software\\Microsoft\\Installer\\Products")
    }

    /// Machine-wide installer products as merged into HKCR.
    pub fn classes_root_products() -> Self {
        Self::new(Hive::ClassesRoot, "Installer\\Products")
    }

    /// Path of a direct child key.
    pub fn child_path(&self, subkey: &str) -> String {
        join_path(&self.path, subkey)
    }
}

impl std::fmt::Display for RegistryLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\\{}", self.hive, self.path)
    }
}

/// Read-only registry capability.
pub trait RegistryReader {
    /// Names of the direct children of `hive\path`.
    ///
    /// A key that does not exist yields an empty list rather than an error;
    /// callers decide whether emptiness is fatal.
    fn subkeys(&self, hive: Hive, path: &str) -> Result<Vec<String>>;

    /// String value `value_name` stored on `hive\path`, or `None` when the
    /// key or the value is missing.
    fn read_value(&self, hive: Hive, path: &str, value_name: &str) -> Result<Option<String>>;
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}\\{}", parent, child)
    }
}

// ============================================================================
// In-memory registry
// ============================================================================

/// Registry fixture holding keys and string values in memory.
///
/// Key paths are compared case-insensitively, the way Windows compares them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    /// (hive, lowercased path) -> (display path, values)
    keys: BTreeMap<(Hive, String), (String, BTreeMap<String, String>)>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `hive\path` exists (with no values).
    pub fn with_key(mut self, hive: Hive, path: &str) -> Self {
        self.insert_key(hive, path);
        self
    }

    /// Set a string value, creating the key if needed.
    pub fn with_value(mut self, hive: Hive, path: &str, name: &str, value: &str) -> Self {
        self.insert_key(hive, path)
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Add an installer product subkey carrying a `ProductName` value.
    pub fn with_product(
        self,
        location: &RegistryLocation,
        product_code: &str,
        product_name: &str,
    ) -> Self {
        let path = location.child_path(product_code);
        self.with_value(location.hive, &path, PRODUCT_NAME_VALUE, product_name)
    }

    fn insert_key(&mut self, hive: Hive, path: &str) -> &mut BTreeMap<String, String> {
        // Parents must exist for subkey enumeration to find the child.
        let mut parent = String::new();
        for part in path.split('\\').filter(|p| !p.is_empty()) {
            parent = join_path(&parent, part);
            self.keys
                .entry((hive, parent.to_lowercase()))
                .or_insert_with(|| (parent.clone(), BTreeMap::new()));
        }
        &mut self
            .keys
            .entry((hive, path.to_lowercase()))
            .or_insert_with(|| (path.to_string(), BTreeMap::new()))
            .1
    }
}

impl RegistryReader for InMemoryRegistry {
    fn subkeys(&self, hive: Hive, path: &str) -> Result<Vec<String>> {
        let prefix = format!("{}\\", path.to_lowercase());
        let names = self
            .keys
            .iter()
            .filter(|((h, lower), _)| *h == hive && lower.starts_with(&prefix))
            .filter_map(|(_, (display, _))| {
                let rest = display.get(prefix.len()..)?;
                (!rest.is_empty() && !rest.contains('\\')).then(|| rest.to_string())
            })
            .collect();
        Ok(names)
    }

    fn read_value(&self, hive: Hive, path: &str, value_name: &str) -> Result<Option<String>> {
        Ok(self
            .keys
            .get(&(hive, path.to_lowercase()))
            .and_then(|(_, values)| values.get(value_name).cloned()))
    }
}

// ============================================================================
// Windows registry
// ============================================================================

#[cfg(windows)]
pub use self::windows_impl::WindowsRegistry;

#[cfg(windows)]
mod windows_impl {
    use super::{Hive, RegistryReader};
    use crate::error::{Result, UninstallError};
    use std::io::ErrorKind;
    use winreg::RegKey;
    use winreg::enums::{
        HKEY_CLASSES_ROOT, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ,
        KEY_WOW64_64KEY,
    };

    /// Registry reader backed by the live Windows registry.
    #[derive(Debug, Clone, Copy)]
    pub struct WindowsRegistry {
        flags: u32,
    }

    impl WindowsRegistry {
        /// Open keys in the 64-bit view when `use_64bit_view` is set.
        pub fn new(use_64bit_view: bool) -> Self {
            let flags = if use_64bit_view {
                KEY_READ | KEY_WOW64_64KEY
            } else {
                KEY_READ
            };
            Self { flags }
        }

        /// Reader matching the bitness of the running OS.
        pub fn for_current_os() -> Self {
            Self::new(crate::platform::is_x64_os())
        }

        fn open(&self, hive: Hive, path: &str) -> Result<Option<RegKey>> {
            let root = RegKey::predef(match hive {
                Hive::ClassesRoot => HKEY_CLASSES_ROOT,
                Hive::CurrentUser => HKEY_CURRENT_USER,
                Hive::LocalMachine => HKEY_LOCAL_MACHINE,
                Hive::Users => HKEY_USERS,
            });
            match root.open_subkey_with_flags(path, self.flags) {
                Ok(key) => Ok(Some(key)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(UninstallError::registry(format!(
                    "Failed to open {}\\{}: {}",
                    hive, path, e
                ))),
            }
        }
    }

    impl RegistryReader for WindowsRegistry {
        fn subkeys(&self, hive: Hive, path: &str) -> Result<Vec<String>> {
            let Some(key) = self.open(hive, path)? else {
                tracing::debug!("{}\\{} does not exist", hive, path);
                return Ok(Vec::new());
            };
            key.enum_keys()
                .map(|name| {
                    name.map_err(|e| {
                        UninstallError::registry(format!(
                            "Failed to enumerate {}\\{}: {}",
                            hive, path, e
                        ))
                    })
                })
                .collect()
        }

        fn read_value(&self, hive: Hive, path: &str, value_name: &str) -> Result<Option<String>> {
            let Some(key) = self.open(hive, path)? else {
                return Ok(None);
            };
            match key.get_value::<String, _>(value_name) {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(UninstallError::registry(format!(
                    "Failed to read {}\\{}\\{}: {}",
                    hive, path, value_name, e
                ))),
            }
        }
    }
}
