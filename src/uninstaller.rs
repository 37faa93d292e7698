//! Uninstall orchestration.
//!
//! `Uninstaller` owns the set of known applications (product names read once
//! from the installer registry keys) and uses it as the authorisation list for
//! every uninstall request. Enumeration results are cross-checked against the
//! same set, but only flagged, never filtered.
//!
//! # Logging
//!
//! The logger is injected as a `tracing::Dispatch` and every operation emits
//! its events inside that dispatch, so callers (and tests) decide where the
//! messages go without relying on a process-wide subscriber.
//!
//! # Failure Modes
//!
//! - A registry source with no subkeys: construction fails with
//!   `UninstallError::RegistryEmpty`. The caller is expected to stop.
//! - Subkeys present but no `ProductName` anywhere: construction fails with
//!   `UninstallError::NoProductNames`.
//! - Unknown name on uninstall: warning, request skipped.
//! - Unknown name on enumeration: warning, name still returned.
//! - Uninstall command fails to launch: error logged, batch continues.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::dispatcher::{self, Dispatch};
use tracing::{debug, error, info, warn};

use crate::command_runner::CommandRunner;
use crate::config::{CommandTemplates, UninstallConfig};
use crate::enumeration::parse_installed_applications;
use crate::error::{Result, UninstallError};
use crate::registry::{PRODUCT_NAME_VALUE, RegistryLocation, RegistryReader};

/// Byte order mark some Windows editors write at the start of UTF-8 files.
const UTF8_BOM: char = '\u{FEFF}';

/// What `perform_uninstall` did with a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// Uninstall command was issued (its result is not checked).
    Dispatched,
    /// Name is not a known application; nothing was run.
    Skipped,
    /// Dry-run mode; the command was only logged.
    DryRun,
}

/// Batch uninstaller for registry-known applications.
pub struct Uninstaller<R: CommandRunner> {
    known: BTreeSet<String>,
    runner: R,
    commands: CommandTemplates,
    dry_run: bool,
    dispatch: Dispatch,
}

impl<R: CommandRunner> std::fmt::Debug for Uninstaller<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uninstaller")
            .field("known", &self.known.len())
            .field("commands", &self.commands)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl<R: CommandRunner> Uninstaller<R> {
    /// Build the known-application set from every configured registry source.
    ///
    /// # Errors
    ///
    /// `RegistryEmpty` if any source has no subkeys, `NoProductNames` if the
    /// resulting set is empty, `Registry` on read failures.
    pub fn new<G>(
        registry: &G,
        runner: R,
        config: UninstallConfig,
        dispatch: Dispatch,
    ) -> Result<Self>
    where
        G: RegistryReader + ?Sized,
    {
        let known = dispatcher::with_default(&dispatch, || {
            let mut known = BTreeSet::new();
            for source in &config.registry_sources {
                known.extend(read_registry_applications(registry, source)?);
            }
            if known.is_empty() {
                error!("No installer product in the registry has a ProductName value");
                return Err(UninstallError::NoProductNames);
            }
            info!("Windows has {} installed applications", known.len());
            Ok::<_, UninstallError>(known)
        })?;

        Ok(Self {
            known,
            runner,
            commands: config.commands,
            dry_run: config.dry_run,
            dispatch,
        })
    }

    /// Like `new`, logging through the subscriber that is current at the call.
    pub fn with_current_logger<G>(registry: &G, runner: R, config: UninstallConfig) -> Result<Self>
    where
        G: RegistryReader + ?Sized,
    {
        let dispatch = dispatcher::get_default(Dispatch::clone);
        Self::new(registry, runner, config, dispatch)
    }

    /// Application names read from the registry.
    pub fn known_applications(&self) -> &BTreeSet<String> {
        &self.known
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Currently installed applications, sorted, including ones not listed in
    /// the registry sources (those are reported with a warning).
    ///
    /// Names outside the Latin alphabet may be mangled by the listing tool.
    pub fn enumerate_installed(&self) -> Result<Vec<String>> {
        dispatcher::with_default(&self.dispatch, || -> Result<Vec<String>> {
            info!("Enumerate installed applications. Patience please, it takes some time...");
            let output = self.runner.capture(&self.commands.enumerate)?;
            let applications = parse_installed_applications(&output);
            info!(
                "Enumerate finished with {} installed applications",
                applications.len()
            );

            for app in applications.iter().filter(|app| !self.is_known(app)) {
                warn!("Application \"{}\" is not in expected registry key", app);
            }

            Ok(applications)
        })
    }

    /// Names listed one per line in `path`, trimmed, in file order.
    ///
    /// Duplicates and blank lines are kept; `perform_uninstall` decides what
    /// to do with each entry. A leading UTF-8 byte order mark is dropped.
    /// Bytes that are not UTF-8 are decoded lossily (with a warning) so the
    /// remaining lines still run.
    pub fn read_uninstall_list(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        dispatcher::with_default(&self.dispatch, || -> Result<Vec<String>> {
            info!("Read application list from file {}", path.display());
            let bytes = fs::read(path)?;
            let content = String::from_utf8_lossy(&bytes);
            if matches!(content, Cow::Owned(_)) {
                warn!(
                    "{} is not valid UTF-8; undecodable bytes were replaced with U+FFFD",
                    path.display()
                );
            }
            let content = content.strip_prefix(UTF8_BOM).unwrap_or(&content);
            let applications: Vec<String> =
                content.lines().map(|line| line.trim().to_string()).collect();
            debug!("Requested: {:?}", applications);
            info!("{} applications to uninstall", applications.len());
            Ok(applications)
        })
    }

    /// Uninstall one application if it is known.
    ///
    /// The uninstall command is fire-and-forget: its exit status is not
    /// checked, and a launch failure is logged rather than returned.
    pub fn perform_uninstall(&self, name: &str) -> UninstallOutcome {
        dispatcher::with_default(&self.dispatch, || {
            if !self.is_known(name) {
                warn!("Application \"{}\" is not installed or not recognized", name);
                return UninstallOutcome::Skipped;
            }

            let Some(command_line) = self.commands.uninstall_command(name) else {
                warn!(
                    "Application \"{}\" contains a double quote and cannot be passed to the uninstall command",
                    name
                );
                return UninstallOutcome::Skipped;
            };
            if self.dry_run {
                info!("[dry-run] Uninstall {}: {}", name, command_line);
                return UninstallOutcome::DryRun;
            }

            info!("Uninstall {}", name);
            if let Err(e) = self.runner.run(&command_line) {
                error!("Uninstall of {} could not be started: {}", name, e);
            }
            UninstallOutcome::Dispatched
        })
    }

    /// `perform_uninstall` for each name, in order.
    pub fn uninstall_all<S: AsRef<str>>(&self, names: &[S]) {
        for name in names {
            self.perform_uninstall(name.as_ref());
        }
    }
}

/// Product names stored under the subkeys of `source`.
fn read_registry_applications<G>(registry: &G, source: &RegistryLocation) -> Result<Vec<String>>
where
    G: RegistryReader + ?Sized,
{
    let products = registry.subkeys(source.hive, &source.path)?;
    if products.is_empty() {
        error!("{}\\{} is unexpectedly empty", source.hive, source.path);
        return Err(UninstallError::RegistryEmpty {
            hive: source.hive,
            path: source.path.clone(),
        });
    }

    let mut names = Vec::with_capacity(products.len());
    for product in &products {
        let key_path = source.child_path(product);
        match registry.read_value(source.hive, &key_path, PRODUCT_NAME_VALUE)? {
            Some(name) => names.push(name),
            None => warn!(
                "{}\\{} has no {} value",
                source.hive, key_path, PRODUCT_NAME_VALUE
            ),
        }
    }

    debug!("{} lists {} products", source, names.len());
    Ok(names)
}
