//! mass-uninstall - Main entry point
//!
//! Lists installed Windows Installer applications, or uninstalls the ones
//! named in a text file.

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mass_uninstall::cli::Cli;
use mass_uninstall::{ShellRunner, UninstallConfig, Uninstaller};

/// Initialize the logger with appropriate settings
fn init_logger() {
    // RUST_LOG overrides the default level. Stdout is reserved for the
    // application list, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .init();
}

#[cfg(windows)]
fn open_registry() -> Result<mass_uninstall::WindowsRegistry> {
    Ok(mass_uninstall::WindowsRegistry::for_current_os())
}

#[cfg(not(windows))]
fn open_registry() -> Result<mass_uninstall::InMemoryRegistry> {
    anyhow::bail!("The Windows registry is only available on Windows")
}

fn load_config(cli: &Cli) -> Result<UninstallConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            UninstallConfig::load_from_file(path)?
        }
        None => UninstallConfig::default(),
    };
    config.validate().context("Invalid configuration")?;

    if cli.dry_run {
        config.dry_run = true;
    }
    Ok(config)
}

/// Main application entry point
fn main() -> Result<()> {
    init_logger();
    info!("mass-uninstall starting up");

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed: {:?}", cli);

    let config = load_config(&cli)?;
    let registry = open_registry()?;

    let uninstaller = match Uninstaller::with_current_logger(&registry, ShellRunner::new(), config)
    {
        Ok(uninstaller) => uninstaller,
        // Already logged with the offending key; nothing can run without it.
        Err(e) if e.is_registry_empty() => std::process::exit(0),
        Err(e) => return Err(e).context("Failed to read installed applications from the registry"),
    };

    if cli.installed_apps {
        let applications = uninstaller
            .enumerate_installed()
            .context("Failed to enumerate installed applications")?;
        for app in applications {
            println!("{}", app);
        }
        return Ok(());
    }

    if let Some(path) = &cli.uninstall {
        let applications = uninstaller
            .read_uninstall_list(path)
            .with_context(|| format!("Failed to read uninstall list from {:?}", path))?;
        uninstaller.uninstall_all(&applications);
    }

    Ok(())
}
