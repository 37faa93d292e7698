use clap::Parser;
use std::path::PathBuf;

/// mass-uninstall - batch removal of Windows Installer applications
#[derive(Parser, Debug)]
#[command(name = "mass-uninstall")]
#[command(about = "List installed Windows applications or uninstall them from a text file")]
#[command(version)]
pub struct Cli {
    /// Print the installed applications, one per line
    #[arg(long = "installed-apps")]
    pub installed_apps: bool,

    /// Uninstall the applications named (one per line) in this file
    #[arg(long, value_name = "PATH")]
    pub uninstall: Option<PathBuf>,

    /// Log the uninstall commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// JSON file overriding command templates and registry sources
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args() {
        let cli = Cli::try_parse_from(["mass-uninstall"]).expect("parse");
        assert!(!cli.installed_apps);
        assert!(cli.uninstall.is_none());
        assert!(!cli.dry_run);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_installed_apps() {
        let cli = Cli::try_parse_from(["mass-uninstall", "--installed-apps"]).expect("parse");
        assert!(cli.installed_apps);
    }

    #[test]
    fn test_cli_uninstall_path() {
        let cli = Cli::try_parse_from(["mass-uninstall", "--uninstall", "C:\\apps.txt"])
            .expect("parse");
        assert_eq!(cli.uninstall.unwrap().to_str().unwrap(), "C:\\apps.txt");
    }

    #[test]
    fn test_cli_uninstall_requires_value() {
        assert!(Cli::try_parse_from(["mass-uninstall", "--uninstall"]).is_err());
    }

    #[test]
    fn test_cli_flags_combine() {
        let cli = Cli::try_parse_from([
            "mass-uninstall",
            "--installed-apps",
            "--uninstall",
            "apps.txt",
            "--dry-run",
            "--config",
            "uninstall.json",
        ])
        .expect("parse");
        assert!(cli.installed_apps);
        assert!(cli.dry_run);
        assert!(cli.uninstall.is_some());
        assert!(cli.config.is_some());
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["mass-uninstall", "--purge-everything"]).is_err());
    }
}
