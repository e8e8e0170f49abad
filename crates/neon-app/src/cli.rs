//! CLI argument definitions for the Neon application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use neon_storage::Occupation;

/// Neon - a wake-word voice assistant for the desktop.
#[derive(Parser, Debug)]
#[command(name = "neon", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the account database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account. Missing fields are prompted for.
    Register(RegisterArgs),
    /// Sign in and choose a wake word.
    Setup,
    /// Sign in and start the assistant console.
    Run,
}

#[derive(Args, Debug, Default)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub age: Option<u32>,

    /// student or employee.
    #[arg(long)]
    pub occupation: Option<Occupation>,

    /// Institution for students, company for employees.
    #[arg(long)]
    pub organization: Option<String>,
}

impl CliArgs {
    /// Priority: --config flag > NEON_CONFIG env var > ~/.neon/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("NEON_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --data-dir flag > config file value.
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

fn default_config_path() -> PathBuf {
    neon_core::config::expand_home("~/.neon/config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_globals() {
        let args = CliArgs::parse_from(["neon", "run", "--log-level", "debug", "-c", "/tmp/n.toml"]);
        assert!(matches!(args.command, Command::Run));
        assert_eq!(args.resolve_log_level().as_deref(), Some("debug"));
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/n.toml"));
    }

    #[test]
    fn test_parse_register_flags() {
        let args = CliArgs::parse_from([
            "neon",
            "register",
            "--email",
            "ada@example.com",
            "--age",
            "36",
            "--occupation",
            "employee",
            "--organization",
            "Analytical Engines",
        ]);
        let Command::Register(register) = args.command else {
            panic!("expected register");
        };
        assert_eq!(register.email.as_deref(), Some("ada@example.com"));
        assert_eq!(register.age, Some(36));
        assert_eq!(register.occupation, Some(Occupation::Employee));
        assert!(register.first_name.is_none());
    }

    #[test]
    fn test_bad_occupation_rejected() {
        let result = CliArgs::try_parse_from(["neon", "register", "--occupation", "pirate"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_data_dir_override() {
        let args = CliArgs::parse_from(["neon", "setup", "--data-dir", "/srv/neon"]);
        assert_eq!(args.resolve_data_dir().as_deref(), Some("/srv/neon"));
    }
}
