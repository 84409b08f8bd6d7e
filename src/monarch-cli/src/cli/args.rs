//! Command-line argument structures.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::styles::{AFTER_HELP, get_styles};

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Color output mode for CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if output is a terminal
    #[default]
    Auto,
    /// Always output with colors
    Always,
    /// Never output with colors
    Never,
}

/// monarch-auth - Monarch Money authentication toolkit
#[derive(Parser)]
#[command(name = "monarch-auth")]
#[command(author, version)]
#[command(
    about = "Log in to Monarch Money, diagnose stored sessions and audit a tree before publishing",
    long_about = None
)]
#[command(styles = get_styles(), after_help = AFTER_HELP)]
pub struct Cli {
    /// Log verbosity level
    #[arg(long = "log-level", global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Shorthand for --log-level debug
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Shorthand for --log-level trace
    #[arg(long = "trace", global = true)]
    pub trace: bool,

    /// When to use colors
    #[arg(long = "color", global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Keep the token in process memory instead of the OS keyring
    #[arg(long = "memory-store", global = true, hide = true)]
    pub memory_store: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the stored token, the API and what to do next
    Diagnose(DiagnoseArgs),

    /// Log in and store the session token in the keyring
    Login(LoginArgs),

    /// Remove the stored session token
    Logout(LogoutArgs),

    /// Show whether a token is stored (does not contact the API)
    Status,

    /// Check that a working tree keeps secrets out of version control
    Audit(AuditArgs),
}

#[derive(Args, Debug, Default)]
pub struct DiagnoseArgs {
    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Never ask for credentials, even on a terminal
    #[arg(long = "no-prompt")]
    pub no_prompt: bool,
}

#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// Account email (defaults to MONARCH_EMAIL)
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct LogoutArgs {
    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Root of the tree to audit
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Skip asking git which files are tracked
    #[arg(long = "no-git")]
    pub no_git: bool,

    /// Extra file-name pattern to treat as sensitive (repeatable)
    #[arg(long = "pattern", value_name = "GLOB")]
    pub patterns: Vec<String>,
}

impl Cli {
    /// Effective log level: `--trace`, then `-v`, then `MONARCH_LOG_LEVEL`,
    /// then `--log-level`.
    pub fn effective_log_level(&self, env_level: Option<&str>) -> LogLevel {
        if self.trace {
            LogLevel::Trace
        } else if self.verbose {
            LogLevel::Debug
        } else if let Some(level) = env_level.and_then(LogLevel::from_str_loose) {
            level
        } else {
            self.log_level
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_loose("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str_loose(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str_loose("loud"), None);
    }

    #[test]
    fn test_effective_log_level_precedence() {
        let cli = Cli::parse_from(["monarch-auth", "--trace", "-v", "status"]);
        assert_eq!(cli.effective_log_level(Some("error")), LogLevel::Trace);

        let cli = Cli::parse_from(["monarch-auth", "-v", "status"]);
        assert_eq!(cli.effective_log_level(Some("error")), LogLevel::Debug);

        let cli = Cli::parse_from(["monarch-auth", "--log-level", "info", "status"]);
        assert_eq!(cli.effective_log_level(Some("error")), LogLevel::Error);
        assert_eq!(cli.effective_log_level(Some("nonsense")), LogLevel::Info);
        assert_eq!(cli.effective_log_level(None), LogLevel::Info);
    }

    #[test]
    fn test_audit_defaults_to_current_dir() {
        let cli = Cli::parse_from(["monarch-auth", "audit", "--pattern", "*.key"]);
        match cli.command {
            Commands::Audit(args) => {
                assert_eq!(args.path, PathBuf::from("."));
                assert_eq!(args.patterns, vec!["*.key".to_string()]);
                assert!(!args.json);
            }
            _ => panic!("expected audit"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["monarch-auth", "diagnose", "--json", "--memory-store"]);
        assert!(cli.memory_store);
        assert!(matches!(
            cli.command,
            Commands::Diagnose(DiagnoseArgs { json: true, no_prompt: false })
        ));
    }
}
