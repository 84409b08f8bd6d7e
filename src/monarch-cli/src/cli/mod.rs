//! CLI argument parsing and command dispatch.
//!
//! - `args` - Command-line argument structures
//! - `styles` - ANSI styling for help output
//! - `handlers` - Command execution handlers

pub mod args;
pub mod handlers;
pub mod styles;

pub use args::{AuditArgs, Cli, ColorMode, Commands, DiagnoseArgs, LogLevel, LoginArgs, LogoutArgs};
pub use handlers::dispatch_command;
