//! monarch-auth command-line interface.
//!
//! - `cli/` - Argument parsing and dispatch
//! - `*_cmd.rs`, `login.rs` - Individual command implementations
//! - `prompt` - Terminal prompts, including hidden password input
//! - `styled_output` - Colored status messages on stderr

pub mod audit_cmd;
pub mod cli;
pub mod diagnose_cmd;
pub mod login;
pub mod prompt;
pub mod styled_output;
