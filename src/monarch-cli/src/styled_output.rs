//! Styled CLI output with theme-aware colors.
//!
//! Messages go to stderr so stdout stays clean for `--json` output.
//! Colors are dropped when stderr is not a terminal or `NO_COLOR` is set.

use std::io::{IsTerminal, Write};

/// Check if colors should be disabled based on NO_COLOR env var.
fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

/// ANSI color codes for light terminal backgrounds.
mod light_theme {
    pub const SUCCESS: &str = "\x1b[38;2;0;150;125m";
    pub const ERROR: &str = "\x1b[38;2;217;61;61m";
    pub const WARNING: &str = "\x1b[38;2;201;154;46m";
    pub const INFO: &str = "\x1b[38;2;0;100;160m";
    pub const DIM: &str = "\x1b[38;2;100;100;100m";
}

/// ANSI color codes for dark terminal backgrounds.
mod dark_theme {
    pub const SUCCESS: &str = "\x1b[38;2;0;245;212m";
    pub const ERROR: &str = "\x1b[38;2;255;107;107m";
    pub const WARNING: &str = "\x1b[38;2;255;200;87m";
    pub const INFO: &str = "\x1b[38;2;72;202;228m";
    pub const DIM: &str = "\x1b[38;2;130;154;177m";
}

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Detect a light terminal background from COLORFGBG ("fg;bg").
fn is_light_theme() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| v.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
        .is_some_and(|bg| bg >= 7)
}

/// Message type for styled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
    Warning,
    Info,
    Dim,
}

impl MessageType {
    fn icon(&self) -> &'static str {
        match self {
            MessageType::Success => "[OK]",
            MessageType::Error => "[ERROR]",
            MessageType::Warning => "[WARN]",
            MessageType::Info => "[INFO]",
            MessageType::Dim => "-",
        }
    }

    fn color(&self) -> &'static str {
        let light = is_light_theme();
        match (self, light) {
            (MessageType::Success, true) => light_theme::SUCCESS,
            (MessageType::Error, true) => light_theme::ERROR,
            (MessageType::Warning, true) => light_theme::WARNING,
            (MessageType::Info, true) => light_theme::INFO,
            (MessageType::Dim, true) => light_theme::DIM,
            (MessageType::Success, false) => dark_theme::SUCCESS,
            (MessageType::Error, false) => dark_theme::ERROR,
            (MessageType::Warning, false) => dark_theme::WARNING,
            (MessageType::Info, false) => dark_theme::INFO,
            (MessageType::Dim, false) => dark_theme::DIM,
        }
    }
}

fn use_colors() -> bool {
    !colors_disabled() && std::io::stderr().is_terminal()
}

/// Format a styled message without printing it.
pub fn format_styled(msg_type: MessageType, message: &str) -> String {
    if use_colors() {
        format!("{}{} {}{}", msg_type.color(), msg_type.icon(), message, RESET)
    } else {
        format!("{} {}", msg_type.icon(), message)
    }
}

fn print_styled(msg_type: MessageType, message: &str) {
    let _ = writeln!(std::io::stderr(), "{}", format_styled(msg_type, message));
}

pub fn print_success(message: &str) {
    print_styled(MessageType::Success, message);
}

pub fn print_error(message: &str) {
    print_styled(MessageType::Error, message);
}

pub fn print_warning(message: &str) {
    print_styled(MessageType::Warning, message);
}

pub fn print_info(message: &str) {
    print_styled(MessageType::Info, message);
}

pub fn print_dim(message: &str) {
    print_styled(MessageType::Dim, message);
}

/// Print a section header: a rule, the title, and another rule.
pub fn print_section(title: &str) {
    let rule = "=".repeat(80);
    let mut stderr = std::io::stderr();
    if use_colors() {
        let _ = writeln!(stderr, "\n{rule}\n{BOLD}{title}{RESET}\n{rule}");
    } else {
        let _ = writeln!(stderr, "\n{rule}\n{title}\n{rule}");
    }
}
