//! CLI styling for help output.

use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Help theme: cyan headers, green literals, yellow placeholders.
pub fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Yellow.on_default())
}

/// After-help section documenting environment variables.
pub const AFTER_HELP: &str = "\
ENVIRONMENT VARIABLES
    MONARCH_API_URL            API base URL (default: https://api.monarchmoney.com)
    MONARCH_EMAIL              Default login email
    MONARCH_KEYRING_SERVICE    Keyring service name (default: com.mcp.monarch-mcp-server)
    MONARCH_KEYRING_ACCOUNT    Keyring account name (default: monarch-token)
    MONARCH_HTTP_TIMEOUT_SECS  Request timeout in seconds (default: 30)
    MONARCH_LOG_LEVEL          Log verbosity (error, warn, info, debug, trace)
    NO_COLOR                   Disable colored output

A .env file in the current directory is loaded first. Passwords are never
read from the environment.";
