//! monarch-auth - main entry point.

use anyhow::Result;
use clap::Parser;

use monarch_cli::cli::{Cli, ColorMode, dispatch_command};
use monarch_login::constants::LOG_LEVEL_ENV_VAR;
use monarch_login::load_dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // SAFETY: Environment variable mutations happen early before threads spawn
    match cli.color {
        ColorMode::Never => unsafe { std::env::set_var("NO_COLOR", "1") },
        ColorMode::Always => unsafe { std::env::remove_var("NO_COLOR") },
        ColorMode::Auto => {}
    }

    let dotenv_loaded = load_dotenv();

    let env_level = std::env::var(LOG_LEVEL_ENV_VAR).ok();
    let log_level = cli.effective_log_level(env_level.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(log_level.as_filter_str())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if dotenv_loaded {
        tracing::debug!("Loaded .env from current directory");
    }

    dispatch_command(cli).await
}
