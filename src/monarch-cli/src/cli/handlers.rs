//! Command execution handlers.

use anyhow::{Context, Result};
use monarch_keyring_store::{KeyringStore, MemoryStore, SecretStore};
use monarch_login::{ApiConfig, MonarchClient, Settings, TokenVault};

use super::args::{Cli, Commands};
use crate::audit_cmd::run_audit;
use crate::diagnose_cmd::run_diagnose;
use crate::login::{run_login, run_logout, run_status};

/// Secret store selected for this invocation.
pub fn open_store(settings: &Settings, memory: bool) -> Box<dyn SecretStore> {
    if memory {
        tracing::debug!("Using in-memory secret store");
        Box::new(MemoryStore::new())
    } else {
        tracing::debug!(service = %settings.keyring_service, "Using OS keyring");
        Box::new(KeyringStore::with_service(settings.keyring_service.clone()))
    }
}

fn open_vault(settings: &Settings, memory: bool) -> TokenVault<Box<dyn SecretStore>> {
    TokenVault::with_account(
        open_store(settings, memory),
        settings.keyring_account.clone(),
    )
}

fn build_client(settings: &Settings) -> Result<MonarchClient> {
    MonarchClient::new(ApiConfig::from(settings)).context("Failed to build HTTP client")
}

/// Dispatch the parsed command. Exits with status 1 when the command
/// completes but reports a failure.
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let settings = Settings::from_env();
    tracing::debug!(api_url = %settings.api_url, "Loaded settings");

    let ok = match cli.command {
        Commands::Diagnose(args) => {
            let vault = open_vault(&settings, cli.memory_store);
            let client = build_client(&settings)?;
            run_diagnose(args, &settings, vault, client).await?
        }
        Commands::Login(args) => {
            let vault = open_vault(&settings, cli.memory_store);
            let client = build_client(&settings)?;
            run_login(args, &settings, &vault, &client).await?
        }
        Commands::Logout(args) => run_logout(args, &open_vault(&settings, cli.memory_store))?,
        Commands::Status => run_status(&open_vault(&settings, cli.memory_store))?,
        Commands::Audit(args) => run_audit(args)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
