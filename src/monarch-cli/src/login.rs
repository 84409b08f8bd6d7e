//! Login, logout and status commands.

use anyhow::{Context, Result, bail};
use monarch_keyring_store::SecretStore;
use monarch_login::{
    ApiError, FailureKind, LoginCredentials, LoginFlow, MonarchClient, Settings, TokenVault,
};

use crate::cli::{LoginArgs, LogoutArgs};
use crate::prompt;
use crate::styled_output::{print_dim, print_error, print_info, print_success, print_warning};

/// Log in interactively and store the session token.
pub async fn run_login<S: SecretStore>(
    args: LoginArgs,
    settings: &Settings,
    vault: &TokenVault<S>,
    client: &MonarchClient,
) -> Result<bool> {
    if !prompt::is_interactive() {
        bail!("Login needs an interactive terminal to read the password");
    }

    let default_email = args.email.as_deref().or(settings.email.as_deref());
    let Some(email) = prompt::prompt_line("Email", default_email)? else {
        bail!("An email address is required");
    };
    let password = prompt::prompt_secret("Password")?;
    if password.is_empty() {
        bail!("A password is required");
    }
    let credentials = LoginCredentials::new(email, password);

    let flow = LoginFlow::new(client);
    let result = flow
        .authenticate(&credentials, || {
            match prompt::prompt_line("Multi-factor code", None) {
                Ok(code) => code,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read multi-factor code");
                    None
                }
            }
        })
        .await;

    let token = match result {
        Ok(token) => token,
        Err(e) => {
            report_login_error(&e);
            return Ok(false);
        }
    };

    vault.save(&token)?;
    print_success(&format!(
        "Logged in. Session saved to {} ({})",
        vault.backend_name(),
        token.preview()
    ));
    Ok(true)
}

fn report_login_error(err: &ApiError) {
    print_error(&format!("Login failed: {err}"));
    match err.kind() {
        FailureKind::RateLimited => {
            print_warning("Rate limited - wait 30-60 minutes before trying again")
        }
        FailureKind::Unauthorized => print_dim("Check your email and password"),
        FailureKind::Other => {
            if matches!(err, ApiError::MfaRequired) {
                print_dim("A multi-factor code is required for this account");
            }
        }
    }
}

/// Remove the stored token. Returns false when nothing was stored.
pub fn run_logout<S: SecretStore>(args: LogoutArgs, vault: &TokenVault<S>) -> Result<bool> {
    let stored = vault.load().context("Failed to check login status")?;
    if stored.is_none() {
        print_info("Not logged in.");
        return Ok(true);
    }

    if !args.yes
        && prompt::is_interactive()
        && !prompt::confirm("Remove the stored Monarch session token?")
    {
        print_info("Logout cancelled.");
        return Ok(true);
    }

    if vault.clear()? {
        print_success("Logged out. Session token removed.");
    } else {
        print_info("Not logged in.");
    }
    Ok(true)
}

/// Report whether a token is stored, without contacting the API.
pub fn run_status<S: SecretStore>(vault: &TokenVault<S>) -> Result<bool> {
    match vault.load()? {
        Some(token) => {
            print_success(&format!(
                "Logged in ({}, {} characters)",
                vault.backend_name(),
                token.len()
            ));
            print_dim(&format!("Token preview: {}", token.preview()));
            Ok(true)
        }
        None => {
            print_error("Not logged in. Run: monarch-auth login");
            Ok(false)
        }
    }
}
