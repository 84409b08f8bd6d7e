//! `diagnose` command: end-to-end authentication diagnostics.

use anyhow::{Context, Result};
use monarch_doctor::{
    CheckOutcome, Connectivity, DiagnosticReport, Doctor, POSSIBLE_CAUSES, TokenPresence,
};
use monarch_keyring_store::SecretStore;
use monarch_login::{LoginCredentials, MonarchClient, Settings, TokenVault};

use crate::cli::DiagnoseArgs;
use crate::prompt;
use crate::styled_output::{
    print_dim, print_error, print_info, print_section, print_success, print_warning,
};

/// Run the diagnostics. Returns whether authentication is healthy.
pub async fn run_diagnose<S: SecretStore>(
    args: DiagnoseArgs,
    settings: &Settings,
    vault: TokenVault<S>,
    client: MonarchClient,
) -> Result<bool> {
    let doctor = Doctor::new(vault, client);
    let interactive = !args.no_prompt && !args.json && prompt::is_interactive();

    if !args.json {
        print_section("MONARCH AUTHENTICATION DIAGNOSTIC");
        print_dim(&format!("API: {}", settings.api_url));
    }

    let report = doctor
        .run(|| {
            if !interactive {
                tracing::debug!("Skipping fresh login prompt");
                return None;
            }
            print_info("No token stored; testing a fresh login instead.");
            ask_credentials(settings)
        })
        .await;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        render(&report);
    }

    Ok(report.healthy)
}

fn ask_credentials(settings: &Settings) -> Option<LoginCredentials> {
    let email = match prompt::prompt_line("Email", settings.email.as_deref()) {
        Ok(Some(email)) => email,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read email");
            return None;
        }
    };
    match prompt::prompt_secret("Password") {
        Ok(password) if !password.is_empty() => Some(LoginCredentials::new(email, password)),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read password");
            None
        }
    }
}

fn render(report: &DiagnosticReport) {
    print_dim(&format!(
        "Time: {}  Store: {}",
        report.checked_at.format("%Y-%m-%d %H:%M:%S"),
        report.backend
    ));

    print_section("CHECK 1: Token Existence");
    match &report.presence {
        TokenPresence::Present { length, preview } => {
            print_success("Token exists in the secret store");
            print_dim(&format!("Token length: {length} characters"));
            print_dim(&format!("Token preview: {preview}"));
        }
        TokenPresence::Missing => {
            print_error("No token found in the secret store");
            match &report.fresh_login {
                Some(outcome) => render_outcome("Fresh login", outcome),
                None => print_dim("Fresh login not attempted"),
            }
        }
        TokenPresence::StoreError { message } => {
            print_error(&format!("Secret store could not be read: {message}"));
        }
    }

    if let Some(validity) = &report.validity {
        print_section("CHECK 2: Token Validity");
        render_outcome("Stored token", validity);
        if let Some(conclusion) = report.conclusion() {
            print_info(&format!("Conclusion: {conclusion}"));
        }
    }

    if let Some(connectivity) = &report.connectivity {
        print_section("CHECK 3: API Connectivity");
        match connectivity {
            Connectivity::Reachable { status } => {
                print_success(&format!("API endpoint reachable (status {status})"))
            }
            Connectivity::Timeout => print_warning("API endpoint timed out - network issue?"),
            Connectivity::Unreachable { message } => {
                print_error(&format!("Cannot connect to API: {message}"))
            }
            Connectivity::Failed { message } => {
                print_warning(&format!("API connectivity check failed: {message}"))
            }
        }
    }

    print_section("DIAGNOSTIC SUMMARY");
    eprintln!("\nKey findings:");
    for finding in &report.findings {
        eprintln!("  - {finding}");
    }
    if !report.healthy {
        eprintln!("\nPossible causes:");
        for (i, cause) in POSSIBLE_CAUSES.iter().enumerate() {
            eprintln!("  {}. {cause}", i + 1);
        }
    }

    print_section("RECOMMENDED ACTION");
    let message = report.recommendation.message();
    if report.healthy {
        print_success(&message);
    } else {
        print_warning(&message);
    }
}

fn render_outcome(label: &str, outcome: &CheckOutcome) {
    match outcome {
        CheckOutcome::Passed { accounts } => {
            print_success(&format!("{label} works - found {accounts} accounts"))
        }
        CheckOutcome::Indeterminate { message } => {
            print_warning(&format!("{label}: rate limited ({message})"));
            print_dim("This is temporary - wait 30-60 minutes");
        }
        CheckOutcome::Failed {
            error_type,
            message,
            hint,
            ..
        } => {
            print_error(&format!("{label} failed: {message}"));
            print_dim(&format!("Error type: {error_type}"));
            if let Some(hint) = hint {
                print_dim(hint);
            }
        }
    }
}
