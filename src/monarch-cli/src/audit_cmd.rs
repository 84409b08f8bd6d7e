//! `audit` command: publish-readiness check of a working tree.

use anyhow::{Context, Result};
use monarch_doctor::audit::{AuditOptions, AuditReport, Severity, audit};

use crate::cli::AuditArgs;
use crate::styled_output::{print_dim, print_error, print_success, print_warning};

/// Run the audit. Returns whether the tree passed.
pub fn run_audit(args: AuditArgs) -> Result<bool> {
    let options = AuditOptions {
        check_git: !args.no_git,
        extra_patterns: args.patterns,
    };
    let report = audit(&args.path, &options)
        .with_context(|| format!("Failed to audit {}", args.path.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        render(&report);
    }

    Ok(report.passed())
}

fn render(report: &AuditReport) {
    print_dim(&format!(
        "Audited {} ({} files)",
        report.root.display(),
        report.files_scanned
    ));

    for finding in &report.findings {
        let line = match &finding.path {
            Some(path) => format!("{path}: {}", finding.message),
            None => finding.message.clone(),
        };
        match finding.severity {
            Severity::Error => print_error(&line),
            Severity::Warning => print_warning(&line),
        }
    }

    let errors = report.errors().count();
    if errors == 0 {
        print_success("Safe to publish: no secrets would be committed");
    } else {
        print_error(&format!("{errors} problem(s) must be fixed before publishing"));
    }
}
