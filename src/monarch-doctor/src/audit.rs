//! Publish-readiness audit.
//!
//! Checks that a working tree keeps secrets out of version control:
//! the local environment file and session/token artifacts must be covered
//! by ignore rules, and none may be publishable or already tracked.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use glob::Pattern;
use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::Serialize;
use thiserror::Error;

/// Paths that must be ignored by the root ignore rules.
pub const SENSITIVE_PROBES: &[&str] = &[
    ".env",
    ".env.local",
    ".mm/mm_session.pickle",
    "session.pickle",
    "monarch_session.json",
    "token.json",
];

/// File-name patterns that must never be published.
pub const SENSITIVE_PATTERNS: &[&str] = &[
    ".env",
    ".env.*",
    "*.pickle",
    "*session*.json",
    "*token*.json",
    "*.session",
];

/// Environment templates that are meant to be committed.
pub const ALLOWED_TEMPLATES: &[&str] = &[".env.example", ".env.sample", ".env.template"];

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to read ignore rules: {0}")]
    Ignore(#[from] ignore::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCode {
    MissingGitignore,
    UnignoredProbe,
    PublishableSecret,
    TrackedSecret,
    GitUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFinding {
    pub severity: Severity,
    pub code: FindingCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl AuditFinding {
    fn error(code: FindingCode, path: Option<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            path,
            message: message.into(),
        }
    }
}

/// Audit knobs.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Also ask git which files are already tracked.
    pub check_git: bool,
    /// Extra file-name patterns to treat as sensitive.
    pub extra_patterns: Vec<String>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            check_git: true,
            extra_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub root: PathBuf,
    pub files_scanned: usize,
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    /// True when nothing at error severity was found.
    pub fn passed(&self) -> bool {
        !self
            .findings
            .iter()
            .any(|f| f.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &AuditFinding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }
}

struct SensitiveMatcher {
    patterns: Vec<Pattern>,
}

impl SensitiveMatcher {
    fn new(extra: &[String]) -> Result<Self, AuditError> {
        let patterns = SENSITIVE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .chain(extra.iter().cloned())
            .map(|p| Pattern::new(&p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    fn is_sensitive(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if ALLOWED_TEMPLATES.contains(&name) {
            return false;
        }
        self.patterns.iter().any(|p| p.matches(name))
    }
}

/// Audit the working tree at `root`.
pub fn audit(root: &Path, options: &AuditOptions) -> Result<AuditReport, AuditError> {
    if !root.is_dir() {
        return Err(AuditError::NotADirectory(root.to_path_buf()));
    }
    let matcher = SensitiveMatcher::new(&options.extra_patterns)?;
    let mut findings = Vec::new();

    let gitignore_path = root.join(".gitignore");
    if gitignore_path.is_file() {
        let rules = root_ignore_rules(root)?;
        for probe in SENSITIVE_PROBES {
            if !rules
                .matched_path_or_any_parents(Path::new(probe), false)
                .is_ignore()
            {
                findings.push(AuditFinding::error(
                    FindingCode::UnignoredProbe,
                    Some(probe.to_string()),
                    format!("'{probe}' would not be ignored by .gitignore"),
                ));
            }
        }
    } else {
        findings.push(AuditFinding::error(
            FindingCode::MissingGitignore,
            None,
            "No .gitignore at the repository root",
        ));
    }

    let (files_scanned, publishable) = scan_publishable(root, &matcher);
    for path in &publishable {
        findings.push(AuditFinding::error(
            FindingCode::PublishableSecret,
            Some(path.clone()),
            format!("'{path}' holds secrets and is not ignored"),
        ));
    }

    if options.check_git {
        match tracked_files(root) {
            Some(tracked) => {
                for path in tracked {
                    if matcher.is_sensitive(Path::new(&path)) && !publishable.contains(&path) {
                        findings.push(AuditFinding::error(
                            FindingCode::TrackedSecret,
                            Some(path.clone()),
                            format!(
                                "'{path}' is tracked by git; ignore rules do not untrack it \
                                 (git rm --cached)"
                            ),
                        ));
                    }
                }
            }
            None => findings.push(AuditFinding {
                severity: Severity::Warning,
                code: FindingCode::GitUnavailable,
                path: None,
                message: "Could not list tracked files (git missing or not a repository)"
                    .to_string(),
            }),
        }
    }

    findings.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.path.cmp(&b.path)));
    tracing::debug!(
        root = %root.display(),
        files_scanned,
        findings = findings.len(),
        "Audit finished"
    );

    Ok(AuditReport {
        root: root.to_path_buf(),
        files_scanned,
        findings,
    })
}

fn root_ignore_rules(root: &Path) -> Result<Gitignore, AuditError> {
    let mut builder = GitignoreBuilder::new(root);
    for file in [root.join(".gitignore"), root.join(".git/info/exclude")] {
        if file.is_file() {
            if let Some(err) = builder.add(&file) {
                tracing::warn!(path = %file.display(), error = %err, "Skipping bad ignore rule");
            }
        }
    }
    Ok(builder.build()?)
}

/// Walk the tree with git's ignore semantics and collect sensitive files
/// that would be published.
fn scan_publishable(root: &Path, matcher: &SensitiveMatcher) -> (usize, BTreeSet<String>) {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_global(false)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    let mut scanned = 0;
    let mut publishable = BTreeSet::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        scanned += 1;
        if matcher.is_sensitive(entry.path()) {
            publishable.insert(relative(root, entry.path()));
        }
    }

    (scanned, publishable)
}

fn tracked_files(root: &Path) -> Option<Vec<String>> {
    let output = Command::new("git")
        .args(["ls-files", "-z"])
        .current_dir(root)
        .output()
        .ok()?;
    if !output.status.success() {
        tracing::debug!(root = %root.display(), "git ls-files failed; not a repository?");
        return None;
    }
    Some(
        String::from_utf8_lossy(&output.stdout)
            .split('\0')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
