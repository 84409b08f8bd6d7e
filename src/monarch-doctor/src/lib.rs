//! Authentication diagnostics for monarch-auth.
//!
//! Two independent tools live here:
//! - [`Doctor`] checks the stored session token end to end (presence,
//!   validity against the API, connectivity) and recommends a next step.
//! - [`audit`] checks that a working tree keeps secrets out of version
//!   control before it is published.

pub mod audit;
mod checks;
mod report;

pub use audit::{AuditFinding, AuditOptions, AuditReport, FindingCode, Severity};
pub use checks::{CheckOutcome, Connectivity, Doctor, TokenPresence};
pub use report::{DiagnosticReport, POSSIBLE_CAUSES, RATE_LIMIT_WAIT_MINUTES, Recommendation};
