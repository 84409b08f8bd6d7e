//! Monarch login - session tokens and API access for monarch-auth.
//!
//! Provides:
//! - Environment-driven settings (local `.env` merged in)
//! - Session tokens kept in the OS keyring, masked in all output
//! - A Monarch API client (login, accounts query, connectivity probe)
//! - Classification of API failures (unauthorized / rate limited / other)
//! - Interactive login with multi-factor authentication

pub mod config;
pub mod constants;
pub mod error;

mod client;
mod flow;
mod token;

pub use client::{AccountsSummary, ApiConfig, LoginCredentials, MonarchClient};
pub use config::{Settings, load_dotenv};
pub use error::{ApiError, FailureKind, classify_login_message, classify_message};
pub use flow::LoginFlow;
pub use token::{SessionToken, TokenVault};
