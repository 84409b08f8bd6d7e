//! Constants for the monarch-login crate.

/// Default Monarch API base URL.
pub const DEFAULT_API_URL: &str = "https://api.monarchmoney.com";

/// Login endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "/auth/login/";

/// GraphQL endpoint, relative to the API base URL.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Keyring account the session token is filed under.
pub const DEFAULT_TOKEN_ACCOUNT: &str = "monarch-token";

/// Platform header value the API expects from non-mobile clients.
pub const CLIENT_PLATFORM: &str = "web";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV_VAR: &str = "MONARCH_API_URL";

/// Environment variable overriding the keyring service name.
pub const KEYRING_SERVICE_ENV_VAR: &str = "MONARCH_KEYRING_SERVICE";

/// Environment variable overriding the keyring account name.
pub const KEYRING_ACCOUNT_ENV_VAR: &str = "MONARCH_KEYRING_ACCOUNT";

/// Environment variable pre-filling the login email.
pub const EMAIL_ENV_VAR: &str = "MONARCH_EMAIL";

/// Environment variable for the HTTP request timeout in seconds.
pub const HTTP_TIMEOUT_ENV_VAR: &str = "MONARCH_HTTP_TIMEOUT_SECS";

/// Environment variable for the log level.
pub const LOG_LEVEL_ENV_VAR: &str = "MONARCH_LOG_LEVEL";

/// Default timeout for API requests in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Timeout for connectivity probes in seconds.
pub const PROBE_TIMEOUT_SECS: u64 = 5;

/// User-Agent string for HTTP requests
pub const USER_AGENT: &str = concat!("monarch-auth/", env!("CARGO_PKG_VERSION"));
