use once_cell::sync::Lazy;
use std::fmt;
use std::fs;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable holding the bearer token for the reset API.
pub const AUTH_TOKEN_ENV: &str = "MY_AUTH_TOKEN";
/// Environment variable holding the subscription identifier.
pub const SUBSCRIPTION_ID_ENV: &str = "SUB_ID";

pub const DEFAULT_RESET_API_BASE_URL: &str = "https://www.88code.org";

/// Base URL of the credit reset API. Defaults to `https://www.88code.org`.
pub static RESET_API_BASE_URL: Lazy<String> = Lazy::new(|| {
    env_value("RESET_API_BASE_URL").unwrap_or_else(|| DEFAULT_RESET_API_BASE_URL.to_string())
});

/// Seconds between scheduled resets. Defaults to one day.
pub static RESET_INTERVAL_SECS: Lazy<u64> = Lazy::new(|| {
    parse_env::<u64>("RESET_INTERVAL_SECS")
        .filter(|secs| *secs > 0)
        .unwrap_or(86_400)
});

/// When truthy, the timer fires once immediately at startup instead of waiting a full
/// interval. Defaults to `false`.
pub static RESET_ON_STARTUP: Lazy<bool> = Lazy::new(|| {
    env_value("RESET_ON_STARTUP")
        .map(|value| parse_flag(&value))
        .unwrap_or(false)
});

/// Optional timeout for the outbound reset call. Unset means no client-side timeout.
pub static RESET_REQUEST_TIMEOUT: Lazy<Option<Duration>> = Lazy::new(|| {
    parse_env::<u64>("RESET_REQUEST_TIMEOUT_SECS")
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
});

/// Listen address for the manual trigger endpoint. Defaults to `0.0.0.0`.
pub static BIND_ADDRESS: Lazy<String> =
    Lazy::new(|| env_value("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()));

/// Listen port for the manual trigger endpoint. Defaults to `3000`.
pub static BIND_PORT: Lazy<u16> = Lazy::new(|| parse_env::<u16>("BIND_PORT").unwrap_or(3000));

/// Secrets needed for a single reset call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResetCredentials {
    pub auth_token: String,
    pub subscription_id: String,
}

impl ResetCredentials {
    pub fn new(auth_token: impl Into<String>, subscription_id: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            subscription_id: subscription_id.into(),
        }
    }

    /// Reads the secrets from the environment. `*_FILE` variants take precedence so
    /// mounted secrets can be rotated without restarting the process.
    pub fn from_env() -> Self {
        Self {
            auth_token: read_secret_env(AUTH_TOKEN_ENV, "MY_AUTH_TOKEN_FILE").unwrap_or_default(),
            subscription_id: read_secret_env(SUBSCRIPTION_ID_ENV, "SUB_ID_FILE")
                .unwrap_or_default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.auth_token.trim().is_empty() && !self.subscription_id.trim().is_empty()
    }
}

impl fmt::Debug for ResetCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetCredentials")
            .field("auth_token", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

/// Where each invocation gets its credentials from.
#[derive(Clone, Debug, Default)]
pub enum CredentialSource {
    /// Re-read the environment on every call.
    #[default]
    Environment,
    Fixed(ResetCredentials),
}

impl CredentialSource {
    pub fn load(&self) -> ResetCredentials {
        match self {
            CredentialSource::Environment => ResetCredentials::from_env(),
            CredentialSource::Fixed(credentials) => credentials.clone(),
        }
    }
}

pub(crate) fn parse_flag(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes")
}

/// Trimmed value of `key`; unset and blank both read as `None`.
fn env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parsed value of `key`; unset, blank and malformed all read as `None`.
fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env_value(key)?.parse().ok()
}

fn read_secret_env(value_key: &str, file_key: &str) -> Option<String> {
    if let Some(path) = env_value(file_key) {
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let trimmed = contents.trim().to_string();
                if !trimmed.is_empty() {
                    return Some(trimmed);
                }
            }
            Err(err) => tracing::warn!(%err, key = file_key, %path, "failed to read secret file"),
        }
    }

    env_value(value_key)
}
