//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const TOKEN_DIR: &str = ".medlink";
const TOKEN_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL for {var}: {value}")]
    InvalidBaseUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL for patient and record endpoints, without trailing slash.
    pub api_base_url: String,
    /// Base URL for the login endpoint; usually the same host as the API.
    pub auth_base_url: String,
    /// Quiet period before a non-empty search query is fetched.
    pub search_debounce: Duration,
    pub timeouts: HttpTimeouts,
    /// File holding the persisted session token.
    pub token_path: PathBuf,
    /// Whether the built-in demo credentials bypass the login endpoint.
    pub demo_login: bool,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `MEDLINK_API_BASE_URL`: default `http://127.0.0.1:8000`
    /// - `MEDLINK_AUTH_BASE_URL`: defaults to the API base URL
    /// - `MEDLINK_SEARCH_DEBOUNCE_MS`: default 500
    /// - `MEDLINK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `MEDLINK_CONNECT_TIMEOUT_SECS`: default 10
    /// - `MEDLINK_TOKEN_PATH`: default `$HOME/.medlink/session.json`
    /// - `MEDLINK_DEMO_LOGIN`: default true
    ///
    /// # Errors
    ///
    /// Returns an error if a base URL is not `http://` or `https://`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. `from_env` delegates here.
    ///
    /// # Errors
    ///
    /// Returns an error if a base URL is not `http://` or `https://`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = parse_base_url(
            "MEDLINK_API_BASE_URL",
            lookup("MEDLINK_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()),
        )?;
        let auth_base_url = match lookup("MEDLINK_AUTH_BASE_URL") {
            Some(raw) => parse_base_url("MEDLINK_AUTH_BASE_URL", raw)?,
            None => api_base_url.clone(),
        };
        let debounce_ms = env_parse(&lookup, "MEDLINK_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS);
        let timeouts = HttpTimeouts {
            request_secs: env_parse(&lookup, "MEDLINK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse(&lookup, "MEDLINK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let token_path = lookup("MEDLINK_TOKEN_PATH")
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(|| default_token_path(lookup("HOME")), PathBuf::from);
        let demo_login = lookup("MEDLINK_DEMO_LOGIN")
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(true);

        Ok(Self {
            api_base_url,
            auth_base_url,
            search_debounce: Duration::from_millis(debounce_ms),
            timeouts,
            token_path,
            demo_login,
        })
    }

    /// Point both API and auth endpoints at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not `http://` or `https://`.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let base = parse_base_url("--base-url", base_url.to_owned())?;
        self.auth_base_url.clone_from(&base);
        self.api_base_url = base;
        Ok(self)
    }
}

fn env_parse<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_base_url(var: &'static str, raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl { var, value: raw })
    }
}

fn default_token_path(home: Option<String>) -> PathBuf {
    let base = home
        .filter(|h| !h.is_empty())
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    base.join(TOKEN_DIR).join(TOKEN_FILE)
}
