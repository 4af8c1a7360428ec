//! Client configuration: base URL, API version, timeout, user agent and
//! extra headers, either built in code or read from `CIPHERGUARD_*`
//! environment variables.

use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_API_VERSION: &str = "v2";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_USER_AGENT: &str = concat!("cipherguard-core/", env!("CARGO_PKG_VERSION"));

/// Connection settings shared by every request a `Client` issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_version: String,
    /// Per-request timeout applied by the transport. `None` disables it.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Extra headers sent with every request (session cookie, CSRF token, ...).
    pub headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base URL '{base_url}' must start with http:// or https://"
            )));
        }
        Ok(Self {
            base_url,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
        })
    }

    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Read the configuration from `CIPHERGUARD_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("CIPHERGUARD_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::Config("CIPHERGUARD_BASE_URL is required".to_string()))?;
        let mut config = Self::new(&base_url)?;

        if let Some(version) = lookup("CIPHERGUARD_API_VERSION") {
            config.api_version = version;
        }

        if let Some(secs) = lookup("CIPHERGUARD_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| ApiError::Config(format!("Invalid CIPHERGUARD_TIMEOUT_SECS: {e}")))?;
            // 0 disables the timeout
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(user_agent) = lookup("CIPHERGUARD_USER_AGENT") {
            config.user_agent = user_agent;
        }

        Ok(config)
    }
}
