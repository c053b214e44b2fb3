//! Environment-driven configuration for the identity client and CLI.

use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_IDENTITY_PATH: &str = "/api/method/frappe.auth.get_logged_user_roles";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_AGE_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL; `None` means identity must come from a file.
    pub identity_url: Option<String>,
    pub identity_path: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    /// Reject identities carrying role names outside the known set.
    pub strict_roles: bool,
    /// Age after which a loaded identity is considered stale.
    pub max_identity_age: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity_url: None,
            identity_path: DEFAULT_IDENTITY_PATH.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            strict_roles: false,
            max_identity_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> { Self::from_lookup(|k| std::env::var(k).ok()) }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Config::default();
        cfg.identity_url = get("PARISH_IDENTITY_URL").map(|u| u.trim_end_matches('/').to_string());
        if let Some(path) = get("PARISH_IDENTITY_PATH") {
            cfg.identity_path = if path.starts_with('/') { path } else { format!("/{}", path) };
        }
        cfg.api_token = get("PARISH_API_TOKEN");
        if let Some(v) = get("PARISH_HTTP_TIMEOUT_SECS") {
            cfg.request_timeout = Duration::from_secs(parse_secs("PARISH_HTTP_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("PARISH_STRICT_ROLES") {
            cfg.strict_roles = parse_bool("PARISH_STRICT_ROLES", &v)?;
        }
        if let Some(v) = get("PARISH_IDENTITY_MAX_AGE_SECS") {
            cfg.max_identity_age = Duration::from_secs(parse_secs("PARISH_IDENTITY_MAX_AGE_SECS", &v)?);
        }
        Ok(cfg)
    }

    /// Full identity endpoint URL, if a backend is configured.
    pub fn identity_endpoint(&self) -> Option<String> {
        self.identity_url.as_ref().map(|base| format!("{}{}", base, self.identity_path))
    }
}

fn parse_secs(key: &str, v: &str) -> AppResult<u64> {
    v.parse::<u64>()
        .map_err(|_| AppError::config("config_invalid".to_string(), format!("{} must be a whole number of seconds, got '{}'", key, v)))
}

fn parse_bool(key: &str, v: &str) -> AppResult<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::config("config_invalid".to_string(), format!("{} must be a boolean, got '{}'", key, v))),
    }
}
