use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use tracing::debug;

use super::payload::IdentityPayload;
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Source of the current user's identity.
///
/// Fails with an `Auth` error when there is no valid session and with a
/// `Transport` error for network or server failures.
pub trait IdentityProvider: Send + Sync {
    fn fetch_identity(&self) -> impl Future<Output = AppResult<IdentityPayload>> + Send;
}

/// Fetches the identity from the backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpIdentityProvider {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> AppResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::config("identity_url".to_string(), format!("invalid identity endpoint '{}': {}", endpoint, e)))?;
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal("http_client".to_string(), e.to_string()))?;
        Ok(Self { client, endpoint, token })
    }

    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        let Some(endpoint) = cfg.identity_endpoint() else {
            return Err(AppError::config("identity_url", "PARISH_IDENTITY_URL is not set"));
        };
        Self::new(&endpoint, cfg.api_token.clone(), cfg.request_timeout)
    }

    pub fn endpoint(&self) -> &Url { &self.endpoint }
}

impl IdentityProvider for HttpIdentityProvider {
    fn fetch_identity(&self) -> impl Future<Output = AppResult<IdentityPayload>> + Send {
        async move {
            let mut req = self.client.get(self.endpoint.clone()).header(ACCEPT, "application/json");
            if let Some(token) = &self.token {
                req = req.header(AUTHORIZATION, format!("token {}", token));
            }
            let resp = req.send().await?;
            let status = resp.status();
            debug!(target: "identity", url = %self.endpoint, status = status.as_u16(), "identity fetch");
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(AppError::auth("session_expired".to_string(), format!("identity endpoint answered {}", status)));
            }
            if !status.is_success() {
                return Err(AppError::transport(format!("identity_http_{}", status.as_u16()), format!("identity endpoint answered {}", status)));
            }
            let body = resp.text().await?;
            IdentityPayload::from_json(&body)?.require_signed_in()
        }
    }
}

/// Returns a fixed answer. Used for offline evaluation and tests.
///
/// A stored payload for `Guest` or a blank user fails with `Auth`, the same
/// as the HTTP backend.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    result: AppResult<IdentityPayload>,
    calls: AtomicUsize,
}

impl StaticIdentityProvider {
    pub fn ok(payload: IdentityPayload) -> Self { Self { result: Ok(payload), calls: AtomicUsize::new(0) } }

    pub fn failing(err: AppError) -> Self { Self { result: Err(err), calls: AtomicUsize::new(0) } }

    /// Load a payload from a JSON file (bare or enveloped).
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let body = std::fs::read_to_string(path)
            .map_err(|e| AppError::user("identity_file".to_string(), format!("{}: {}", path.display(), e)))?;
        Ok(Self::ok(IdentityPayload::from_json(&body)?))
    }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl IdentityProvider for StaticIdentityProvider {
    fn fetch_identity(&self) -> impl Future<Output = AppResult<IdentityPayload>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.result.clone().and_then(IdentityPayload::require_signed_in);
        async move { result }
    }
}
