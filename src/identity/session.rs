use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{info, warn};

use super::payload::{IdentityPayload, UserProfile};
use super::provider::IdentityProvider;
use crate::access::{self, AccessView, CapabilityMap, ResolvedIdentity};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::tprintln;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    Loading,
    Ready(Arc<LoadedIdentity>),
    Failed(AppError),
}

/// A profile together with the capability map resolved from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedIdentity {
    pub profile: UserProfile,
    pub capabilities: CapabilityMap,
    pub loaded_at: DateTime<Utc>,
}

/// Proof that a load was started at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    generation: u64,
}

/// Current user's identity for one client session.
///
/// Cloning shares the same session. Every logout, expiry or new load bumps
/// the generation, so a slow fetch that started earlier can never overwrite
/// what happened after it.
#[derive(Debug, Clone)]
pub struct IdentitySession {
    inner: Arc<RwLock<Inner>>,
    strict_roles: bool,
    max_age: Duration,
}

impl Default for IdentitySession {
    fn default() -> Self { Self::new(&Config::default()) }
}

impl IdentitySession {
    pub fn new(cfg: &Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner { state: SessionState::SignedOut, generation: 0 })),
            strict_roles: cfg.strict_roles,
            max_age: cfg.max_identity_age,
        }
    }

    pub fn state(&self) -> SessionState { self.inner.read().state.clone() }

    pub fn is_loading(&self) -> bool { matches!(self.inner.read().state, SessionState::Loading) }

    pub fn loaded(&self) -> Option<Arc<LoadedIdentity>> {
        match &self.inner.read().state {
            SessionState::Ready(loaded) => Some(loaded.clone()),
            _ => None,
        }
    }

    /// Identity to evaluate against. Anonymous unless a load has completed.
    pub fn identity(&self) -> ResolvedIdentity {
        self.loaded().map(|l| l.profile.identity.clone()).unwrap_or_default()
    }

    /// Capability map for the current identity. All denied unless loaded.
    pub fn capabilities(&self) -> CapabilityMap {
        self.loaded().map(|l| l.capabilities).unwrap_or_else(CapabilityMap::all_denied)
    }

    pub fn access(&self) -> AccessView { AccessView::new(self.identity()) }

    pub fn begin_load(&self) -> LoadTicket {
        let mut g = self.inner.write();
        g.generation += 1;
        g.state = SessionState::Loading;
        tprintln!("identity.begin_load gen={}", g.generation);
        LoadTicket { generation: g.generation }
    }

    /// Apply the outcome of a load started with `ticket`.
    ///
    /// Returns `false` and changes nothing if a logout, expiry or newer load
    /// happened in between.
    pub fn finish_load(&self, ticket: LoadTicket, result: AppResult<IdentityPayload>) -> bool {
        self.apply_load(ticket, result).is_some()
    }

    // The returned outcome is decided together with the state it writes, so a
    // later logout cannot change what the caller sees.
    fn apply_load(&self, ticket: LoadTicket, result: AppResult<IdentityPayload>) -> Option<AppResult<Arc<LoadedIdentity>>> {
        let (next, outcome) = match result.and_then(|p| p.into_profile_with(self.strict_roles)) {
            Ok(profile) => {
                let capabilities = access::resolve(&profile.identity);
                let loaded = Arc::new(LoadedIdentity { profile, capabilities, loaded_at: Utc::now() });
                (SessionState::Ready(loaded.clone()), Ok(loaded))
            }
            Err(e) if e.is_auth() => (SessionState::SignedOut, Err(e)),
            Err(e) => (SessionState::Failed(e.clone()), Err(e)),
        };
        let mut g = self.inner.write();
        if g.generation != ticket.generation {
            tprintln!("identity.finish_load stale ticket={} current={}", ticket.generation, g.generation);
            return None;
        }
        match &outcome {
            Ok(loaded) => info!(
                target: "identity",
                user = %loaded.profile.user,
                roles = loaded.profile.identity.roles().len(),
                granted = loaded.capabilities.count_granted(),
                "identity loaded"
            ),
            Err(e) if e.is_auth() => info!(target: "identity", code = e.code_str(), "no valid session"),
            Err(e) => warn!(target: "identity", error = %e, "identity load failed"),
        }
        g.state = next;
        Some(outcome)
    }

    /// Fetch from `provider` and apply the result.
    pub async fn refresh<P: IdentityProvider>(&self, provider: &P) -> AppResult<Arc<LoadedIdentity>> {
        let ticket = self.begin_load();
        let result = provider.fetch_identity().await;
        self.apply_load(ticket, result)
            .unwrap_or_else(|| Err(AppError::auth("session_superseded", "identity changed while loading")))
    }

    /// Reuse the loaded identity unless it is missing or stale.
    pub async fn current_or_refresh<P: IdentityProvider>(&self, provider: &P) -> AppResult<Arc<LoadedIdentity>> {
        if let Some(loaded) = self.loaded() {
            if !self.is_stale_at(&loaded, Utc::now()) {
                return Ok(loaded);
            }
        }
        self.refresh(provider).await
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.loaded() {
            Some(loaded) => self.is_stale_at(&loaded, now),
            None => true,
        }
    }

    fn is_stale_at(&self, loaded: &LoadedIdentity, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.max_age) {
            Ok(max_age) => now.signed_duration_since(loaded.loaded_at) >= max_age,
            // out of chrono's range: never stale
            Err(_) => false,
        }
    }

    /// Explicit sign-out.
    pub fn logout(&self) { self.invalidate("logout"); }

    /// The backend reported the session gone.
    pub fn expire(&self) { self.invalidate("expired"); }

    fn invalidate(&self, reason: &str) {
        let mut g = self.inner.write();
        g.generation += 1;
        g.state = SessionState::SignedOut;
        info!(target: "identity", reason, generation = g.generation, "identity cleared");
    }
}
