//! Route guard - decides whether a navigation may proceed
//!
//! ```text
//! Start -> cache hit                      -> Allow
//! Start -> cache miss -> fetch -> success -> set   -> Allow
//! Start -> cache miss -> fetch -> failure -> clear -> Redirect (or Allow at sign-in)
//! ```
//!
//! The guard never retries and never adds a timeout of its own; a fetch that
//! hangs holds the decision until the provider gives up.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::navigation::split_location;
use crate::domain::{GuardDecision, NavigationIntent};
use crate::ports::IdentityProvider;

use super::SessionStore;

/// How overlapping cold evaluations share the identity fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Evaluations arriving while a fetch is pending wait for that fetch
    #[default]
    Coalesce,
    /// Every cold evaluation issues its own fetch
    Independent,
}

/// Resolves to `true` once the store holds an identity
type PendingFetch = Shared<BoxFuture<'static, bool>>;

/// Gate evaluated before entering a protected view
pub struct RouteGuard {
    store: Arc<SessionStore>,
    provider: Arc<dyn IdentityProvider>,
    sign_in_path: String,
    mode: FetchMode,
    in_flight: Arc<Mutex<Option<PendingFetch>>>,
}

impl RouteGuard {
    pub fn new(
        store: Arc<SessionStore>,
        provider: Arc<dyn IdentityProvider>,
        sign_in_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            sign_in_path: sign_in_path.into(),
            mode: FetchMode::default(),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.mode
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Decide whether navigation to `target_path` may proceed
    ///
    /// `target_path` may carry a query string; it is preserved verbatim in
    /// the redirect intent. Fetch failures are absorbed here and only show up
    /// as a [`GuardDecision::Redirect`].
    pub async fn evaluate(&self, target_path: &str) -> GuardDecision {
        if self.store.is_authenticated() {
            return GuardDecision::Allow;
        }

        let authenticated = match self.mode {
            FetchMode::Independent => {
                resolve_identity(Arc::clone(&self.store), Arc::clone(&self.provider)).await
            }
            FetchMode::Coalesce => self.join_or_start_fetch().await,
        };

        if authenticated {
            return GuardDecision::Allow;
        }

        let (path, _) = split_location(target_path);
        if path == self.sign_in_path {
            debug!(path, "already at sign-in, not redirecting");
            return GuardDecision::Allow;
        }

        info!(return_path = target_path, "not signed in, redirecting to sign-in");
        GuardDecision::Redirect {
            to: self.sign_in_path.clone(),
            intent: NavigationIntent::new(target_path),
        }
    }

    /// Hand out the pending fetch, starting one if none is in flight
    ///
    /// The fetch clears its own slot after updating the store, so the next
    /// cold evaluation after it settles starts fresh.
    fn join_or_start_fetch(&self) -> PendingFetch {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = slot.as_ref() {
            debug!("joining in-flight identity fetch");
            return pending.clone();
        }
        // A fetch may have settled between the cache check and taking the slot
        if self.store.is_authenticated() {
            return future::ready(true).boxed().shared();
        }

        let store = Arc::clone(&self.store);
        let provider = Arc::clone(&self.provider);
        let in_flight = Arc::clone(&self.in_flight);
        let fetch = async move {
            let authenticated = resolve_identity(store, provider).await;
            in_flight.lock().unwrap_or_else(PoisonError::into_inner).take();
            authenticated
        }
        .boxed()
        .shared();

        *slot = Some(fetch.clone());
        fetch
    }
}

/// One authoritative fetch followed by the matching store update
async fn resolve_identity(store: Arc<SessionStore>, provider: Arc<dyn IdentityProvider>) -> bool {
    debug!("session cache miss, fetching identity");
    match provider.fetch_current_identity().await {
        Ok(identity) => {
            store.set(identity);
            true
        }
        Err(err) => {
            debug!(error = %err, unauthorized = err.is_unauthorized(), "identity fetch failed");
            store.clear();
            false
        }
    }
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("sign_in_path", &self.sign_in_path)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
