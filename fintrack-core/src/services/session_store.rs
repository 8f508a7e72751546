//! Session store - the single source of truth for who is signed in
//!
//! One store is constructed per client process and shared by `Arc` with the
//! route guard and anything that renders session-dependent output. State is
//! written only through [`SessionStore::set`] and [`SessionStore::clear`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::domain::{Identity, SessionState};

type Listener = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// States written but not yet delivered to listeners, in write order
#[derive(Default)]
struct Outbox {
    pending: VecDeque<SessionState>,
    /// Some caller is currently delivering `pending`
    delivering: bool,
}

/// In-memory cache of the current [`SessionState`]
pub struct SessionStore {
    state: RwLock<SessionState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    outbox: Mutex<Outbox>,
    next_id: AtomicU64,
}

impl SessionStore {
    /// Create an anonymous store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Anonymous),
            listeners: Mutex::new(Vec::new()),
            outbox: Mutex::new(Outbox::default()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Last known state; no side effects
    pub fn current(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.current().into_identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    /// Replace the state with `Authenticated(identity)`
    pub fn set(&self, identity: Identity) {
        debug!(user_id = %identity.id, "session authenticated");
        self.replace(SessionState::Authenticated(identity));
    }

    /// Reset to `Anonymous`; clearing an anonymous store changes nothing
    /// but still notifies listeners
    pub fn clear(&self) {
        debug!("session cleared");
        self.replace(SessionState::Anonymous);
    }

    /// Register a callback invoked after every `set`/`clear`
    ///
    /// Callbacks run with no store lock held, so they may read or mutate the
    /// store. Every written state is delivered exactly once and in write
    /// order. A mutation made while another caller (or an outer callback)
    /// is delivering is handed to that caller, which notifies it next.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a callback; returns false if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn replace(&self, next: SessionState) {
        {
            // Write and enqueue under the outbox lock so delivery order
            // matches write order across threads
            let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
            *self.state.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
            outbox.pending.push_back(next);
            if outbox.delivering {
                return;
            }
            outbox.delivering = true;
        }

        let _reset = DeliveryReset(&self.outbox);
        loop {
            let snapshot = {
                let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
                match outbox.pending.pop_front() {
                    Some(state) => state,
                    None => {
                        outbox.delivering = false;
                        return;
                    }
                }
            };

            let listeners: Vec<Listener> = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            for listener in listeners {
                listener(&snapshot);
            }
        }
    }
}

/// Releases delivery if a listener panics mid-delivery
struct DeliveryReset<'a>(&'a Mutex<Outbox>);

impl Drop for DeliveryReset<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut outbox = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            outbox.pending.clear();
            outbox.delivering = false;
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.current())
            .finish_non_exhaustive()
    }
}
