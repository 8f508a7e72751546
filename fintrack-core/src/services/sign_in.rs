//! Sign-in service - Google OAuth entry point and post-login redirect

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::navigation::split_location;
use crate::domain::result::Result;
use crate::domain::{Identity, NavigationIntent};
use crate::ports::IdentityProvider;

use super::navigator::DASHBOARD_PATH;
use super::SessionStore;

/// Path of the OAuth entry point on the API server
const GOOGLE_AUTH_PATH: &str = "/auth/google";

/// Outcome of a completed sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub identity: Identity,
    /// Where to send the user next
    pub destination: String,
}

/// Drives the sign-in view
pub struct SignInService {
    store: Arc<SessionStore>,
    provider: Arc<dyn IdentityProvider>,
    server_url: String,
    sign_in_path: String,
}

impl SignInService {
    pub fn new(
        store: Arc<SessionStore>,
        provider: Arc<dyn IdentityProvider>,
        server_url: impl Into<String>,
        sign_in_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            sign_in_path: sign_in_path.into(),
        }
    }

    /// URL the browser opens to start Google sign-in
    pub fn authorization_url(&self) -> String {
        format!("{}{}", self.server_url, GOOGLE_AUTH_PATH)
    }

    /// Sign-in location, carrying `intent` when there is one
    pub fn sign_in_location(&self, intent: Option<&NavigationIntent>) -> String {
        match intent {
            Some(intent) => intent.sign_in_location(&self.sign_in_path),
            None => self.sign_in_path.clone(),
        }
    }

    /// Finish sign-in once the OAuth round trip has set session credentials
    ///
    /// The intent is consumed: its return path becomes the destination, or
    /// the dashboard when the user came to sign-in directly. On failure the
    /// store is cleared and the error is returned for the view to display.
    pub async fn complete(&self, intent: Option<NavigationIntent>) -> Result<SignedIn> {
        let identity = match self.provider.fetch_current_identity().await {
            Ok(identity) => identity,
            Err(err) => {
                warn!(error = %err, "sign-in could not confirm the session");
                self.store.clear();
                return Err(err);
            }
        };

        self.store.set(identity.clone());

        // Never bounce back into sign-in
        let destination = intent
            .map(NavigationIntent::into_return_path)
            .filter(|path| split_location(path).0 != self.sign_in_path)
            .unwrap_or_else(|| DASHBOARD_PATH.to_string());

        info!(user_id = %identity.id, %destination, "signed in");
        Ok(SignedIn {
            identity,
            destination,
        })
    }

    /// Forget the local session
    pub fn sign_out(&self) {
        self.store.clear();
    }
}
