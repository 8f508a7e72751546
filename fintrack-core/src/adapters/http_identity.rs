//! "Who am I" over HTTP

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::result::Result;
use crate::domain::Identity;
use crate::ports::IdentityProvider;

use super::api_client::ApiClient;

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: Identity,
}

/// Identity provider backed by `GET {server}/auth/me`
///
/// No body is sent; the session cookie travels with the client. Any
/// non-2xx status, transport failure, or body without a complete `user`
/// object is an error.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    api: Arc<ApiClient>,
}

impl HttpIdentityProvider {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn fetch_current_identity(&self) -> Result<Identity> {
        let me: MeResponse = self.api.get(&["auth", "me"]).await?;
        Ok(me.user)
    }
}
