//! Identity provider port - "who am I"

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::Identity;

/// Resolves the identity behind the current session credentials
///
/// Implementations send whatever credentials the session carries (cookies)
/// and either return a well-formed [`Identity`] or fail. Any timeout is the
/// implementation's business; callers do not add one.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch the identity for the current session, once, without retrying
    async fn fetch_current_identity(&self) -> Result<Identity>;
}
