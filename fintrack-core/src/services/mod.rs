//! Service layer - session, routing, and ledger orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod ledger;
pub mod navigator;
mod route_guard;
mod session_store;
mod sign_in;

pub use ledger::{CategoryService, LedgerService, Recorded};
pub use navigator::{NavigationOutcome, Navigator, Route};
pub use route_guard::{FetchMode, RouteGuard};
pub use session_store::{SessionStore, SubscriptionId};
pub use sign_in::{SignInService, SignedIn};
