//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits; adapters provide HTTP and in-memory versions.

mod identity_provider;
mod ledger;

pub use identity_provider::IdentityProvider;
pub use ledger::{CategoryApi, LedgerApi, Page, PageRequest};
