//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for IdentityProvider, LedgerApi and CategoryApi
//! - In-memory providers for tests and demo mode
//! - Demo data seeding the in-memory ledger

pub mod api_client;
pub mod demo;
pub mod http_identity;
pub mod http_ledger;
pub mod memory;

#[cfg(test)]
pub mod mock_api;
