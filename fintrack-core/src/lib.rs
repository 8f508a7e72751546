//! Fintrack Core - session, routing and ledger logic for the Fintrack client
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Identity, SessionState, Income, Expense, etc.)
//! - **ports**: Trait definitions for external dependencies (IdentityProvider, LedgerApi)
//! - **services**: Session store, route guard, navigation, sign-in, and ledger orchestration
//! - **adapters**: Concrete implementations (HTTP API client, in-memory, demo data)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::api_client::{ApiClient, ApiClientOptions};
use adapters::demo::demo_backend;
use adapters::http_identity::HttpIdentityProvider;
use adapters::http_ledger::HttpLedgerClient;
use config::Config;
use ports::{CategoryApi, IdentityProvider, LedgerApi};
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    Category, DashboardSummary, GuardDecision, Identity, NavigationIntent, SessionState,
    TransactionDraft, TransactionKind,
};
pub use domain::result::Error;
pub use services::{FetchMode, NavigationOutcome, SessionStore};

/// Main context for Fintrack operations
///
/// Holds the configuration, the one session store for the process, and the
/// services wired to either the HTTP API or the demo backend.
pub struct FintrackContext {
    pub config: Config,
    pub store: Arc<SessionStore>,
    pub guard: Arc<RouteGuard>,
    pub navigator: Navigator,
    pub sign_in: SignInService,
    pub ledger: LedgerService,
    pub categories: CategoryService,
}

impl FintrackContext {
    /// Create a context from the settings in `fintrack_dir`
    pub fn new(fintrack_dir: &Path) -> Result<Self> {
        let config = Config::load(fintrack_dir)?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let (provider, ledger, categories): (
            Arc<dyn IdentityProvider>,
            Arc<dyn LedgerApi>,
            Arc<dyn CategoryApi>,
        ) = if config.demo_mode {
            let (provider, ledger) = demo_backend();
            let categories: Arc<dyn CategoryApi> = ledger.clone();
            (provider as Arc<dyn IdentityProvider>, ledger as Arc<dyn LedgerApi>, categories)
        } else {
            let api = Arc::new(ApiClient::new(
                &config.server_url,
                ApiClientOptions {
                    session_cookie: config.session_cookie.clone(),
                    timeout: config.request_timeout(),
                },
            )?);
            let client = Arc::new(HttpLedgerClient::new(Arc::clone(&api)));
            let categories: Arc<dyn CategoryApi> = client.clone();
            (
                Arc::new(HttpIdentityProvider::new(api)) as Arc<dyn IdentityProvider>,
                client as Arc<dyn LedgerApi>,
                categories,
            )
        };

        let store = Arc::new(SessionStore::new());
        let guard = Arc::new(
            RouteGuard::new(
                Arc::clone(&store),
                Arc::clone(&provider),
                config.sign_in_path.clone(),
            )
            .with_fetch_mode(config.fetch_mode),
        );
        let navigator = Navigator::new(Arc::clone(&guard));
        let sign_in = SignInService::new(
            Arc::clone(&store),
            provider,
            config.server_url.clone(),
            config.sign_in_path.clone(),
        );
        let ledger_service = LedgerService::new(ledger, Arc::clone(&categories));
        let category_service = CategoryService::new(categories);

        Ok(Self {
            config,
            store,
            guard,
            navigator,
            sign_in,
            ledger: ledger_service,
            categories: category_service,
        })
    }
}
