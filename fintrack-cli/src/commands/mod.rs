//! CLI command implementations

pub mod categories;
pub mod dashboard;
pub mod demo;
pub mod open;
pub mod record;
pub mod signin;
pub mod whoami;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use fintrack_core::domain::Identity;
use fintrack_core::services::navigator::DASHBOARD_PATH;
use fintrack_core::{FintrackContext, GuardDecision};
use rust_decimal::Decimal;
use tracing::debug;

/// Get the fintrack directory from environment or default
pub fn get_fintrack_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINTRACK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".fintrack"))
        .ok_or_else(|| anyhow!("Could not find home directory; set FINTRACK_DIR"))
}

/// Get or create fintrack context
pub fn get_context() -> Result<FintrackContext> {
    let fintrack_dir = get_fintrack_dir()?;

    std::fs::create_dir_all(&fintrack_dir)
        .with_context(|| format!("Failed to create fintrack directory: {:?}", fintrack_dir))?;

    debug!(dir = %fintrack_dir.display(), "loading fintrack context");
    FintrackContext::new(&fintrack_dir).context("Failed to initialize fintrack context")
}

/// Pass the dashboard guard or explain how to sign in
pub async fn require_session(ctx: &FintrackContext) -> Result<Identity> {
    match ctx.guard.evaluate(DASHBOARD_PATH).await {
        GuardDecision::Allow => ctx
            .store
            .identity()
            .ok_or_else(|| anyhow!("Session was cleared while checking it")),
        GuardDecision::Redirect { .. } => {
            bail!("Not signed in. Run 'ft signin' first.")
        }
    }
}

pub fn parse_amount(value: &str) -> Result<Decimal> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid amount '{}'", value))
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date format. Use YYYY-MM-DD"))
}
