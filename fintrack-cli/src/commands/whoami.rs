//! Whoami command - show the signed-in identity

use anyhow::Result;
use colored::Colorize;
use fintrack_core::services::navigator::DASHBOARD_PATH;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;

    let pb = output::spinner("Checking session...", json);
    let decision = ctx.guard.evaluate(DASHBOARD_PATH).await;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&ctx.store.current())?);
        return Ok(());
    }

    let Some(identity) = ctx.store.identity().filter(|_| decision.is_allowed()) else {
        output::warning("Not signed in. Run 'ft signin' to connect your account.");
        return Ok(());
    };

    println!("{}", identity.display_name().bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Email", identity.email.as_str()]);
    table.add_row(vec!["User ID", identity.id.as_str()]);
    table.add_row(vec![
        "Currency".to_string(),
        format!(
            "{} ({}, {})",
            identity.default_currency.code,
            identity.default_currency.symbol,
            identity.default_currency.name
        ),
    ]);
    table.add_row(vec![
        "Member since".to_string(),
        identity.created_at.format("%Y-%m-%d").to_string(),
    ]);
    println!("{}", table);

    if ctx.config.demo_mode {
        println!();
        output::info("Demo mode is on");
    }

    Ok(())
}
