//! Dashboard command - totals, recent activity and spending by category

use anyhow::Result;
use colored::Colorize;
use fintrack_core::domain::Currency;
use fintrack_core::TransactionKind;
use rust_decimal::Decimal;

use super::{get_context, require_session};
use crate::output;

pub async fn run(recent: usize, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let identity = require_session(&ctx).await?;
    let currency = &identity.default_currency;

    let pb = output::spinner("Loading dashboard...", json);
    let result = ctx.ledger.summary(recent).await;
    pb.finish_and_clear();
    let summary = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", format!("Welcome back, {}", identity.first_name).bold());
    println!();

    let mut totals = output::create_table();
    totals.add_row(vec![
        "Total income".to_string(),
        output::format_amount(summary.total_income, currency),
    ]);
    totals.add_row(vec![
        "Total expenses".to_string(),
        output::format_amount(summary.total_expense, currency),
    ]);
    totals.add_row(vec![
        "Net balance".to_string(),
        signed_amount(summary.net_balance, currency),
    ]);
    println!("{}", totals);
    println!();

    println!("{}", "Recent Transactions".bold());
    if summary.recent.is_empty() {
        println!("  No transactions yet");
    } else {
        let mut table = output::create_table();
        table.set_header(vec!["Date", "Name", "Description", "Amount"]);
        for tx in &summary.recent {
            let amount = match tx.kind {
                TransactionKind::Income => output::format_amount(tx.amount, currency).green(),
                TransactionKind::Expense => {
                    format!("-{}", output::format_amount(tx.amount, currency)).red()
                }
            };
            table.add_row(vec![
                tx.date.to_string(),
                tx.name.clone(),
                tx.description.clone(),
                amount.to_string(),
            ]);
        }
        println!("{}", table);
    }
    println!();

    println!("{}", "Spending by Category".bold());
    if summary.spending_by_category.is_empty() {
        println!("  No expenses yet");
    } else {
        let mut table = output::create_table();
        table.set_header(vec!["Category", "Amount", "Share"]);
        for spend in &summary.spending_by_category {
            table.add_row(vec![
                spend.name.clone(),
                output::format_amount(spend.amount, currency),
                format!("{}%", spend.percentage),
            ]);
        }
        println!("{}", table);
    }

    Ok(())
}

fn signed_amount(amount: Decimal, currency: &Currency) -> String {
    let formatted = output::format_amount(amount, currency);
    if amount.is_sign_negative() {
        formatted.red().to_string()
    } else {
        formatted.green().to_string()
    }
}
