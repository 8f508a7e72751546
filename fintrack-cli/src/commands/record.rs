//! Income and expense commands - record new entries or update existing ones

use anyhow::Result;
use chrono::Local;
use clap::{Args, Subcommand};
use colored::Colorize;
use dialoguer::Input;
use fintrack_core::domain::{
    Currency, ExpenseUpdate, IncomeUpdate, TransactionDraft, TransactionKind,
};
use fintrack_core::services::{CategoryService, Recorded};
use fintrack_core::FintrackContext;
use rust_decimal::Decimal;

use super::{get_context, parse_amount, parse_date, require_session};
use crate::output;

/// Fields shared by new incomes and expenses
#[derive(Args)]
pub struct EntryArgs {
    /// Short name, e.g. "Salary"
    #[arg(long)]
    name: Option<String>,
    /// Positive amount
    #[arg(long)]
    amount: Option<String>,
    /// Longer description
    #[arg(long)]
    description: Option<String>,
    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,
    /// Category name or ID (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Fields shared by income and expense updates
#[derive(Args)]
pub struct UpdateArgs {
    /// ID of the record to update
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,
    /// Category name or ID to attach (repeatable)
    #[arg(long = "add-category")]
    add_categories: Vec<String>,
    /// Category name or ID to detach (repeatable)
    #[arg(long = "remove-category")]
    remove_categories: Vec<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Record a new income
    Add {
        #[command(flatten)]
        entry: EntryArgs,
        /// Where the money came from
        #[arg(long)]
        source: Option<String>,
    },
    /// Update fields of an existing income
    Update {
        #[command(flatten)]
        update: UpdateArgs,
        #[arg(long)]
        source: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a new expense
    Add {
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Update fields of an existing expense
    Update {
        #[command(flatten)]
        update: UpdateArgs,
    },
}

pub async fn run_income(command: IncomeCommands) -> Result<()> {
    let ctx = get_context()?;
    let identity = require_session(&ctx).await?;

    match command {
        IncomeCommands::Add { entry, source } => {
            let source = match source {
                Some(source) => Some(source),
                None if entry.json => None,
                None => Some(
                    Input::<String>::new()
                        .with_prompt("Source (optional)")
                        .allow_empty(true)
                        .interact_text()?,
                ),
            };
            add(&ctx, TransactionKind::Income, entry, source, &identity.default_currency).await
        }
        IncomeCommands::Update { update, source } => {
            let json = update.json;
            let categories = CategoryLookup::new(&ctx.categories);
            let changes = IncomeUpdate {
                name: update.name,
                amount: update.amount.as_deref().map(parse_amount).transpose()?,
                description: update.description,
                source,
                date: update.date.as_deref().map(parse_date).transpose()?,
                added_category_ids: categories.resolve_all(update.add_categories).await?,
                removed_category_ids: categories.resolve_all(update.remove_categories).await?,
            };

            let pb = output::spinner("Updating income...", json);
            let result = ctx.ledger.update_income(&update.id, &changes).await;
            pb.finish_and_clear();
            let income = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&income)?);
            } else {
                output::success("Income updated");
                print_entry(
                    &income.id,
                    &income.name,
                    income.amount,
                    &income.date.to_string(),
                    &identity.default_currency,
                );
            }
            Ok(())
        }
    }
}

pub async fn run_expense(command: ExpenseCommands) -> Result<()> {
    let ctx = get_context()?;
    let identity = require_session(&ctx).await?;

    match command {
        ExpenseCommands::Add { entry } => {
            add(&ctx, TransactionKind::Expense, entry, None, &identity.default_currency).await
        }
        ExpenseCommands::Update { update } => {
            let json = update.json;
            let categories = CategoryLookup::new(&ctx.categories);
            let changes = ExpenseUpdate {
                name: update.name,
                amount: update.amount.as_deref().map(parse_amount).transpose()?,
                description: update.description,
                date: update.date.as_deref().map(parse_date).transpose()?,
                added_category_ids: categories.resolve_all(update.add_categories).await?,
                removed_category_ids: categories.resolve_all(update.remove_categories).await?,
            };

            let pb = output::spinner("Updating expense...", json);
            let result = ctx.ledger.update_expense(&update.id, &changes).await;
            pb.finish_and_clear();
            let expense = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&expense)?);
            } else {
                output::success("Expense updated");
                print_entry(
                    &expense.id,
                    &expense.name,
                    expense.amount,
                    &expense.date.to_string(),
                    &identity.default_currency,
                );
            }
            Ok(())
        }
    }
}

async fn add(
    ctx: &FintrackContext,
    kind: TransactionKind,
    entry: EntryArgs,
    source: Option<String>,
    currency: &Currency,
) -> Result<()> {
    let json = entry.json;

    // Prompt for anything not given on the command line
    let name = match entry.name {
        Some(name) => name,
        None => Input::new().with_prompt("Name").interact_text()?,
    };
    let amount = match entry.amount {
        Some(amount) => amount,
        None => Input::new().with_prompt("Amount").interact_text()?,
    };
    let description = match entry.description {
        Some(description) => description,
        None => Input::new().with_prompt("Description").interact_text()?,
    };
    let date = match entry.date {
        Some(date) => parse_date(&date)?,
        None => Local::now().date_naive(),
    };

    let category_ids = CategoryLookup::new(&ctx.categories)
        .resolve_all(entry.categories)
        .await?;

    let draft = TransactionDraft {
        kind,
        name,
        amount: parse_amount(&amount)?,
        description,
        source,
        date,
        category_ids,
    };

    let pb = output::spinner(&format!("Recording {}...", kind.as_str()), json);
    let result = ctx.ledger.record(draft).await;
    pb.finish_and_clear();
    let recorded = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recorded)?);
        return Ok(());
    }

    match &recorded {
        Recorded::Income(income) => {
            output::success("Income recorded");
            print_entry(
                &income.id,
                &income.name,
                income.amount,
                &income.date.to_string(),
                currency,
            );
            if let Some(source) = &income.source {
                println!("  Source: {}", source);
            }
        }
        Recorded::Expense(expense) => {
            output::success("Expense recorded");
            print_entry(
                &expense.id,
                &expense.name,
                expense.amount,
                &expense.date.to_string(),
                currency,
            );
        }
    }
    Ok(())
}

fn print_entry(id: &str, name: &str, amount: Decimal, date: &str, currency: &Currency) {
    println!("  ID: {}", id.dimmed());
    println!("  Name: {}", name);
    println!("  Amount: {}", output::format_amount(amount, currency));
    println!("  Date: {}", date);
}

/// Maps category names to IDs, passing unknown values through as IDs
struct CategoryLookup<'a> {
    categories: &'a CategoryService,
}

impl<'a> CategoryLookup<'a> {
    fn new(categories: &'a CategoryService) -> Self {
        Self { categories }
    }

    async fn resolve_all(&self, values: Vec<String>) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(values.len());
        for value in values {
            let id = self.resolve(&value).await?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    async fn resolve(&self, value: &str) -> Result<String> {
        let value = value.trim();
        let found = self.categories.search(value).await?;
        Ok(found
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(value))
            .map(|c| c.id)
            .unwrap_or_else(|| value.to_string()))
    }
}
