//! Demo backend
//!
//! Seeds the in-memory adapters with a signed-in demo user and 90 days of
//! realistic activity:
//! - monthly salary plus occasional freelance income
//! - rent, utilities, weekly groceries, and smaller day-to-day spending

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::{Category, Currency, Expense, Identity, Income};

use super::memory::{InMemoryIdentityProvider, InMemoryLedger};

pub const DEMO_USER_ID: &str = "demo-user-0001";

/// Days of history to generate
const DEMO_DAYS: i64 = 90;

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// The identity every demo session resolves to
pub fn demo_identity() -> Identity {
    Identity {
        id: DEMO_USER_ID.to_string(),
        email: "demo@fintrack.app".to_string(),
        first_name: "Demo".to_string(),
        last_name: Some("User".to_string()),
        profile_picture_url: None,
        default_currency: Currency::new("USD", "$", "US Dollar"),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn demo_categories() -> Vec<Category> {
    [
        ("cat-housing", "Housing", "Rent and home costs", "#6366f1"),
        ("cat-food", "Food", "Groceries and eating out", "#22c55e"),
        ("cat-transport", "Transport", "Fuel, fares, rideshare", "#f59e0b"),
        ("cat-utilities", "Utilities", "Power, water, internet", "#0ea5e9"),
        ("cat-fun", "Entertainment", "Streaming and going out", "#ec4899"),
        ("cat-salary", "Salary", "Regular employment income", "#14b8a6"),
    ]
    .into_iter()
    .map(|(id, name, description, color)| Category {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        color: color.to_string(),
        created_at: fixed_time(),
    })
    .collect()
}

/// Incomes and expenses for the last [`DEMO_DAYS`] days ending `today`
pub fn generate_demo_records(today: NaiveDate) -> (Vec<Income>, Vec<Expense>) {
    let mut incomes = Vec::new();
    let mut expenses = Vec::new();

    for days_ago in 0..DEMO_DAYS {
        let date = today - Duration::days(days_ago);
        let day_index = DEMO_DAYS - days_ago;

        // Payday and rent every 30 days
        if day_index % 30 == 1 {
            incomes.push(demo_income(
                format!("demo-inc-salary-{}", day_index),
                "Salary",
                Decimal::new(420000, 2),
                "Monthly salary",
                Some("Acme Corp"),
                date,
                vec!["cat-salary"],
            ));
            expenses.push(demo_expense(
                format!("demo-exp-rent-{}", day_index),
                "Rent",
                Decimal::new(145000, 2),
                "Apartment rent",
                date,
                Some("cat-housing"),
            ));
        }

        if day_index % 30 == 5 {
            expenses.push(demo_expense(
                format!("demo-exp-utilities-{}", day_index),
                "Utilities",
                Decimal::new(13842, 2),
                "Electricity and internet",
                date,
                Some("cat-utilities"),
            ));
        }

        if day_index % 45 == 20 {
            incomes.push(demo_income(
                format!("demo-inc-freelance-{}", day_index),
                "Freelance",
                Decimal::new(65000, 2),
                "Website project",
                Some("Client"),
                date,
                vec![],
            ));
        }

        if day_index % 7 == 3 {
            // Vary the weekly shop a little so totals look organic
            let cents = 8_500 + (day_index % 5) * 1_137;
            expenses.push(demo_expense(
                format!("demo-exp-groceries-{}", day_index),
                "Groceries",
                Decimal::new(cents, 2),
                "Weekly shop",
                date,
                Some("cat-food"),
            ));
        }

        if day_index % 4 == 0 {
            expenses.push(demo_expense(
                format!("demo-exp-coffee-{}", day_index),
                "Coffee",
                Decimal::new(475, 2),
                "Flat white",
                date,
                Some("cat-food"),
            ));
        }

        if day_index % 10 == 6 {
            expenses.push(demo_expense(
                format!("demo-exp-fuel-{}", day_index),
                "Fuel",
                Decimal::new(5200, 2),
                "Gas station",
                date,
                Some("cat-transport"),
            ));
        }

        if day_index % 30 == 15 {
            expenses.push(demo_expense(
                format!("demo-exp-streaming-{}", day_index),
                "Streaming",
                Decimal::new(1599, 2),
                "Video subscription",
                date,
                Some("cat-fun"),
            ));
        }
    }

    (incomes, expenses)
}

fn demo_income(
    id: String,
    name: &str,
    amount: Decimal,
    description: &str,
    source: Option<&str>,
    date: NaiveDate,
    category_ids: Vec<&str>,
) -> Income {
    Income {
        id,
        name: name.to_string(),
        amount,
        description: description.to_string(),
        source: source.map(String::from),
        date,
        user_id: DEMO_USER_ID.to_string(),
        category_ids: category_ids.into_iter().map(String::from).collect(),
        created_at: Some(fixed_time()),
        updated_at: Some(fixed_time()),
    }
}

fn demo_expense(
    id: String,
    name: &str,
    amount: Decimal,
    description: &str,
    date: NaiveDate,
    category_id: Option<&str>,
) -> Expense {
    Expense {
        id,
        name: name.to_string(),
        amount,
        description: description.to_string(),
        date,
        user_id: DEMO_USER_ID.to_string(),
        category_id: category_id.map(String::from),
        created_at: Some(fixed_time()),
        updated_at: Some(fixed_time()),
    }
}

/// Signed-in identity provider and seeded ledger for demo mode
pub fn demo_backend() -> (Arc<InMemoryIdentityProvider>, Arc<InMemoryLedger>) {
    let (incomes, expenses) = generate_demo_records(Utc::now().date_naive());
    let provider = InMemoryIdentityProvider::signed_in(demo_identity());
    let ledger = InMemoryLedger::new(DEMO_USER_ID)
        .with_categories(demo_categories())
        .with_records(incomes, expenses);
    (Arc::new(provider), Arc::new(ledger))
}
