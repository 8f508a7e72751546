//! Dashboard summary computed from a user's incomes and expenses

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Category, Expense, Income, TransactionKind};

/// Label used for expenses without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Neutral gray for the uncategorized slice
const UNCATEGORIZED_COLOR: &str = "#9ca3af";

/// An income or expense flattened for listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub name: String,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub category_ids: Vec<String>,
}

impl From<&Income> for DashboardTransaction {
    fn from(income: &Income) -> Self {
        Self {
            id: income.id.clone(),
            kind: TransactionKind::Income,
            name: income.name.clone(),
            amount: income.amount,
            description: income.description.clone(),
            date: income.date,
            category_ids: income.category_ids.clone(),
        }
    }
}

impl From<&Expense> for DashboardTransaction {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.clone(),
            kind: TransactionKind::Expense,
            name: expense.name.clone(),
            amount: expense.amount,
            description: expense.description.clone(),
            date: expense.date,
            category_ids: expense.category_id.iter().cloned().collect(),
        }
    }
}

/// Share of total spending attributed to one category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub name: String,
    pub amount: Decimal,
    /// Percent of total expense, one decimal place
    pub percentage: Decimal,
    pub color: String,
}

/// Totals and recent activity for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    /// Income minus expense
    pub net_balance: Decimal,
    /// Newest first
    pub recent: Vec<DashboardTransaction>,
    /// Largest first
    pub spending_by_category: Vec<CategorySpend>,
}

impl DashboardSummary {
    pub fn build(
        incomes: &[Income],
        expenses: &[Expense],
        categories: &[Category],
        recent_limit: usize,
    ) -> Self {
        let total_income: Decimal = incomes.iter().map(|i| i.amount).sum();
        let total_expense: Decimal = expenses.iter().map(|e| e.amount).sum();

        let mut recent: Vec<DashboardTransaction> = incomes
            .iter()
            .map(DashboardTransaction::from)
            .chain(expenses.iter().map(DashboardTransaction::from))
            .collect();
        recent.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        recent.truncate(recent_limit);

        Self {
            total_income,
            total_expense,
            net_balance: total_income - total_expense,
            recent,
            spending_by_category: spending_by_category(expenses, categories, total_expense),
        }
    }
}

fn spending_by_category(
    expenses: &[Expense],
    categories: &[Category],
    total_expense: Decimal,
) -> Vec<CategorySpend> {
    let by_id: HashMap<&str, &Category> =
        categories.iter().map(|c| (c.id.as_str(), c)).collect();

    // Keyed by display name so unknown ids fold into "Uncategorized"
    let mut buckets: HashMap<String, (Decimal, String)> = HashMap::new();
    for expense in expenses {
        let (name, color) = match expense.category_id.as_deref().and_then(|id| by_id.get(id)) {
            Some(category) => (category.name.clone(), category.color.clone()),
            None => (UNCATEGORIZED.to_string(), UNCATEGORIZED_COLOR.to_string()),
        };
        let entry = buckets.entry(name).or_insert((Decimal::ZERO, color));
        entry.0 += expense.amount;
    }

    let mut spend: Vec<CategorySpend> = buckets
        .into_iter()
        .map(|(name, (amount, color))| {
            let percentage = if total_expense.is_zero() {
                Decimal::ZERO
            } else {
                (amount * Decimal::ONE_HUNDRED / total_expense).round_dp(1)
            };
            CategorySpend {
                name,
                amount,
                percentage,
                color,
            }
        })
        .collect();
    spend.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    spend
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn income(id: &str, amount: &str, d: u32) -> Income {
        Income {
            id: id.into(),
            name: "Salary".into(),
            amount: dec(amount),
            description: "Pay".into(),
            source: Some("Employer".into()),
            date: day(d),
            user_id: "usr_01".into(),
            category_ids: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    fn expense(id: &str, amount: &str, d: u32, category: Option<&str>) -> Expense {
        Expense {
            id: id.into(),
            name: "Spend".into(),
            amount: dec(amount),
            description: "Spend".into(),
            date: day(d),
            user_id: "usr_01".into(),
            category_id: category.map(String::from),
            created_at: None,
            updated_at: None,
        }
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            color: "#22c55e".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_totals_and_net_balance() {
        let summary = DashboardSummary::build(
            &[income("inc_1", "3000", 1), income("inc_2", "250.50", 15)],
            &[expense("exp_1", "1200", 3, None), expense("exp_2", "80.25", 20, None)],
            &[],
            10,
        );
        assert_eq!(summary.total_income, dec("3250.50"));
        assert_eq!(summary.total_expense, dec("1280.25"));
        assert_eq!(summary.net_balance, dec("1970.25"));
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let summary = DashboardSummary::build(
            &[income("inc_1", "10", 1), income("inc_2", "10", 15)],
            &[expense("exp_1", "5", 3, None), expense("exp_2", "5", 20, None)],
            &[],
            3,
        );
        let ids: Vec<&str> = summary.recent.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["exp_2", "inc_2", "exp_1"]);
        assert_eq!(summary.recent[0].kind, TransactionKind::Expense);
    }

    #[test]
    fn test_spending_by_category() {
        let categories = [category("cat_food", "Food"), category("cat_rent", "Rent")];
        let summary = DashboardSummary::build(
            &[],
            &[
                expense("exp_1", "600", 1, Some("cat_rent")),
                expense("exp_2", "150", 2, Some("cat_food")),
                expense("exp_3", "150", 3, Some("cat_food")),
                expense("exp_4", "100", 4, Some("cat_deleted")),
            ],
            &categories,
            5,
        );

        let spend = &summary.spending_by_category;
        assert_eq!(spend.len(), 3);
        assert_eq!(spend[0].name, "Rent");
        assert_eq!(spend[0].percentage, dec("60.0"));
        assert_eq!(spend[1].name, "Food");
        assert_eq!(spend[1].amount, dec("300"));
        assert_eq!(spend[2].name, UNCATEGORIZED);
        assert_eq!(spend[2].percentage, dec("10.0"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = DashboardSummary::build(&[], &[], &[], 5);
        assert!(summary.net_balance.is_zero());
        assert!(summary.recent.is_empty());
        assert!(summary.spending_by_category.is_empty());
    }
}
