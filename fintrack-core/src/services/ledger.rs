//! Ledger service - recording incomes/expenses and the dashboard summary

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::result::Result;
use crate::domain::{
    Category, DashboardSummary, Expense, ExpenseUpdate, Income, IncomeUpdate, NewTransaction,
    TransactionDraft,
};
use crate::ports::{CategoryApi, LedgerApi, Page, PageRequest};

/// Upper bound on pages fetched for one summary
const MAX_SUMMARY_PAGES: u32 = 20;

/// A created record of either kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Recorded {
    Income(Income),
    Expense(Expense),
}

/// Ledger operations for the signed-in user
pub struct LedgerService {
    ledger: Arc<dyn LedgerApi>,
    categories: Arc<dyn CategoryApi>,
}

impl LedgerService {
    pub fn new(ledger: Arc<dyn LedgerApi>, categories: Arc<dyn CategoryApi>) -> Self {
        Self { ledger, categories }
    }

    /// Validate a form entry and create the matching record
    ///
    /// Nothing is sent when validation fails.
    pub async fn record(&self, draft: TransactionDraft) -> Result<Recorded> {
        match draft.into_new_transaction()? {
            NewTransaction::Income(income) => {
                let created = self.ledger.create_income(&income).await?;
                debug!(id = %created.id, "income recorded");
                Ok(Recorded::Income(created))
            }
            NewTransaction::Expense(expense) => {
                let created = self.ledger.create_expense(&expense).await?;
                debug!(id = %created.id, "expense recorded");
                Ok(Recorded::Expense(created))
            }
        }
    }

    pub async fn update_income(&self, id: &str, update: &IncomeUpdate) -> Result<Income> {
        update.validate()?;
        self.ledger.update_income(id, update).await
    }

    pub async fn update_expense(&self, id: &str, update: &ExpenseUpdate) -> Result<Expense> {
        update.validate()?;
        self.ledger.update_expense(id, update).await
    }

    /// Totals, recent activity, and spending by category
    pub async fn summary(&self, recent_limit: usize) -> Result<DashboardSummary> {
        let incomes = collect_pages(|page| self.ledger.list_incomes(page)).await?;
        let expenses = collect_pages(|page| self.ledger.list_expenses(page)).await?;
        // Empty name lists every category
        let categories = self.categories.search_categories("").await?;

        Ok(DashboardSummary::build(
            &incomes,
            &expenses,
            &categories,
            recent_limit,
        ))
    }
}

async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: std::future::Future<Output = Result<Page<T>>>,
{
    let mut request = PageRequest::default();
    let mut items = Vec::new();
    loop {
        let page = fetch(request).await?;
        let last = page.page >= page.total_pages || page.items.is_empty();
        items.extend(page.items);
        if last || request.page >= MAX_SUMMARY_PAGES {
            break;
        }
        request.page += 1;
    }
    Ok(items)
}

/// Category lookup for the entry form
pub struct CategoryService {
    categories: Arc<dyn CategoryApi>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryApi>) -> Self {
        Self { categories }
    }

    /// Search by name; a blank query returns nothing without a request
    pub async fn search(&self, name: &str) -> Result<Vec<Category>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }
        self.categories.search_categories(name).await
    }
}
