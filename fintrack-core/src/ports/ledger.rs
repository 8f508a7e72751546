//! Ledger and category ports - the finance API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::domain::{Category, Expense, ExpenseUpdate, Income, IncomeUpdate, NewExpense, NewIncome};

/// Page selector for list endpoints (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 50 }
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// Income and expense records of the signed-in user
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn create_income(&self, income: &NewIncome) -> Result<Income>;

    async fn update_income(&self, id: &str, update: &IncomeUpdate) -> Result<Income>;

    async fn list_incomes(&self, page: PageRequest) -> Result<Page<Income>>;

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense>;

    async fn update_expense(&self, id: &str, update: &ExpenseUpdate) -> Result<Expense>;

    async fn list_expenses(&self, page: PageRequest) -> Result<Page<Expense>>;
}

/// Category lookup
#[async_trait]
pub trait CategoryApi: Send + Sync {
    /// Categories whose name matches `name`
    async fn search_categories(&self, name: &str) -> Result<Vec<Category>>;
}
