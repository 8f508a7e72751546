//! Finance API client - incomes, expenses, categories

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::domain::result::Result;
use crate::domain::{
    Category, Expense, ExpenseUpdate, Income, IncomeUpdate, NewExpense, NewIncome,
};
use crate::ports::{CategoryApi, LedgerApi, Page, PageRequest};

use super::api_client::{ApiClient, Envelope};

#[derive(Debug, Deserialize)]
struct IncomeData {
    income: Income,
}

#[derive(Debug, Deserialize)]
struct ExpenseData {
    expense: Expense,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeList {
    incomes: Vec<Income>,
    total: u64,
    page: u32,
    limit: u32,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseList {
    expenses: Vec<Expense>,
    total: u64,
    page: u32,
    limit: u32,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct CategoryList {
    categories: Vec<Category>,
}

/// HTTP implementation of [`LedgerApi`] and [`CategoryApi`]
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    api: Arc<ApiClient>,
}

impl HttpLedgerClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl LedgerApi for HttpLedgerClient {
    async fn create_income(&self, income: &NewIncome) -> Result<Income> {
        let envelope: Envelope<IncomeData> =
            self.api.send_json(Method::POST, &["incomes"], income).await?;
        Ok(envelope.into_data()?.income)
    }

    async fn update_income(&self, id: &str, update: &IncomeUpdate) -> Result<Income> {
        let envelope: Envelope<IncomeData> =
            self.api.send_json(Method::PUT, &["incomes", id], update).await?;
        Ok(envelope.into_data()?.income)
    }

    async fn list_incomes(&self, page: PageRequest) -> Result<Page<Income>> {
        let envelope: Envelope<IncomeList> =
            self.api.get_with_query(&["incomes"], &page).await?;
        let list = envelope.into_data()?;
        Ok(Page {
            items: list.incomes,
            total: list.total,
            page: list.page,
            limit: list.limit,
            total_pages: list.total_pages,
        })
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense> {
        let envelope: Envelope<ExpenseData> =
            self.api.send_json(Method::POST, &["expenses"], expense).await?;
        Ok(envelope.into_data()?.expense)
    }

    async fn update_expense(&self, id: &str, update: &ExpenseUpdate) -> Result<Expense> {
        let envelope: Envelope<ExpenseData> =
            self.api.send_json(Method::PUT, &["expenses", id], update).await?;
        Ok(envelope.into_data()?.expense)
    }

    async fn list_expenses(&self, page: PageRequest) -> Result<Page<Expense>> {
        let envelope: Envelope<ExpenseList> =
            self.api.get_with_query(&["expenses"], &page).await?;
        let list = envelope.into_data()?;
        Ok(Page {
            items: list.expenses,
            total: list.total,
            page: list.page,
            limit: list.limit,
            total_pages: list.total_pages,
        })
    }
}

#[async_trait]
impl CategoryApi for HttpLedgerClient {
    async fn search_categories(&self, name: &str) -> Result<Vec<Category>> {
        let envelope: Envelope<CategoryList> = self
            .api
            .get_with_query(&["categories"], &[("name", name)])
            .await?;
        Ok(envelope.into_data()?.categories)
    }
}
