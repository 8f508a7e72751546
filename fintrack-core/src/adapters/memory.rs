//! In-memory adapters
//!
//! Back demo mode and tests. They honor the same contracts as the HTTP
//! adapters, including validation on the "server" side of updates.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Category, Expense, ExpenseUpdate, Identity, Income, IncomeUpdate, NewExpense, NewIncome,
};
use crate::ports::{CategoryApi, IdentityProvider, LedgerApi, Page, PageRequest};

/// What the next identity fetch will produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityOutcome {
    SignedIn(Identity),
    /// Server answered 401
    Unauthorized,
    /// Server could not be reached
    Unreachable,
}

/// Identity provider with a switchable outcome and a call counter
#[derive(Debug)]
pub struct InMemoryIdentityProvider {
    outcome: Mutex<IdentityOutcome>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl InMemoryIdentityProvider {
    pub fn new(outcome: IdentityOutcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self::new(IdentityOutcome::SignedIn(identity))
    }

    pub fn signed_out() -> Self {
        Self::new(IdentityOutcome::Unauthorized)
    }

    /// Hold every fetch for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_outcome(&self, outcome: IdentityOutcome) {
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
    }

    /// Number of fetches started so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn fetch_current_identity(&self) -> Result<Identity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match outcome {
            IdentityOutcome::SignedIn(identity) => Ok(identity),
            IdentityOutcome::Unauthorized => Err(Error::Unauthorized),
            IdentityOutcome::Unreachable => {
                Err(Error::Transport("connection timed out".to_string()))
            }
        }
    }
}

#[derive(Debug, Default)]
struct LedgerData {
    incomes: Vec<Income>,
    expenses: Vec<Expense>,
}

/// Ledger and category store for a single user
#[derive(Debug)]
pub struct InMemoryLedger {
    user_id: String,
    data: Mutex<LedgerData>,
    categories: Vec<Category>,
    category_searches: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            data: Mutex::new(LedgerData::default()),
            categories: Vec::new(),
            category_searches: AtomicUsize::new(0),
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Insert existing records as-is
    pub fn with_records(self, incomes: Vec<Income>, expenses: Vec<Expense>) -> Self {
        {
            let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
            data.incomes.extend(incomes);
            data.expenses.extend(expenses);
        }
        self
    }

    pub fn category_search_count(&self) -> usize {
        self.category_searches.load(Ordering::SeqCst)
    }
}

fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let limit = request.limit.max(1);
    let page = request.page.max(1);
    let total = items.len();
    let start = ((page - 1) as usize).saturating_mul(limit as usize);
    let page_items = items.iter().skip(start).take(limit as usize).cloned().collect();

    Page {
        items: page_items,
        total: total as u64,
        page,
        limit,
        total_pages: total.div_ceil(limit as usize) as u32,
    }
}

#[async_trait]
impl LedgerApi for InMemoryLedger {
    async fn create_income(&self, income: &NewIncome) -> Result<Income> {
        income.validate()?;
        let now = Utc::now();
        let created = Income {
            id: Uuid::new_v4().to_string(),
            name: income.name.clone(),
            amount: income.amount,
            description: income.description.clone(),
            source: income.source.clone(),
            date: income.date,
            user_id: self.user_id.clone(),
            category_ids: income.category_ids.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .incomes
            .push(created.clone());
        Ok(created)
    }

    async fn update_income(&self, id: &str, update: &IncomeUpdate) -> Result<Income> {
        update.validate()?;
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let income = data
            .incomes
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::not_found(format!("income {}", id)))?;

        if let Some(name) = &update.name {
            income.name = name.clone();
        }
        if let Some(amount) = update.amount {
            income.amount = amount;
        }
        if let Some(description) = &update.description {
            income.description = description.clone();
        }
        if let Some(source) = &update.source {
            income.source = Some(source.clone());
        }
        if let Some(date) = update.date {
            income.date = date;
        }
        income
            .category_ids
            .retain(|c| !update.removed_category_ids.contains(c));
        for added in &update.added_category_ids {
            if !income.category_ids.contains(added) {
                income.category_ids.push(added.clone());
            }
        }
        income.updated_at = Some(Utc::now());
        Ok(income.clone())
    }

    async fn list_incomes(&self, page: PageRequest) -> Result<Page<Income>> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(paginate(&data.incomes, page))
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense> {
        expense.validate()?;
        let now = Utc::now();
        let created = Expense {
            id: Uuid::new_v4().to_string(),
            name: expense.name.clone(),
            amount: expense.amount,
            description: expense.description.clone(),
            date: expense.date,
            user_id: self.user_id.clone(),
            category_id: expense.category_ids.first().cloned(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .expenses
            .push(created.clone());
        Ok(created)
    }

    async fn update_expense(&self, id: &str, update: &ExpenseUpdate) -> Result<Expense> {
        update.validate()?;
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let expense = data
            .expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::not_found(format!("expense {}", id)))?;

        if let Some(name) = &update.name {
            expense.name = name.clone();
        }
        if let Some(amount) = update.amount {
            expense.amount = amount;
        }
        if let Some(description) = &update.description {
            expense.description = description.clone();
        }
        if let Some(date) = update.date {
            expense.date = date;
        }
        // Expenses hold a single category
        if let Some(current) = &expense.category_id {
            if update.removed_category_ids.contains(current) {
                expense.category_id = None;
            }
        }
        if let Some(added) = update.added_category_ids.first() {
            expense.category_id = Some(added.clone());
        }
        expense.updated_at = Some(Utc::now());
        Ok(expense.clone())
    }

    async fn list_expenses(&self, page: PageRequest) -> Result<Page<Expense>> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(paginate(&data.expenses, page))
    }
}

#[async_trait]
impl CategoryApi for InMemoryLedger {
    async fn search_categories(&self, name: &str) -> Result<Vec<Category>> {
        self.category_searches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .categories
            .iter()
            .filter(|c| c.matches(name))
            .cloned()
            .collect())
    }
}
