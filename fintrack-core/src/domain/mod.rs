//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O.

mod category;
pub mod dashboard;
mod identity;
pub mod navigation;
pub mod result;
mod session;
mod transaction;

pub use category::Category;
pub use dashboard::{CategorySpend, DashboardSummary, DashboardTransaction};
pub use identity::{Currency, Identity};
pub use navigation::{GuardDecision, NavigationIntent};
pub use session::SessionState;
pub use transaction::{
    Expense, ExpenseUpdate, Income, IncomeUpdate, NewExpense, NewIncome, NewTransaction,
    TransactionDraft, TransactionKind,
};
