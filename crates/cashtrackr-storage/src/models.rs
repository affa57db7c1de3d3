// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2id hash, never the plain password
    pub password: String,
    /// Pending confirmation or password-reset code
    pub token: Option<String>,
    pub confirm: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub name: String,
    pub email: String,
    pub password: String,
    pub token: Option<String>,
}

/// Partial user update. `token: Some(None)` clears the stored token.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub token: Option<Option<String>>,
    pub confirm: Option<bool>,
}

// ============================================
// Budgets
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct BudgetRow {
    pub id: i64,
    pub name: String,
    pub amount: Decimal,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateBudgetRow {
    pub name: String,
    pub amount: Decimal,
    pub user_id: i64,
}

/// `user_id` is fixed at creation and cannot be updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateBudget {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
}

// ============================================
// Expenses
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ExpenseRow {
    pub id: i64,
    pub name: String,
    pub amount: Decimal,
    pub budget_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateExpenseRow {
    pub name: String,
    pub amount: Decimal,
    pub budget_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateExpense {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
}
