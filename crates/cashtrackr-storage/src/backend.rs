// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// StorageBackend picks PostgreSQL (production) or in-memory (dev mode) once at
// start-up and forwards every repository call to it.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::memory::InMemoryDatabase;
use crate::models::*;
use crate::postgres::PgDatabase;
use crate::repositories::{BudgetRepository, ExpenseRepository, UserRepository};

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(PgDatabase),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Connect to PostgreSQL and run migrations
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = PgDatabase::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an empty in-memory backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Short backend name for health checks and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory(_) => "memory",
        }
    }
}

// ============================================
// Users
// ============================================

#[async_trait]
impl UserRepository for StorageBackend {
    async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_token(token).await,
            Self::InMemory(db) => db.get_user_by_token(token).await,
        }
    }

    async fn update_user(&self, id: i64, input: UpdateUser) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.update_user(id, input).await,
            Self::InMemory(db) => db.update_user(id, input).await,
        }
    }
}

// ============================================
// Budgets
// ============================================

#[async_trait]
impl BudgetRepository for StorageBackend {
    async fn create_budget(&self, input: CreateBudgetRow) -> Result<BudgetRow> {
        match self {
            Self::Postgres(db) => db.create_budget(input).await,
            Self::InMemory(db) => db.create_budget(input).await,
        }
    }

    async fn get_budget(&self, id: i64) -> Result<Option<BudgetRow>> {
        match self {
            Self::Postgres(db) => db.get_budget(id).await,
            Self::InMemory(db) => db.get_budget(id).await,
        }
    }

    async fn list_budgets_for_user(&self, user_id: i64) -> Result<Vec<BudgetRow>> {
        match self {
            Self::Postgres(db) => db.list_budgets_for_user(user_id).await,
            Self::InMemory(db) => db.list_budgets_for_user(user_id).await,
        }
    }

    async fn update_budget(&self, id: i64, input: UpdateBudget) -> Result<Option<BudgetRow>> {
        match self {
            Self::Postgres(db) => db.update_budget(id, input).await,
            Self::InMemory(db) => db.update_budget(id, input).await,
        }
    }

    async fn delete_budget(&self, id: i64) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_budget(id).await,
            Self::InMemory(db) => db.delete_budget(id).await,
        }
    }
}

// ============================================
// Expenses
// ============================================

#[async_trait]
impl ExpenseRepository for StorageBackend {
    async fn create_expense(&self, input: CreateExpenseRow) -> Result<ExpenseRow> {
        match self {
            Self::Postgres(db) => db.create_expense(input).await,
            Self::InMemory(db) => db.create_expense(input).await,
        }
    }

    async fn get_expense(&self, id: i64) -> Result<Option<ExpenseRow>> {
        match self {
            Self::Postgres(db) => db.get_expense(id).await,
            Self::InMemory(db) => db.get_expense(id).await,
        }
    }

    async fn list_expenses_for_budget(&self, budget_id: i64) -> Result<Vec<ExpenseRow>> {
        match self {
            Self::Postgres(db) => db.list_expenses_for_budget(budget_id).await,
            Self::InMemory(db) => db.list_expenses_for_budget(budget_id).await,
        }
    }

    async fn update_expense(&self, id: i64, input: UpdateExpense) -> Result<Option<ExpenseRow>> {
        match self {
            Self::Postgres(db) => db.update_expense(id, input).await,
            Self::InMemory(db) => db.update_expense(id, input).await,
        }
    }

    async fn delete_expense(&self, id: i64) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_expense(id).await,
            Self::InMemory(db) => db.delete_expense(id).await,
        }
    }
}
