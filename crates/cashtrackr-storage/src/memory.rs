// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: Ids come from per-table counters, mirroring BIGSERIAL
//
// This implementation mirrors the PostgreSQL constraints the handlers rely on
// (unique email, cascading budget deletes) so the API behaves the same without
// a database.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::models::*;
use crate::repositories::{BudgetRepository, ExpenseRepository, UserRepository};

/// In-memory database for dev mode and tests.
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<BTreeMap<i64, UserRow>>,
    budgets: RwLock<BTreeMap<i64, BudgetRow>>,
    expenses: RwLock<BTreeMap<i64, ExpenseRow>>,
    user_seq: AtomicI64,
    budget_seq: AtomicI64,
    expense_seq: AtomicI64,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn next_id(seq: &AtomicI64) -> i64 {
        seq.fetch_add(1, Ordering::SeqCst) + 1
    }
}

// ============================================
// Users
// ============================================

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == input.email) {
            bail!("duplicate key value violates unique constraint \"users_email_key\"");
        }

        let now = Self::now();
        let id = Self::next_id(&self.user_seq);
        let row = UserRow {
            id,
            name: input.name,
            email: input.email,
            password: input.password,
            token: input.token,
            confirm: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, row.clone());
        Ok(row)
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_user(&self, id: i64, input: UpdateUser) -> Result<Option<UserRow>> {
        let mut users = self.users.write();
        if let Some(email) = &input.email {
            if users.values().any(|u| u.id != id && &u.email == email) {
                bail!("duplicate key value violates unique constraint \"users_email_key\"");
            }
        }

        if let Some(user) = users.get_mut(&id) {
            if let Some(name) = input.name {
                user.name = name;
            }
            if let Some(email) = input.email {
                user.email = email;
            }
            if let Some(password) = input.password {
                user.password = password;
            }
            if let Some(token) = input.token {
                user.token = token;
            }
            if let Some(confirm) = input.confirm {
                user.confirm = confirm;
            }
            user.updated_at = Self::now();
            return Ok(Some(user.clone()));
        }
        Ok(None)
    }
}

// ============================================
// Budgets
// ============================================

#[async_trait]
impl BudgetRepository for InMemoryDatabase {
    async fn create_budget(&self, input: CreateBudgetRow) -> Result<BudgetRow> {
        if !self.users.read().contains_key(&input.user_id) {
            bail!("insert on table \"budgets\" violates foreign key constraint on user_id");
        }

        let now = Self::now();
        let id = Self::next_id(&self.budget_seq);
        let row = BudgetRow {
            id,
            name: input.name,
            amount: input.amount,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };
        self.budgets.write().insert(id, row.clone());
        Ok(row)
    }

    async fn get_budget(&self, id: i64) -> Result<Option<BudgetRow>> {
        Ok(self.budgets.read().get(&id).cloned())
    }

    async fn list_budgets_for_user(&self, user_id: i64) -> Result<Vec<BudgetRow>> {
        let budgets = self.budgets.read();
        let mut result: Vec<_> = budgets
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn update_budget(&self, id: i64, input: UpdateBudget) -> Result<Option<BudgetRow>> {
        let mut budgets = self.budgets.write();
        if let Some(budget) = budgets.get_mut(&id) {
            if let Some(name) = input.name {
                budget.name = name;
            }
            if let Some(amount) = input.amount {
                budget.amount = amount;
            }
            budget.updated_at = Self::now();
            return Ok(Some(budget.clone()));
        }
        Ok(None)
    }

    async fn delete_budget(&self, id: i64) -> Result<bool> {
        let removed = self.budgets.write().remove(&id).is_some();
        if removed {
            self.expenses.write().retain(|_, e| e.budget_id != id);
        }
        Ok(removed)
    }
}

// ============================================
// Expenses
// ============================================

#[async_trait]
impl ExpenseRepository for InMemoryDatabase {
    async fn create_expense(&self, input: CreateExpenseRow) -> Result<ExpenseRow> {
        if !self.budgets.read().contains_key(&input.budget_id) {
            bail!("insert on table \"expenses\" violates foreign key constraint on budget_id");
        }

        let now = Self::now();
        let id = Self::next_id(&self.expense_seq);
        let row = ExpenseRow {
            id,
            name: input.name,
            amount: input.amount,
            budget_id: input.budget_id,
            created_at: now,
            updated_at: now,
        };
        self.expenses.write().insert(id, row.clone());
        Ok(row)
    }

    async fn get_expense(&self, id: i64) -> Result<Option<ExpenseRow>> {
        Ok(self.expenses.read().get(&id).cloned())
    }

    async fn list_expenses_for_budget(&self, budget_id: i64) -> Result<Vec<ExpenseRow>> {
        let expenses = self.expenses.read();
        let mut result: Vec<_> = expenses
            .values()
            .filter(|e| e.budget_id == budget_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn update_expense(&self, id: i64, input: UpdateExpense) -> Result<Option<ExpenseRow>> {
        let mut expenses = self.expenses.write();
        if let Some(expense) = expenses.get_mut(&id) {
            if let Some(name) = input.name {
                expense.name = name;
            }
            if let Some(amount) = input.amount {
                expense.amount = amount;
            }
            expense.updated_at = Self::now();
            return Ok(Some(expense.clone()));
        }
        Ok(None)
    }

    async fn delete_expense(&self, id: i64) -> Result<bool> {
        Ok(self.expenses.write().remove(&id).is_some())
    }
}
