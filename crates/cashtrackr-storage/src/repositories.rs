// Repository interfaces, one per entity
// Decision: Every backend (PostgreSQL, in-memory) implements the same three traits
// Decision: anyhow::Result everywhere; callers map failures to their own error type

use anyhow::Result;
use async_trait::async_trait;

use crate::models::*;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, input: CreateUserRow) -> Result<UserRow>;

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>>;

    /// Look up the user holding a pending confirmation/reset token
    async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRow>>;

    async fn update_user(&self, id: i64, input: UpdateUser) -> Result<Option<UserRow>>;
}

#[async_trait]
pub trait BudgetRepository: Send + Sync {
    async fn create_budget(&self, input: CreateBudgetRow) -> Result<BudgetRow>;

    async fn get_budget(&self, id: i64) -> Result<Option<BudgetRow>>;

    /// Budgets owned by `user_id`, newest first
    async fn list_budgets_for_user(&self, user_id: i64) -> Result<Vec<BudgetRow>>;

    async fn update_budget(&self, id: i64, input: UpdateBudget) -> Result<Option<BudgetRow>>;

    /// Deletes the budget and all of its expenses
    async fn delete_budget(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn create_expense(&self, input: CreateExpenseRow) -> Result<ExpenseRow>;

    async fn get_expense(&self, id: i64) -> Result<Option<ExpenseRow>>;

    /// Expenses of one budget, oldest first
    async fn list_expenses_for_budget(&self, budget_id: i64) -> Result<Vec<ExpenseRow>>;

    async fn update_expense(&self, id: i64, input: UpdateExpense) -> Result<Option<ExpenseRow>>;

    async fn delete_expense(&self, id: i64) -> Result<bool>;
}
