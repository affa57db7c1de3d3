// PostgreSQL repositories (sqlx)
// Decision: Runtime-checked queries (query_as) so the crate builds without a live database
// Decision: Cascades are enforced by foreign keys, not by application code

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::*;
use crate::repositories::{BudgetRepository, ExpenseRepository, UserRepository};

const USER_COLUMNS: &str = "id, name, email, password, token, confirm, created_at, updated_at";
const BUDGET_COLUMNS: &str = "id, name, amount, user_id, created_at, updated_at";
const EXPENSE_COLUMNS: &str = "id, name, amount, budget_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self { pool })
    }
}

// ============================================
// Users
// ============================================

#[async_trait]
impl UserRepository for PgDatabase {
    async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let sql = format!(
            "INSERT INTO users (name, email, password, token) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password)
            .bind(&input.token)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE token = $1 LIMIT 1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn update_user(&self, id: i64, input: UpdateUser) -> Result<Option<UserRow>> {
        let (set_token, token) = match input.token {
            Some(token) => (true, token),
            None => (false, None),
        };

        let sql = format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password = COALESCE($4, password),
                token = CASE WHEN $5 THEN $6::VARCHAR ELSE token END,
                confirm = COALESCE($7, confirm),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password)
            .bind(set_token)
            .bind(&token)
            .bind(input.confirm)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}

// ============================================
// Budgets
// ============================================

#[async_trait]
impl BudgetRepository for PgDatabase {
    async fn create_budget(&self, input: CreateBudgetRow) -> Result<BudgetRow> {
        let sql = format!(
            "INSERT INTO budgets (name, amount, user_id) VALUES ($1, $2, $3) RETURNING {BUDGET_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BudgetRow>(&sql)
            .bind(&input.name)
            .bind(input.amount)
            .bind(input.user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn get_budget(&self, id: i64) -> Result<Option<BudgetRow>> {
        let sql = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = $1");
        let row = sqlx::query_as::<_, BudgetRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_budgets_for_user(&self, user_id: i64) -> Result<Vec<BudgetRow>> {
        let sql = format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, BudgetRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn update_budget(&self, id: i64, input: UpdateBudget) -> Result<Option<BudgetRow>> {
        let sql = format!(
            r#"
            UPDATE budgets
            SET
                name = COALESCE($2, name),
                amount = COALESCE($3, amount),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BUDGET_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, BudgetRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.amount)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete_budget(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================
// Expenses
// ============================================

#[async_trait]
impl ExpenseRepository for PgDatabase {
    async fn create_expense(&self, input: CreateExpenseRow) -> Result<ExpenseRow> {
        let sql = format!(
            "INSERT INTO expenses (name, amount, budget_id) VALUES ($1, $2, $3) RETURNING {EXPENSE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(&input.name)
            .bind(input.amount)
            .bind(input.budget_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn get_expense(&self, id: i64) -> Result<Option<ExpenseRow>> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1");
        let row = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_expenses_for_budget(&self, budget_id: i64) -> Result<Vec<ExpenseRow>> {
        let sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE budget_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(budget_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn update_expense(&self, id: i64, input: UpdateExpense) -> Result<Option<ExpenseRow>> {
        let sql = format!(
            r#"
            UPDATE expenses
            SET
                name = COALESCE($2, name),
                amount = COALESCE($3, amount),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EXPENSE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.amount)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete_expense(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
