// Budget service for business logic

use anyhow::Result;
use cashtrackr_storage::{
    BudgetRepository, BudgetRow, CreateBudgetRow, ExpenseRepository, StorageBackend, UpdateBudget,
};
use std::sync::Arc;

use crate::api::budgets::{Budget, BudgetWithExpenses};
use crate::api::expenses::Expense;
use crate::api::validation::BudgetInput;

pub struct BudgetService {
    db: Arc<StorageBackend>,
}

impl BudgetService {
    pub fn new(db: Arc<StorageBackend>) -> Self {
        Self { db }
    }

    /// Budgets owned by `user_id`, newest first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Budget>> {
        let rows = self.db.list_budgets_for_user(user_id).await?;
        Ok(rows.into_iter().map(Budget::from).collect())
    }

    pub async fn create(&self, user_id: i64, input: BudgetInput) -> Result<Budget> {
        let row = self
            .db
            .create_budget(CreateBudgetRow {
                name: input.name,
                amount: input.amount,
                user_id,
            })
            .await?;

        tracing::info!(budget_id = row.id, user_id, "Budget created");
        Ok(Budget::from(row))
    }

    /// Attach the budget's expenses, oldest first
    pub async fn with_expenses(&self, budget: BudgetRow) -> Result<BudgetWithExpenses> {
        let expenses = self
            .db
            .list_expenses_for_budget(budget.id)
            .await?
            .into_iter()
            .map(Expense::from)
            .collect();

        Ok(BudgetWithExpenses::new(budget, expenses))
    }

    pub async fn update(&self, id: i64, input: BudgetInput) -> Result<Option<Budget>> {
        let row = self
            .db
            .update_budget(
                id,
                UpdateBudget {
                    name: Some(input.name),
                    amount: Some(input.amount),
                },
            )
            .await?;

        Ok(row.map(Budget::from))
    }

    /// Delete a budget together with its expenses
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self.db.delete_budget(id).await?;
        if deleted {
            tracing::info!(budget_id = id, "Budget deleted");
        }
        Ok(deleted)
    }
}
