// Expense service for business logic

use anyhow::Result;
use cashtrackr_storage::{CreateExpenseRow, ExpenseRepository, StorageBackend, UpdateExpense};
use std::sync::Arc;

use crate::api::expenses::Expense;
use crate::api::validation::ExpenseInput;

pub struct ExpenseService {
    db: Arc<StorageBackend>,
}

impl ExpenseService {
    pub fn new(db: Arc<StorageBackend>) -> Self {
        Self { db }
    }

    pub async fn create(&self, budget_id: i64, input: ExpenseInput) -> Result<Expense> {
        let row = self
            .db
            .create_expense(CreateExpenseRow {
                name: input.name,
                amount: input.amount,
                budget_id,
            })
            .await?;

        tracing::info!(expense_id = row.id, budget_id, "Expense created");
        Ok(Expense::from(row))
    }

    pub async fn update(&self, id: i64, input: ExpenseInput) -> Result<Option<Expense>> {
        let row = self
            .db
            .update_expense(
                id,
                UpdateExpense {
                    name: Some(input.name),
                    amount: Some(input.amount),
                },
            )
            .await?;

        Ok(row.map(Expense::from))
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.db.delete_expense(id).await
    }
}
