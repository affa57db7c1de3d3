// Expense HTTP routes, nested under a budget
// Decision: Expenses are only reachable through a budget the caller owns

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use cashtrackr_storage::ExpenseRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::budgets::BudgetsState;
use super::common::{ErrorResponse, MessageResponse};
use super::guards::{BudgetAccess, ExpenseAccess, EXPENSE_NOT_FOUND_MESSAGE};
use super::validation::{ExpenseInput, Validated};
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};

/// A monetary entry inside a budget
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    #[schema(example = "Hotel")]
    pub name: String,
    /// Decimal amount, serialized as a string
    #[schema(value_type = String, example = "300.00")]
    pub amount: Decimal,
    pub budget_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            amount: row.amount,
            budget_id: row.budget_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub const EXPENSE_CREATE_FAILED_MESSAGE: &str = "Error al crear el gasto";

/// Create expense routes
pub fn routes(state: BudgetsState) -> Router {
    Router::new()
        .route("/api/budgets/:budgetId/expenses", post(create_expense))
        .route(
            "/api/budgets/:budgetId/expenses/:expenseId",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .with_state(state)
}

/// POST /api/budgets/{budgetId}/expenses - Add an expense to a budget
#[utoipa::path(
    post,
    path = "/api/budgets/{budgetId}/expenses",
    params(
        ("budgetId" = i64, Path, description = "Budget ID")
    ),
    request_body = ExpenseInput,
    responses(
        (status = 201, description = "Expense created", body = MessageResponse),
        (status = 400, description = "Invalid budget ID or body"),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "expenses"
)]
pub async fn create_expense(
    State(state): State<BudgetsState>,
    access: BudgetAccess,
    Validated(input): Validated<ExpenseInput>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .expenses
        .create(access.budget.id, input)
        .await
        .map_err(|e| {
            ApiError::from_failure("Failed to create expense", e, EXPENSE_CREATE_FAILED_MESSAGE)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Gasto Agregado Correctamente")),
    ))
}

/// GET /api/budgets/{budgetId}/expenses/{expenseId} - Get one expense
#[utoipa::path(
    get,
    path = "/api/budgets/{budgetId}/expenses/{expenseId}",
    params(
        ("budgetId" = i64, Path, description = "Budget ID"),
        ("expenseId" = i64, Path, description = "Expense ID")
    ),
    responses(
        (status = 200, description = "Expense found", body = Expense),
        (status = 400, description = "Invalid ID"),
        (status = 401, description = "Not authenticated, not the owner, or not in this budget", body = ErrorResponse),
        (status = 404, description = "Budget or expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "expenses"
)]
pub async fn get_expense(access: ExpenseAccess) -> Json<Expense> {
    Json(Expense::from(access.expense))
}

/// PUT /api/budgets/{budgetId}/expenses/{expenseId} - Replace an expense's name and amount
#[utoipa::path(
    put,
    path = "/api/budgets/{budgetId}/expenses/{expenseId}",
    params(
        ("budgetId" = i64, Path, description = "Budget ID"),
        ("expenseId" = i64, Path, description = "Expense ID")
    ),
    request_body = ExpenseInput,
    responses(
        (status = 200, description = "Expense updated", body = MessageResponse),
        (status = 400, description = "Invalid ID or body"),
        (status = 401, description = "Not authenticated, not the owner, or not in this budget", body = ErrorResponse),
        (status = 404, description = "Budget or expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "expenses"
)]
pub async fn update_expense(
    State(state): State<BudgetsState>,
    access: ExpenseAccess,
    Validated(input): Validated<ExpenseInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .expenses
        .update(access.expense.id, input)
        .await
        .map_err(|e| ApiError::from_failure("Failed to update expense", e, INTERNAL_ERROR_MESSAGE))?
        .ok_or_else(|| ApiError::not_found(EXPENSE_NOT_FOUND_MESSAGE))?;

    Ok(Json(MessageResponse::new("Se actualizo Correctamente el gasto")))
}

/// DELETE /api/budgets/{budgetId}/expenses/{expenseId} - Delete an expense
#[utoipa::path(
    delete,
    path = "/api/budgets/{budgetId}/expenses/{expenseId}",
    params(
        ("budgetId" = i64, Path, description = "Budget ID"),
        ("expenseId" = i64, Path, description = "Expense ID")
    ),
    responses(
        (status = 200, description = "Expense deleted", body = MessageResponse),
        (status = 400, description = "Invalid ID"),
        (status = 401, description = "Not authenticated, not the owner, or not in this budget", body = ErrorResponse),
        (status = 404, description = "Budget or expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "expenses"
)]
pub async fn delete_expense(
    State(state): State<BudgetsState>,
    access: ExpenseAccess,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state
        .expenses
        .delete(access.expense.id)
        .await
        .map_err(|e| ApiError::from_failure("Failed to delete expense", e, INTERNAL_ERROR_MESSAGE))?;

    if !deleted {
        return Err(ApiError::not_found(EXPENSE_NOT_FOUND_MESSAGE));
    }

    Ok(Json(MessageResponse::new("Gasto eliminado")))
}
