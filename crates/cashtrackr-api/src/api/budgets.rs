// Budget HTTP routes
// Decision: Every route runs authentication first; `:budgetId` routes then run the budget guard
// Decision: Budgets are listed per owner only, newest first

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use cashtrackr_storage::BudgetRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{ErrorResponse, MessageResponse};
use super::expenses::Expense;
use super::guards::BudgetAccess;
use super::validation::{BudgetInput, Validated};
use crate::auth::{AuthState, AuthUser};
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};
use crate::services::{BudgetService, ExpenseService};

/// A spending allocation owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    #[schema(example = "Vacaciones")]
    pub name: String,
    /// Decimal amount, serialized as a string
    #[schema(value_type = String, example = "4000.00")]
    pub amount: Decimal,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BudgetRow> for Budget {
    fn from(row: BudgetRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            amount: row.amount,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A budget together with its expenses
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetWithExpenses {
    pub id: i64,
    pub name: String,
    #[schema(value_type = String, example = "4000.00")]
    pub amount: Decimal,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expenses: Vec<Expense>,
}

impl BudgetWithExpenses {
    pub fn new(row: BudgetRow, expenses: Vec<Expense>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            amount: row.amount,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            expenses,
        }
    }
}

/// State for budget and expense routes
#[derive(Clone)]
pub struct BudgetsState {
    pub budgets: Arc<BudgetService>,
    pub expenses: Arc<ExpenseService>,
    pub auth: AuthState,
}

impl FromRef<BudgetsState> for AuthState {
    fn from_ref(input: &BudgetsState) -> Self {
        input.auth.clone()
    }
}

pub const BUDGET_CREATE_FAILED_MESSAGE: &str = "Error al crear el presupuesto";

/// Create budget routes
pub fn routes(state: BudgetsState) -> Router {
    Router::new()
        .route("/api/budgets", get(list_budgets).post(create_budget))
        .route(
            "/api/budgets/:budgetId",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
        .with_state(state)
}

/// GET /api/budgets - List the caller's budgets
#[utoipa::path(
    get,
    path = "/api/budgets",
    responses(
        (status = 200, description = "Budgets of the caller, newest first", body = Vec<Budget>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
pub async fn list_budgets(
    State(state): State<BudgetsState>,
    auth: AuthUser,
) -> Result<Json<Vec<Budget>>, ApiError> {
    let user = auth.require()?;
    let budgets = state
        .budgets
        .list_for_user(user.id)
        .await
        .map_err(|e| ApiError::from_failure("Failed to list budgets", e, INTERNAL_ERROR_MESSAGE))?;

    Ok(Json(budgets))
}

/// POST /api/budgets - Create a budget owned by the caller
#[utoipa::path(
    post,
    path = "/api/budgets",
    request_body = BudgetInput,
    responses(
        (status = 201, description = "Budget created", body = MessageResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
pub async fn create_budget(
    State(state): State<BudgetsState>,
    auth: AuthUser,
    Validated(input): Validated<BudgetInput>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let user = auth.require()?;
    state.budgets.create(user.id, input).await.map_err(|e| {
        ApiError::from_failure("Failed to create budget", e, BUDGET_CREATE_FAILED_MESSAGE)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Presupuesto Creado Correctamente")),
    ))
}

/// GET /api/budgets/{budgetId} - Get a budget with its expenses
#[utoipa::path(
    get,
    path = "/api/budgets/{budgetId}",
    params(
        ("budgetId" = i64, Path, description = "Budget ID")
    ),
    responses(
        (status = 200, description = "Budget found", body = BudgetWithExpenses),
        (status = 400, description = "Invalid budget ID"),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
pub async fn get_budget(
    State(state): State<BudgetsState>,
    access: BudgetAccess,
) -> Result<Json<BudgetWithExpenses>, ApiError> {
    let budget = state
        .budgets
        .with_expenses(access.budget)
        .await
        .map_err(|e| ApiError::from_failure("Failed to load expenses", e, INTERNAL_ERROR_MESSAGE))?;

    Ok(Json(budget))
}

/// PUT /api/budgets/{budgetId} - Replace a budget's name and amount
#[utoipa::path(
    put,
    path = "/api/budgets/{budgetId}",
    params(
        ("budgetId" = i64, Path, description = "Budget ID")
    ),
    request_body = BudgetInput,
    responses(
        (status = 200, description = "Budget updated", body = String),
        (status = 400, description = "Invalid budget ID or body"),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
pub async fn update_budget(
    State(state): State<BudgetsState>,
    access: BudgetAccess,
    Validated(input): Validated<BudgetInput>,
) -> Result<Json<&'static str>, ApiError> {
    state
        .budgets
        .update(access.budget.id, input)
        .await
        .map_err(|e| ApiError::from_failure("Failed to update budget", e, INTERNAL_ERROR_MESSAGE))?
        .ok_or_else(|| ApiError::not_found(super::guards::BUDGET_NOT_FOUND_MESSAGE))?;

    Ok(Json("Presupuesto Actualizado Correctamente"))
}

/// DELETE /api/budgets/{budgetId} - Delete a budget and its expenses
#[utoipa::path(
    delete,
    path = "/api/budgets/{budgetId}",
    params(
        ("budgetId" = i64, Path, description = "Budget ID")
    ),
    responses(
        (status = 200, description = "Budget deleted", body = String),
        (status = 400, description = "Invalid budget ID"),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
pub async fn delete_budget(
    State(state): State<BudgetsState>,
    access: BudgetAccess,
) -> Result<Json<&'static str>, ApiError> {
    let deleted = state
        .budgets
        .delete(access.budget.id)
        .await
        .map_err(|e| ApiError::from_failure("Failed to delete budget", e, INTERNAL_ERROR_MESSAGE))?;

    if !deleted {
        return Err(ApiError::not_found(super::guards::BUDGET_NOT_FOUND_MESSAGE));
    }

    Ok(Json("Presupuesto Eliminado Correctamente"))
}
