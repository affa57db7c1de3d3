// Resource guards for budget and expense routes
// Decision: Each stage is a plain function returning the enriched context or a short-circuit error
// Decision: Stages run in a fixed order: authenticate, id shape, existence, ownership
// Decision: Every "not your resource" denial is 401 Accion no Valida
//
// The extractors below compose the stages. Handlers take `BudgetAccess` or
// `ExpenseAccess` before any body extractor, so guards always run before input
// validation.

use axum::extract::{FromRef, FromRequestParts, Path};
use axum::http::request::Parts;
use cashtrackr_storage::{BudgetRepository, BudgetRow, ExpenseRepository, ExpenseRow};
use std::collections::HashMap;

use super::validation::parse_id_param;
use crate::auth::{AuthState, AuthUser, CurrentUser};
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};

pub const BUDGET_ID_PARAM: &str = "budgetId";
pub const EXPENSE_ID_PARAM: &str = "expenseId";

pub const BUDGET_ID_NOT_INT_MESSAGE: &str = "El ID del Presupuesto no es Valido";
pub const BUDGET_ID_NOT_POSITIVE_MESSAGE: &str = "Id no Valido";
pub const EXPENSE_ID_MESSAGE: &str = "ID no Valido";
pub const BUDGET_NOT_FOUND_MESSAGE: &str = "Presupuesto no encontrado";
pub const EXPENSE_NOT_FOUND_MESSAGE: &str = "Gasto no encontrado";
pub const ACCESS_DENIED_MESSAGE: &str = "Accion no Valida";

// =============================================================================
// Stages
// =============================================================================

/// Existence stage for budgets
pub async fn load_budget(budgets: &dyn BudgetRepository, id: i64) -> Result<BudgetRow, ApiError> {
    budgets
        .get_budget(id)
        .await
        .map_err(|e| ApiError::from_failure("Failed to load budget", e, INTERNAL_ERROR_MESSAGE))?
        .ok_or_else(|| ApiError::not_found(BUDGET_NOT_FOUND_MESSAGE))
}

/// Ownership stage: the budget must belong to the authenticated user
pub fn check_budget_owner<'a>(
    budget: &BudgetRow,
    auth: &'a AuthUser,
) -> Result<&'a CurrentUser, ApiError> {
    match auth.user.as_ref() {
        Some(user) if user.id == budget.user_id => Ok(user),
        _ => Err(ApiError::unauthorized(ACCESS_DENIED_MESSAGE)),
    }
}

/// Existence stage for expenses
pub async fn load_expense(
    expenses: &dyn ExpenseRepository,
    id: i64,
) -> Result<ExpenseRow, ApiError> {
    expenses
        .get_expense(id)
        .await
        .map_err(|e| ApiError::from_failure("Failed to load expense", e, INTERNAL_ERROR_MESSAGE))?
        .ok_or_else(|| ApiError::not_found(EXPENSE_NOT_FOUND_MESSAGE))
}

/// Consistency stage: the expense must sit in the guarded budget
pub fn check_expense_in_budget(expense: &ExpenseRow, budget: &BudgetRow) -> Result<(), ApiError> {
    if expense.budget_id == budget.id {
        Ok(())
    } else {
        Err(ApiError::unauthorized(ACCESS_DENIED_MESSAGE))
    }
}

async fn path_param<S>(parts: &mut Parts, state: &S, name: &str) -> Result<String, ApiError>
where
    S: Send + Sync,
{
    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;

    params
        .get(name)
        .cloned()
        .ok_or_else(|| ApiError::BadRequest(format!("Missing path parameter {}", name)))
}

// =============================================================================
// Extractors
// =============================================================================

/// A budget the caller owns, loaded from `:budgetId`
#[derive(Debug, Clone)]
pub struct BudgetAccess {
    pub user: CurrentUser,
    pub budget: BudgetRow,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for BudgetAccess
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(access) = parts.extensions.get::<BudgetAccess>() {
            return Ok(access.clone());
        }

        let auth = AuthUser::from_request_parts(parts, state).await?;
        let raw = path_param(parts, state, BUDGET_ID_PARAM).await?;
        let budget_id = parse_id_param(
            &raw,
            BUDGET_ID_PARAM,
            BUDGET_ID_NOT_INT_MESSAGE,
            BUDGET_ID_NOT_POSITIVE_MESSAGE,
        )?;

        let auth_state = AuthState::from_ref(state);
        let budget = load_budget(auth_state.db.as_ref(), budget_id).await?;
        let user = check_budget_owner(&budget, &auth)?.clone();

        let access = BudgetAccess { user, budget };
        parts.extensions.insert(access.clone());
        Ok(access)
    }
}

/// An expense reached through a budget the caller owns, loaded from `:expenseId`
#[derive(Debug, Clone)]
pub struct ExpenseAccess {
    pub user: CurrentUser,
    pub budget: BudgetRow,
    pub expense: ExpenseRow,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ExpenseAccess
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BudgetAccess { user, budget } = BudgetAccess::from_request_parts(parts, state).await?;

        let raw = path_param(parts, state, EXPENSE_ID_PARAM).await?;
        let expense_id =
            parse_id_param(&raw, EXPENSE_ID_PARAM, EXPENSE_ID_MESSAGE, EXPENSE_ID_MESSAGE)?;

        let auth_state = AuthState::from_ref(state);
        let expense = load_expense(auth_state.db.as_ref(), expense_id).await?;
        check_expense_in_budget(&expense, &budget)?;

        Ok(ExpenseAccess {
            user,
            budget,
            expense,
        })
    }
}
