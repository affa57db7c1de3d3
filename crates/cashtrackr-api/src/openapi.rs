// OpenAPI document generation
//
// Served at /api-doc/openapi.json.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::{self, budgets, common, expenses, validation};
use crate::auth::{self, CurrentUser};

/// Registers the bearer session token scheme
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation for the CashTrackr API
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::create_account,
        auth::routes::confirm_account,
        auth::routes::login,
        auth::routes::forgot_password,
        auth::routes::validate_token,
        auth::routes::reset_password,
        auth::routes::get_user,
        auth::routes::update_user,
        auth::routes::update_password,
        auth::routes::check_password,
        api::budgets::list_budgets,
        api::budgets::create_budget,
        api::budgets::get_budget,
        api::budgets::update_budget,
        api::budgets::delete_budget,
        api::expenses::create_expense,
        api::expenses::get_expense,
        api::expenses::update_expense,
        api::expenses::delete_expense,
    ),
    components(
        schemas(
            budgets::Budget,
            budgets::BudgetWithExpenses,
            expenses::Expense,
            common::ErrorResponse,
            common::MessageResponse,
            validation::FieldError,
            validation::Location,
            validation::BudgetInput,
            validation::ExpenseInput,
            validation::CreateAccountInput,
            validation::TokenInput,
            validation::LoginInput,
            validation::EmailInput,
            validation::NewPasswordInput,
            validation::UpdateProfileInput,
            validation::UpdatePasswordInput,
            validation::CheckPasswordInput,
            CurrentUser,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Account registration, confirmation and sessions"),
        (name = "budgets", description = "Budgets owned by the caller"),
        (name = "expenses", description = "Expenses inside a budget")
    ),
    info(
        title = "CashTrackr API",
        description = "Personal budgets and expenses",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/auth/create-account"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/budgets/{budgetId}"));
        assert!(paths
            .iter()
            .any(|p| p.as_str() == "/api/budgets/{budgetId}/expenses/{expenseId}"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
