// CashTrackr API library
// Decision: Router assembly lives in the library so integration tests drive the real app

pub mod api;
pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod openapi;
pub mod rate_limit;
pub mod services;
pub mod telemetry;

use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, middleware, routing::get, Json, Router};
use cashtrackr_storage::StorageBackend;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api::budgets::BudgetsState;
use crate::auth::{AccountState, AuthState};
use crate::config::AppConfig;
use crate::email::Mailer;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::services::{BudgetService, ExpenseService};

/// Everything the router needs, built once at start-up
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<StorageBackend>,
    pub auth: AuthState,
    pub mailer: Arc<dyn Mailer>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Allowed CORS origin; None disables the CORS layer
    pub cors_origin: Option<String>,
}

impl AppState {
    pub fn new(config: &AppConfig, db: Arc<StorageBackend>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            auth: AuthState::new(config.jwt.clone(), db.clone()),
            db,
            mailer,
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
            cors_origin: Some(config.email.frontend_url.clone()),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

async fn health(State(db): State<Arc<StorageBackend>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: db.kind(),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

/// Build the complete HTTP application
pub fn app(state: AppState) -> Router {
    let account_state = AccountState {
        auth: state.auth.clone(),
        mailer: state.mailer.clone(),
    };
    let budgets_state = BudgetsState {
        budgets: Arc::new(BudgetService::new(state.db.clone())),
        expenses: Arc::new(ExpenseService::new(state.db.clone())),
        auth: state.auth.clone(),
    };

    // Rate limit applies to account routes only
    let account_routes = auth::routes(account_state).route_layer(middleware::from_fn_with_state(
        state.rate_limiter.clone(),
        rate_limit_middleware,
    ));

    let app = Router::new()
        .route("/health", get(health).with_state(state.db.clone()))
        .route("/api-doc/openapi.json", get(openapi_json))
        .merge(account_routes)
        .merge(api::budgets::routes(budgets_state.clone()))
        .merge(api::expenses::routes(budgets_state));

    let app = match state.cors_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]),
        ),
        Some(Err(e)) => {
            tracing::warn!("Ignoring invalid CORS origin: {}", e);
            app
        }
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
}
