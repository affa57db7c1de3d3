// API error type
// Decision: One enum for every short-circuit in the request pipeline
// Decision: Validation failures carry a list of field errors; everything else a single message

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::common::ErrorResponse;
use crate::api::validation::FieldError;

/// Generic message for unexpected failures; the cause is only logged
pub const INTERNAL_ERROR_MESSAGE: &str = "Hubo un error";

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed ({} field errors)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("too many requests: {0}")]
    TooManyRequests(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(message: &str) -> Self {
        Self::Unauthorized(message.to_string())
    }

    pub fn forbidden(message: &str) -> Self {
        Self::Forbidden(message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        Self::NotFound(message.to_string())
    }

    pub fn conflict(message: &str) -> Self {
        Self::Conflict(message.to_string())
    }

    pub fn internal(message: &str) -> Self {
        Self::Internal(message.to_string())
    }

    /// Log an unexpected failure and hide it behind `message`
    pub fn from_failure(context: &str, error: impl std::fmt::Display, message: &str) -> Self {
        tracing::error!("{}: {}", context, error);
        Self::internal(message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body of a 400 validation response
#[derive(Debug, Serialize)]
struct ValidationErrorBody {
    errors: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(errors) => (status, Json(ValidationErrorBody { errors })).into_response(),
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::TooManyRequests(message)
            | Self::Internal(message) => (status, Json(ErrorResponse::new(message))).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::validation::Location;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_single_message_body() {
        let response = ApiError::not_found("Presupuesto no encontrado").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Presupuesto no encontrado" }));
    }

    #[tokio::test]
    async fn test_validation_body() {
        let error = FieldError::new("budgetId", Location::Params, "Id no Valido", None);
        let response = ApiError::Validation(vec![error]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["msg"], "Id no Valido");
        assert_eq!(errors[0]["path"], "budgetId");
        assert_eq!(errors[0]["location"], "params");
    }

    #[test]
    fn test_from_failure_hides_cause() {
        let error = ApiError::from_failure("Failed to load budget", "connection reset", "Hubo un error");
        match error {
            ApiError::Internal(message) => assert_eq!(message, "Hubo un error"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
