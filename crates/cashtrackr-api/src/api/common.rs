// Common DTOs for public API
//
// These types are shared across multiple API endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    #[schema(example = "Presupuesto no encontrado")]
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Confirmation returned by create/update/delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Gasto Agregado Correctamente")]
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
