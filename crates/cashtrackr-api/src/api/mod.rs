// HTTP API routes
//
// Budget and expense handlers plus the pieces they share: response types,
// input validation and the resource guards.

pub mod budgets;
pub mod common;
pub mod expenses;
pub mod guards;
pub mod validation;

// Re-export common types
pub use common::{ErrorResponse, MessageResponse};
