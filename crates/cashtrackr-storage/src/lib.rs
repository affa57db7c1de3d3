// Storage layer for CashTrackr
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// - PgDatabase: sqlx-backed repositories with embedded migrations
// - InMemoryDatabase: HashMap-style tables for local runs and tests
// - StorageBackend: enum dispatch over the two

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use postgres::PgDatabase;
pub use repositories::{BudgetRepository, ExpenseRepository, UserRepository};
