// Services layer for business logic
// Services turn validated input into storage calls and storage rows into public DTOs

pub mod budget;
pub mod expense;

pub use budget::BudgetService;
pub use expense::ExpenseService;
