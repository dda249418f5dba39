//! Trip and expense records.
//!
//! - **types**: The `Entry` sum type and its two variants
//! - **builder**: Raw form input and the validating builders

mod builder;
mod types;

pub use builder::{build_expense, build_trip, ExpenseForm, TripForm};
pub use types::{Entry, EntryKind, Expense, Purpose, Trip};
