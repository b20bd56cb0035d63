//! Domain models for the Divvy backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the expense-splitting app, plus the derived
//! value types (balances, settlement suggestions) that are computed
//! on demand and never stored.

pub mod balance;
pub mod draft;
pub mod expense;
pub mod group;
pub mod pagination;
pub mod settlement;
pub mod user;

// Re-export all models for convenient access
pub use balance::Balance;
pub use draft::{DraftSource, DraftStatus, ExpenseDraft};
pub use expense::{Expense, ExpenseSplit, SplitRequest, SplitType};
pub use group::{Group, GroupMember, MemberRole};
pub use pagination::{Cursor, PaginatedResponse};
pub use settlement::{Settlement, SettlementStatus, SettlementSuggestion};
pub use user::User;
