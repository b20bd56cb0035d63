pub mod balance;
pub mod draft_service;
pub mod expense_service;
pub mod group_service;
pub mod settlement;
pub mod split;

pub use balance::BalanceService;
pub use draft_service::DraftService;
pub use expense_service::{ExpenseService, ExpenseWithSplits};
pub use group_service::GroupService;
pub use settlement::SettlementService;
