//! Divvy Backend Library
//!
//! This module exposes the backend components for use by tests and other
//! consumers: configuration, the database layer, domain models, the
//! repository and service layers, and the HTTP router.

pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repositories::*;
use services::*;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state containing all repositories and services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: SqlitePool,
    pub user_repo: Arc<UserRepository>,
    pub group_repo: Arc<GroupRepository>,
    pub group_member_repo: Arc<GroupMemberRepository>,
    pub expense_repo: Arc<ExpenseRepository>,
    pub draft_repo: Arc<DraftRepository>,
    pub settlement_repo: Arc<SettlementRepository>,
    pub group_service: Arc<GroupService>,
    pub expense_service: Arc<ExpenseService>,
    pub draft_service: Arc<DraftService>,
    pub balance_service: Arc<BalanceService>,
    pub settlement_service: Arc<SettlementService>,
}

impl AppState {
    /// Create a new AppState with initialized repositories and services
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let group_repo = Arc::new(GroupRepository::new(pool.clone()));
        let group_member_repo = Arc::new(GroupMemberRepository::new(pool.clone()));
        let expense_repo = Arc::new(ExpenseRepository::new(pool.clone()));
        let draft_repo = Arc::new(DraftRepository::new(pool.clone()));
        let settlement_repo = Arc::new(SettlementRepository::new(pool.clone()));

        let group_service = Arc::new(GroupService::new(
            group_repo.clone(),
            group_member_repo.clone(),
            user_repo.clone(),
        ));
        let balance_service = Arc::new(BalanceService::new(
            group_member_repo.clone(),
            expense_repo.clone(),
            settlement_repo.clone(),
        ));
        let expense_service = Arc::new(ExpenseService::new(
            expense_repo.clone(),
            group_member_repo.clone(),
            group_service.clone(),
        ));
        let draft_service = Arc::new(DraftService::new(
            draft_repo.clone(),
            expense_repo.clone(),
            group_member_repo.clone(),
            group_service.clone(),
            pool.clone(),
        ));
        let settlement_service = Arc::new(SettlementService::new(
            settlement_repo.clone(),
            group_member_repo.clone(),
            balance_service.clone(),
        ));

        Self {
            config: Arc::new(config),
            pool,
            user_repo,
            group_repo,
            group_member_repo,
            expense_repo,
            draft_repo,
            settlement_repo,
            group_service,
            expense_service,
            draft_service,
            balance_service,
            settlement_service,
        }
    }
}
