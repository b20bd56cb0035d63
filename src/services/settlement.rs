//! Settlement engine: proposes a minimal set of transfers that nets out a
//! group's balances, and manages the lifecycle of recorded settlements.

use crate::error::{AppError, AppResult};
use crate::models::{Balance, Settlement, SettlementStatus, SettlementSuggestion};
use crate::repositories::{GroupMemberRepository, SettlementRepository};
use crate::services::BalanceService;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for settlement suggestions and recorded settlements
pub struct SettlementService {
    settlement_repo: Arc<SettlementRepository>,
    group_member_repo: Arc<GroupMemberRepository>,
    balance_service: Arc<BalanceService>,
}

impl SettlementService {
    /// Create a new settlement service
    pub fn new(
        settlement_repo: Arc<SettlementRepository>,
        group_member_repo: Arc<GroupMemberRepository>,
        balance_service: Arc<BalanceService>,
    ) -> Self {
        Self {
            settlement_repo,
            group_member_repo,
            balance_service,
        }
    }

    /// Propose transfers that would zero out the group's current balances
    pub async fn suggestions_for_group(
        &self,
        group_id: Uuid,
    ) -> AppResult<Vec<SettlementSuggestion>> {
        let balances = self.balance_service.balances_for_group(group_id).await?;
        Ok(suggest_settlements(&balances))
    }

    /// Record a pending settlement between two group members
    pub async fn record(
        &self,
        group_id: Uuid,
        from_user: Uuid,
        to_user: Uuid,
        amount_cents: i64,
    ) -> AppResult<Settlement> {
        if amount_cents <= 0 {
            return Err(AppError::Validation(
                "settlement amount must be positive".to_string(),
            ));
        }
        if from_user == to_user {
            return Err(AppError::Validation(
                "a settlement needs two distinct users".to_string(),
            ));
        }
        for user in [from_user, to_user] {
            if !self.group_member_repo.is_member(group_id, user).await? {
                return Err(AppError::Validation(format!(
                    "user {} is not a member of the group",
                    user
                )));
            }
        }

        let settlement = Settlement::new(group_id, from_user, to_user, amount_cents);
        let settlement = self.settlement_repo.create(&settlement).await?;
        info!(settlement_id = %settlement.id, group_id = %group_id, "settlement recorded");
        Ok(settlement)
    }

    /// List a group's settlements, newest first
    pub async fn list_for_group(&self, group_id: Uuid) -> AppResult<Vec<Settlement>> {
        Ok(self.settlement_repo.list_for_group(group_id).await?)
    }

    /// Mark a pending settlement completed
    pub async fn complete(&self, settlement_id: Uuid, actor_id: Uuid) -> AppResult<Settlement> {
        self.resolve(settlement_id, actor_id, SettlementStatus::Completed)
            .await
    }

    /// Mark a pending settlement cancelled
    pub async fn cancel(&self, settlement_id: Uuid, actor_id: Uuid) -> AppResult<Settlement> {
        self.resolve(settlement_id, actor_id, SettlementStatus::Cancelled)
            .await
    }

    async fn resolve(
        &self,
        settlement_id: Uuid,
        actor_id: Uuid,
        status: SettlementStatus,
    ) -> AppResult<Settlement> {
        let settlement = self
            .settlement_repo
            .find_by_id(settlement_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Settlement {} not found", settlement_id)))?;

        if !self
            .group_member_repo
            .is_member(settlement.group_id, actor_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "only group members can resolve settlements".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let updated = self
            .settlement_repo
            .resolve(settlement_id, status, now)
            .await?;
        if updated == 0 {
            return Err(AppError::Conflict(format!(
                "Settlement {} is already resolved",
                settlement_id
            )));
        }

        info!(settlement_id = %settlement_id, status = status.as_str(), "settlement resolved");
        self.settlement_repo
            .find_by_id(settlement_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Settlement {} not found", settlement_id)))
    }
}

/// Greedy min-cash-flow netting.
///
/// Repeatedly matches the largest debtor against the largest creditor and
/// transfers the smaller of the two positions. Ties break by user id so the
/// output is deterministic. Produces at most `n - 1` transfers for `n`
/// non-zero balances, and applying all of them zeroes every balance.
pub fn suggest_settlements(balances: &[Balance]) -> Vec<SettlementSuggestion> {
    let mut creditors: BinaryHeap<(i64, Uuid)> = BinaryHeap::new();
    let mut debtors: BinaryHeap<(i64, Uuid)> = BinaryHeap::new();

    for balance in balances {
        if balance.net_cents > 0 {
            creditors.push((balance.net_cents, balance.user_id));
        } else if balance.net_cents < 0 {
            debtors.push((-balance.net_cents, balance.user_id));
        }
    }

    let mut suggestions = Vec::new();
    // Balances sum to zero, so the heaps drain together.
    loop {
        let Some((credit, creditor)) = creditors.pop() else {
            break;
        };
        let Some((debt, debtor)) = debtors.pop() else {
            break;
        };

        let amount = credit.min(debt);
        suggestions.push(SettlementSuggestion {
            from_user: debtor,
            to_user: creditor,
            amount_cents: amount,
        });

        if credit > amount {
            creditors.push((credit - amount, creditor));
        }
        if debt > amount {
            debtors.push((debt - amount, debtor));
        }
    }

    suggestions
}
