//! Balance engine: derives each member's net position from the group's
//! expenses, splits, and completed settlements.

use crate::error::AppResult;
use crate::models::Balance;
use crate::repositories::{ExpenseRepository, GroupMemberRepository, SettlementRepository};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Service computing derived balances for a group
pub struct BalanceService {
    group_member_repo: Arc<GroupMemberRepository>,
    expense_repo: Arc<ExpenseRepository>,
    settlement_repo: Arc<SettlementRepository>,
}

impl BalanceService {
    /// Create a new balance service
    pub fn new(
        group_member_repo: Arc<GroupMemberRepository>,
        expense_repo: Arc<ExpenseRepository>,
        settlement_repo: Arc<SettlementRepository>,
    ) -> Self {
        Self {
            group_member_repo,
            expense_repo,
            settlement_repo,
        }
    }

    /// Net balances for every member of the group.
    ///
    /// Membership is assumed to have been checked by the caller.
    pub async fn balances_for_group(&self, group_id: Uuid) -> AppResult<Vec<Balance>> {
        let roster = self.group_member_repo.member_ids(group_id).await?;
        let payments = self.expense_repo.payments_for_group(group_id).await?;
        let shares = self.expense_repo.split_shares_for_group(group_id).await?;
        let transfers = self
            .settlement_repo
            .completed_transfers_for_group(group_id)
            .await?;

        Ok(net_balances(group_id, &roster, &payments, &shares, &transfers))
    }
}

/// Fold expenses, splits, and completed settlements into net positions.
///
/// Every expense credits its payer and debits each split participant; a
/// completed settlement credits the user who paid it (`from`) and debits
/// the recipient (`to`). Members with no activity still appear, at zero.
/// The group always sums to exactly zero.
pub(crate) fn net_balances(
    group_id: Uuid,
    roster: &[Uuid],
    payments: &[(Uuid, i64)],
    shares: &[(Uuid, i64)],
    transfers: &[(Uuid, Uuid, i64)],
) -> Vec<Balance> {
    let mut net: BTreeMap<Uuid, i64> = roster.iter().map(|user| (*user, 0)).collect();

    for (payer, amount) in payments {
        *net.entry(*payer).or_insert(0) += amount;
    }
    for (user, amount) in shares {
        *net.entry(*user).or_insert(0) -= amount;
    }
    for (from, to, amount) in transfers {
        *net.entry(*from).or_insert(0) += amount;
        *net.entry(*to).or_insert(0) -= amount;
    }

    // Roster order first, then any historical participants no longer on
    // the roster, in id order.
    let mut balances = Vec::with_capacity(net.len());
    for user in roster {
        if let Some(cents) = net.remove(user) {
            balances.push(Balance::new(*user, group_id, cents));
        }
    }
    for (user, cents) in net {
        balances.push(Balance::new(user, group_id, cents));
    }

    balances
}
