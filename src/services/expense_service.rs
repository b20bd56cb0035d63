use crate::error::{AppError, AppResult};
use crate::models::pagination::clamp_limit;
use crate::models::{
    Cursor, Expense, ExpenseSplit, PaginatedResponse, SplitRequest,
};
use crate::repositories::{ExpenseRepository, GroupMemberRepository};
use crate::services::split::compute_splits;
use crate::services::GroupService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// An expense together with its per-participant splits
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseWithSplits {
    #[serde(flatten)]
    pub expense: Expense,
    pub splits: Vec<ExpenseSplit>,
}

/// Input for creating an expense
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewExpense {
    #[serde(default)]
    pub paid_by: Option<Uuid>,
    pub amount_cents: i64,
    pub description: String,
    #[serde(default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub splits: Vec<SplitRequest>,
}

/// Service for expense creation and queries
pub struct ExpenseService {
    expense_repo: Arc<ExpenseRepository>,
    group_member_repo: Arc<GroupMemberRepository>,
    group_service: Arc<GroupService>,
}

impl ExpenseService {
    /// Create a new expense service
    pub fn new(
        expense_repo: Arc<ExpenseRepository>,
        group_member_repo: Arc<GroupMemberRepository>,
        group_service: Arc<GroupService>,
    ) -> Self {
        Self {
            expense_repo,
            group_member_repo,
            group_service,
        }
    }

    /// Create an expense with resolved splits, atomically.
    ///
    /// The payer defaults to the actor; an empty split list means an equal
    /// split across the current roster. The split engine guarantees the
    /// stored splits sum to the expense total.
    pub async fn create_expense(
        &self,
        group_id: Uuid,
        actor_id: Uuid,
        input: NewExpense,
    ) -> AppResult<ExpenseWithSplits> {
        self.group_service.require_member(group_id, actor_id).await?;

        if input.amount_cents <= 0 {
            return Err(AppError::Validation(
                "expense amount must be positive".to_string(),
            ));
        }
        let description = input.description.trim().to_string();
        if description.is_empty() {
            return Err(AppError::Validation(
                "expense description is required".to_string(),
            ));
        }

        let roster = self.group_member_repo.member_ids(group_id).await?;
        let paid_by = input.paid_by.unwrap_or(actor_id);
        if !roster.contains(&paid_by) {
            return Err(AppError::Validation(format!(
                "payer {} is not a member of the group",
                paid_by
            )));
        }

        let requests = if input.splits.is_empty() {
            roster.iter().map(|id| SplitRequest::equal(*id)).collect()
        } else {
            input.splits
        };
        for request in &requests {
            if !roster.contains(&request.user_id) {
                return Err(AppError::Validation(format!(
                    "split participant {} is not a member of the group",
                    request.user_id
                )));
            }
        }

        let shares =
            compute_splits(input.amount_cents, &requests).map_err(|e| AppError::Validation(e.to_string()))?;
        let split_type = requests[0].split_type;

        let expense = Expense::new(
            group_id,
            paid_by,
            input.amount_cents,
            description,
            input.receipt_url,
            actor_id,
        );
        let splits: Vec<ExpenseSplit> = shares
            .iter()
            .map(|share| ExpenseSplit::new(expense.id, share.user_id, share.amount_cents, split_type))
            .collect();

        let expense = self.expense_repo.create_with_splits(&expense, &splits).await?;
        info!(expense_id = %expense.id, group_id = %group_id, amount_cents = expense.amount_cents, "expense created");

        Ok(ExpenseWithSplits { expense, splits })
    }

    /// Fetch an expense with its splits, enforcing group membership
    pub async fn get_expense(&self, expense_id: Uuid, actor_id: Uuid) -> AppResult<ExpenseWithSplits> {
        let expense = self
            .expense_repo
            .find_by_id(expense_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Expense {} not found", expense_id)))?;

        self.group_service
            .require_member(expense.group_id, actor_id)
            .await?;

        let splits = self.expense_repo.splits_for_expense(expense_id).await?;
        Ok(ExpenseWithSplits { expense, splits })
    }

    /// One page of a group's expenses, newest first
    pub async fn list_expenses(
        &self,
        group_id: Uuid,
        actor_id: Uuid,
        cursor: Option<&str>,
        limit: Option<i64>,
    ) -> AppResult<PaginatedResponse<Expense>> {
        self.group_service.require_member(group_id, actor_id).await?;

        let limit = clamp_limit(limit);
        let cursor = cursor
            .map(Cursor::decode)
            .transpose()
            .map_err(AppError::Validation)?;
        if let Some(cursor) = cursor {
            // The anchor row must exist in this group, or the keyset
            // subquery silently matches nothing.
            let anchor = self.expense_repo.find_by_id(cursor.0).await?;
            if !anchor.is_some_and(|e| e.group_id == group_id) {
                return Err(AppError::Validation("invalid cursor".to_string()));
            }
        }

        let mut expenses = self
            .expense_repo
            .list_for_group(group_id, cursor, limit + 1)
            .await?;
        let total = self.expense_repo.count_for_group(group_id).await?;

        let has_more = expenses.len() as i64 > limit;
        if has_more {
            expenses.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            expenses.last().map(|e| Cursor(e.id).encode())
        } else {
            None
        };

        Ok(PaginatedResponse::new(expenses, next_cursor, has_more, total))
    }
}
