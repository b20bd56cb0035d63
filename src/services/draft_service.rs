//! Draft review workflow: creation with advisory validation warnings,
//! listing for the review screen, and the terminal approve/reject
//! transitions.

use crate::error::{AppError, AppResult};
use crate::models::pagination::clamp_limit;
use crate::models::{
    Cursor, DraftSource, DraftStatus, Expense, ExpenseDraft, ExpenseSplit, PaginatedResponse,
    SplitRequest,
};
use crate::repositories::{DraftRepository, ExpenseRepository, GroupMemberRepository};
use crate::services::split::compute_splits;
use crate::services::GroupService;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Parses below this confidence get flagged for the reviewer
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Input for creating a draft. Everything except the group is optional;
/// gaps surface as validation warnings, not errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDraft {
    #[serde(default)]
    pub paid_by: Option<Uuid>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<DraftSource>,
    #[serde(default)]
    pub llm_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub splits: Vec<SplitRequest>,
}

/// Optional overrides supplied by the reviewer at approval time
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApproveDraft {
    #[serde(default)]
    pub paid_by: Option<Uuid>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub splits: Option<Vec<SplitRequest>>,
}

/// Result of approving a draft
#[derive(Debug, Clone, Serialize)]
pub struct ApprovedDraft {
    pub draft: ExpenseDraft,
    pub expense: Expense,
    pub splits: Vec<ExpenseSplit>,
}

/// Service for the expense-draft review workflow
pub struct DraftService {
    draft_repo: Arc<DraftRepository>,
    expense_repo: Arc<ExpenseRepository>,
    group_member_repo: Arc<GroupMemberRepository>,
    group_service: Arc<GroupService>,
    pool: SqlitePool,
}

impl DraftService {
    /// Create a new draft service
    pub fn new(
        draft_repo: Arc<DraftRepository>,
        expense_repo: Arc<ExpenseRepository>,
        group_member_repo: Arc<GroupMemberRepository>,
        group_service: Arc<GroupService>,
        pool: SqlitePool,
    ) -> Self {
        Self {
            draft_repo,
            expense_repo,
            group_member_repo,
            group_service,
            pool,
        }
    }

    /// Create a draft in `pending_review`, computing validation warnings.
    ///
    /// Warnings never block creation; they flag the draft for the
    /// reviewer. Incomplete LLM parses are expected input here.
    pub async fn create_draft(
        &self,
        group_id: Uuid,
        actor_id: Uuid,
        input: NewDraft,
    ) -> AppResult<ExpenseDraft> {
        self.group_service.require_member(group_id, actor_id).await?;

        let roster = self.group_member_repo.member_ids(group_id).await?;
        let source = input.source.unwrap_or(DraftSource::Manual);
        let warnings = draft_warnings(
            input.paid_by,
            input.amount_cents,
            input.description.as_deref(),
            &input.splits,
            source,
            input.llm_metadata.as_ref(),
            &roster,
        );

        let draft = ExpenseDraft {
            id: Uuid::new_v4(),
            group_id,
            created_by: actor_id,
            paid_by: input.paid_by,
            amount_cents: input.amount_cents,
            description: input.description,
            source: source.as_str().to_string(),
            llm_metadata: input.llm_metadata.map(Json),
            validation_warnings: Json(warnings),
            splits: Json(input.splits),
            status: DraftStatus::PendingReview.as_str().to_string(),
            expense_id: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: chrono::Utc::now().naive_utc(),
        };

        let draft = self.draft_repo.create(&draft).await?;
        info!(draft_id = %draft.id, group_id = %group_id, source = draft.source.as_str(),
              warnings = draft.validation_warnings.0.len(), "draft created");
        Ok(draft)
    }

    /// Fetch a draft, enforcing group membership
    pub async fn get_draft(&self, draft_id: Uuid, actor_id: Uuid) -> AppResult<ExpenseDraft> {
        let draft = self.find(draft_id).await?;
        self.group_service
            .require_member(draft.group_id, actor_id)
            .await?;
        Ok(draft)
    }

    /// One page of a group's drafts, newest first, optionally filtered
    /// by status (the review screen asks for `pending_review`)
    pub async fn list_drafts(
        &self,
        group_id: Uuid,
        actor_id: Uuid,
        status: Option<DraftStatus>,
        cursor: Option<&str>,
        limit: Option<i64>,
    ) -> AppResult<PaginatedResponse<ExpenseDraft>> {
        self.group_service.require_member(group_id, actor_id).await?;

        let limit = clamp_limit(limit);
        let cursor = cursor
            .map(Cursor::decode)
            .transpose()
            .map_err(AppError::Validation)?;
        if let Some(cursor) = cursor {
            // The anchor row must exist in this group, or the keyset
            // subquery silently matches nothing.
            let anchor = self.draft_repo.find_by_id(cursor.0).await?;
            if !anchor.is_some_and(|d| d.group_id == group_id) {
                return Err(AppError::Validation("invalid cursor".to_string()));
            }
        }

        let mut drafts = self
            .draft_repo
            .list_for_group(group_id, status, cursor, limit + 1)
            .await?;
        let total = self.draft_repo.count_for_group(group_id, status).await?;

        let has_more = drafts.len() as i64 > limit;
        if has_more {
            drafts.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            drafts.last().map(|d| Cursor(d.id).encode())
        } else {
            None
        };

        Ok(PaginatedResponse::new(drafts, next_cursor, has_more, total))
    }

    /// Approve a pending draft, promoting it to a real expense.
    ///
    /// The expense insert and the draft's terminal transition happen in
    /// one transaction; a draft that is already resolved (or resolved
    /// concurrently) yields a 409 conflict.
    pub async fn approve(
        &self,
        draft_id: Uuid,
        actor_id: Uuid,
        overrides: ApproveDraft,
    ) -> AppResult<ApprovedDraft> {
        let draft = self.find(draft_id).await?;
        self.group_service
            .require_member(draft.group_id, actor_id)
            .await?;

        if draft.is_resolved() {
            return Err(AppError::Conflict(format!(
                "Draft {} is already {}",
                draft_id, draft.status
            )));
        }

        let amount_cents = overrides
            .amount_cents
            .or(draft.amount_cents)
            .ok_or_else(|| AppError::Validation("draft has no amount to approve".to_string()))?;

        let roster = self.group_member_repo.member_ids(draft.group_id).await?;
        let paid_by = overrides.paid_by.or(draft.paid_by).unwrap_or(actor_id);
        if !roster.contains(&paid_by) {
            return Err(AppError::Validation(format!(
                "payer {} is not a member of the group",
                paid_by
            )));
        }

        let requests = match overrides.splits {
            Some(splits) if !splits.is_empty() => splits,
            _ if !draft.splits.0.is_empty() => draft.splits.0.clone(),
            _ => roster.iter().map(|id| SplitRequest::equal(*id)).collect(),
        };
        for request in &requests {
            if !roster.contains(&request.user_id) {
                return Err(AppError::Validation(format!(
                    "split participant {} is not a member of the group",
                    request.user_id
                )));
            }
        }
        let shares = compute_splits(amount_cents, &requests)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let split_type = requests[0].split_type;

        let description = overrides
            .description
            .or_else(|| draft.description.clone())
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "Untitled expense".to_string());

        let expense = Expense::new(
            draft.group_id,
            paid_by,
            amount_cents,
            description,
            overrides.receipt_url,
            actor_id,
        );
        let splits: Vec<ExpenseSplit> = shares
            .iter()
            .map(|share| ExpenseSplit::new(expense.id, share.user_id, share.amount_cents, split_type))
            .collect();

        let now = chrono::Utc::now().naive_utc();
        let mut tx = self.pool.begin().await.map_err(crate::error::RepositoryError::from)?;
        ExpenseRepository::insert_tx(&mut tx, &expense).await?;
        for split in &splits {
            ExpenseRepository::insert_split_tx(&mut tx, split).await?;
        }
        let updated =
            DraftRepository::mark_approved_tx(&mut tx, draft_id, expense.id, actor_id, now).await?;
        if updated == 0 {
            // Lost the race with another reviewer; drop the expense too.
            tx.rollback().await.map_err(crate::error::RepositoryError::from)?;
            return Err(AppError::Conflict(format!(
                "Draft {} is already resolved",
                draft_id
            )));
        }
        tx.commit().await.map_err(crate::error::RepositoryError::from)?;

        info!(draft_id = %draft_id, expense_id = %expense.id, "draft approved");
        let draft = self.find(draft_id).await?;
        Ok(ApprovedDraft {
            draft,
            expense,
            splits,
        })
    }

    /// Reject a pending draft. Terminal; a resolved draft yields 409.
    pub async fn reject(&self, draft_id: Uuid, actor_id: Uuid) -> AppResult<ExpenseDraft> {
        let draft = self.find(draft_id).await?;
        self.group_service
            .require_member(draft.group_id, actor_id)
            .await?;

        let now = chrono::Utc::now().naive_utc();
        let updated = self.draft_repo.mark_rejected(draft_id, actor_id, now).await?;
        if updated == 0 {
            return Err(AppError::Conflict(format!(
                "Draft {} is already {}",
                draft_id, draft.status
            )));
        }

        info!(draft_id = %draft_id, "draft rejected");
        self.find(draft_id).await
    }

    async fn find(&self, draft_id: Uuid) -> AppResult<ExpenseDraft> {
        self.draft_repo
            .find_by_id(draft_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Draft {} not found", draft_id)))
    }
}

/// Compute advisory warnings for a draft's current contents
pub(crate) fn draft_warnings(
    paid_by: Option<Uuid>,
    amount_cents: Option<i64>,
    description: Option<&str>,
    splits: &[SplitRequest],
    source: DraftSource,
    llm_metadata: Option<&serde_json::Value>,
    roster: &[Uuid],
) -> Vec<String> {
    let mut warnings = Vec::new();

    match amount_cents {
        None => warnings.push("missing_amount".to_string()),
        Some(amount) if amount <= 0 => warnings.push("non_positive_amount".to_string()),
        _ => {}
    }

    match paid_by {
        None => warnings.push("missing_payer".to_string()),
        Some(payer) if !roster.contains(&payer) => warnings.push("payer_not_member".to_string()),
        _ => {}
    }

    if description.map(str::trim).filter(|d| !d.is_empty()).is_none() {
        warnings.push("missing_description".to_string());
    }

    if !splits.is_empty() {
        if let Some(amount) = amount_cents.filter(|a| *a > 0) {
            if compute_splits(amount, splits).is_err() {
                warnings.push("splits_do_not_balance".to_string());
            }
        }
    }

    if source == DraftSource::LlmParsed {
        let confidence = llm_metadata
            .and_then(|m| m.get("confidence"))
            .and_then(|c| c.as_f64());
        if matches!(confidence, Some(c) if c < LOW_CONFIDENCE_THRESHOLD) {
            warnings.push("low_parse_confidence".to_string());
        }
    }

    warnings
}
