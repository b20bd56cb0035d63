use crate::error::RepositoryError;
use crate::models::{Cursor, DraftStatus, ExpenseDraft};
use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

const DRAFT_COLUMNS: &str = "id, group_id, created_by, paid_by, amount_cents, description, \
     source, llm_metadata, validation_warnings, splits, status, expense_id, \
     reviewed_by, reviewed_at, created_at";

/// Repository for expense draft data access
pub struct DraftRepository {
    pool: SqlitePool,
}

impl DraftRepository {
    /// Create a new DraftRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new draft
    pub async fn create(&self, draft: &ExpenseDraft) -> Result<ExpenseDraft, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO expense_drafts
                (id, group_id, created_by, paid_by, amount_cents, description,
                 source, llm_metadata, validation_warnings, splits, status,
                 expense_id, reviewed_by, reviewed_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.id)
        .bind(draft.group_id)
        .bind(draft.created_by)
        .bind(draft.paid_by)
        .bind(draft.amount_cents)
        .bind(&draft.description)
        .bind(&draft.source)
        .bind(&draft.llm_metadata)
        .bind(&draft.validation_warnings)
        .bind(&draft.splits)
        .bind(&draft.status)
        .bind(draft.expense_id)
        .bind(draft.reviewed_by)
        .bind(draft.reviewed_at)
        .bind(draft.created_at)
        .execute(&self.pool)
        .await?;

        Ok(draft.clone())
    }

    /// Find a draft by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ExpenseDraft>, RepositoryError> {
        let draft = sqlx::query_as::<_, ExpenseDraft>(&format!(
            "SELECT {} FROM expense_drafts WHERE id = ?",
            DRAFT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(draft)
    }

    /// One page of a group's drafts, newest first, optionally filtered by status
    pub async fn list_for_group(
        &self,
        group_id: Uuid,
        status: Option<DraftStatus>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<ExpenseDraft>, RepositoryError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM expense_drafts WHERE group_id = ",
            DRAFT_COLUMNS
        ));
        qb.push_bind(group_id);
        if let Some(status) = status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }
        if let Some(cursor) = cursor {
            qb.push(
                " AND (created_at, id) < (SELECT created_at, id FROM expense_drafts WHERE id = ",
            );
            qb.push_bind(cursor.0);
            qb.push(")");
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(limit);

        let drafts = qb
            .build_query_as::<ExpenseDraft>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(drafts)
    }

    /// Total number of a group's drafts matching the status filter
    pub async fn count_for_group(
        &self,
        group_id: Uuid,
        status: Option<DraftStatus>,
    ) -> Result<i64, RepositoryError> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM expense_drafts WHERE group_id = ");
        qb.push_bind(group_id);
        if let Some(status) = status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(count)
    }

    /// Mark a pending draft approved, on an open transaction.
    ///
    /// The `status = 'pending_review'` guard is what makes resolution
    /// terminal: returns 0 rows affected if the draft was already resolved.
    pub async fn mark_approved_tx(
        conn: &mut SqliteConnection,
        draft_id: Uuid,
        expense_id: Uuid,
        reviewed_by: Uuid,
        reviewed_at: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE expense_drafts
            SET status = 'approved', expense_id = ?, reviewed_by = ?, reviewed_at = ?
            WHERE id = ? AND status = 'pending_review'
            "#,
        )
        .bind(expense_id)
        .bind(reviewed_by)
        .bind(reviewed_at)
        .bind(draft_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Mark a pending draft rejected. Same terminal guard as approval.
    pub async fn mark_rejected(
        &self,
        draft_id: Uuid,
        reviewed_by: Uuid,
        reviewed_at: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE expense_drafts
            SET status = 'rejected', reviewed_by = ?, reviewed_at = ?
            WHERE id = ? AND status = 'pending_review'
            "#,
        )
        .bind(reviewed_by)
        .bind(reviewed_at)
        .bind(draft_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
