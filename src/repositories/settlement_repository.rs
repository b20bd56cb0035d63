use crate::error::RepositoryError;
use crate::models::{Settlement, SettlementStatus};
use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use uuid::Uuid;

const SETTLEMENT_COLUMNS: &str =
    "id, group_id, from_user, to_user, amount_cents, status, created_at, resolved_at";

/// Repository for settlement data access
pub struct SettlementRepository {
    pool: SqlitePool,
}

impl SettlementRepository {
    /// Create a new SettlementRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new pending settlement
    pub async fn create(&self, settlement: &Settlement) -> Result<Settlement, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO settlements (id, group_id, from_user, to_user, amount_cents, status, created_at, resolved_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(settlement.id)
        .bind(settlement.group_id)
        .bind(settlement.from_user)
        .bind(settlement.to_user)
        .bind(settlement.amount_cents)
        .bind(&settlement.status)
        .bind(settlement.created_at)
        .bind(settlement.resolved_at)
        .execute(&self.pool)
        .await?;

        Ok(settlement.clone())
    }

    /// Find a settlement by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Settlement>, RepositoryError> {
        let settlement = sqlx::query_as::<_, Settlement>(&format!(
            "SELECT {} FROM settlements WHERE id = ?",
            SETTLEMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settlement)
    }

    /// List a group's settlements, newest first
    pub async fn list_for_group(&self, group_id: Uuid) -> Result<Vec<Settlement>, RepositoryError> {
        let settlements = sqlx::query_as::<_, Settlement>(&format!(
            "SELECT {} FROM settlements WHERE group_id = ? ORDER BY created_at DESC, id DESC",
            SETTLEMENT_COLUMNS
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(settlements)
    }

    /// Resolve a pending settlement to `completed` or `cancelled`.
    ///
    /// The `status = 'pending'` guard makes resolution terminal: returns 0
    /// rows affected if the settlement was already resolved.
    pub async fn resolve(
        &self,
        id: Uuid,
        status: SettlementStatus,
        resolved_at: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE settlements
            SET status = ?, resolved_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(status.as_str())
        .bind(resolved_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Every completed (from, to, amount) transfer in the group, for
    /// balance computation
    pub async fn completed_transfers_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<(Uuid, Uuid, i64)>, RepositoryError> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, i64)>(
            r#"
            SELECT from_user, to_user, amount_cents
            FROM settlements
            WHERE group_id = ? AND status = 'completed'
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
