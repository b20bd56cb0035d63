use crate::error::RepositoryError;
use crate::models::{Group, GroupMember, MemberRole};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for group data access
pub struct GroupRepository {
    pool: SqlitePool,
}

impl GroupRepository {
    /// Create a new GroupRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new group and enroll its creator as admin, atomically
    pub async fn create_with_admin(&self, group: &Group) -> Result<Group, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO expense_groups (id, name, currency, created_by, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.currency)
        .bind(group.created_by)
        .bind(group.created_at)
        .execute(&mut *tx)
        .await?;

        let admin = GroupMember::new(group.id, group.created_by, MemberRole::Admin);
        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role, joined_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(admin.group_id)
        .bind(admin.user_id)
        .bind(&admin.role)
        .bind(admin.joined_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(group.clone())
    }

    /// Find a group by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepositoryError> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, currency, created_by, created_at
            FROM expense_groups
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// List all groups the user is a member of, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Group>, RepositoryError> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT g.id, g.name, g.currency, g.created_by, g.created_at
            FROM expense_groups g
            JOIN group_members m ON m.group_id = g.id
            WHERE m.user_id = ?
            ORDER BY g.created_at DESC, g.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }
}
