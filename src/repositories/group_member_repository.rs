use crate::error::RepositoryError;
use crate::models::GroupMember;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for group membership data access
pub struct GroupMemberRepository {
    pool: SqlitePool,
}

impl GroupMemberRepository {
    /// Create a new GroupMemberRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new membership
    pub async fn add(&self, member: &GroupMember) -> Result<GroupMember, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role, joined_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(member.group_id)
        .bind(member.user_id)
        .bind(&member.role)
        .bind(member.joined_at)
        .execute(&self.pool)
        .await?;

        Ok(member.clone())
    }

    /// Find a specific membership
    pub async fn find(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMember>, RepositoryError> {
        let member = sqlx::query_as::<_, GroupMember>(
            r#"
            SELECT group_id, user_id, role, joined_at
            FROM group_members
            WHERE group_id = ? AND user_id = ?
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Check whether a user belongs to a group
    pub async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.find(group_id, user_id).await?.is_some())
    }

    /// Check whether a user is an admin of a group
    pub async fn is_admin(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self
            .find(group_id, user_id)
            .await?
            .map(|m| m.is_admin())
            .unwrap_or(false))
    }

    /// List all members of a group, in join order
    pub async fn list_for_group(&self, group_id: Uuid) -> Result<Vec<GroupMember>, RepositoryError> {
        let members = sqlx::query_as::<_, GroupMember>(
            r#"
            SELECT group_id, user_id, role, joined_at
            FROM group_members
            WHERE group_id = ?
            ORDER BY joined_at ASC, user_id ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// List member user ids of a group, in join order
    pub async fn member_ids(&self, group_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
            FROM group_members
            WHERE group_id = ?
            ORDER BY joined_at ASC, user_id ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
