use crate::error::{AppError, AppResult};
use crate::models::{Group, GroupMember, MemberRole};
use crate::repositories::{GroupMemberRepository, GroupRepository, UserRepository};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for group creation and membership management
pub struct GroupService {
    group_repo: Arc<GroupRepository>,
    group_member_repo: Arc<GroupMemberRepository>,
    user_repo: Arc<UserRepository>,
}

impl GroupService {
    /// Create a new group service
    pub fn new(
        group_repo: Arc<GroupRepository>,
        group_member_repo: Arc<GroupMemberRepository>,
        user_repo: Arc<UserRepository>,
    ) -> Self {
        Self {
            group_repo,
            group_member_repo,
            user_repo,
        }
    }

    /// Create a group; the creator becomes an admin member atomically
    pub async fn create_group(
        &self,
        actor_id: Uuid,
        name: &str,
        currency: &str,
    ) -> AppResult<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("group name is required".to_string()));
        }
        let currency = currency.trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::Validation(format!(
                "invalid currency code: {}",
                currency
            )));
        }

        let group = Group::new(name.to_string(), currency, actor_id);
        let group = self.group_repo.create_with_admin(&group).await?;
        info!(group_id = %group.id, "group created");
        Ok(group)
    }

    /// Fetch a group, enforcing that the actor is a member.
    ///
    /// Returns `NotFound` for missing groups and `Forbidden` for
    /// non-members; used as the membership guard by every group-scoped
    /// route.
    pub async fn require_member(&self, group_id: Uuid, actor_id: Uuid) -> AppResult<Group> {
        let group = self
            .group_repo
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))?;

        if !self.group_member_repo.is_member(group_id, actor_id).await? {
            return Err(AppError::Forbidden(
                "only group members can access this group".to_string(),
            ));
        }

        Ok(group)
    }

    /// List the actor's groups
    pub async fn list_groups(&self, actor_id: Uuid) -> AppResult<Vec<Group>> {
        Ok(self.group_repo.list_for_user(actor_id).await?)
    }

    /// Add a member to a group. Only admins may do this.
    pub async fn add_member(
        &self,
        group_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> AppResult<GroupMember> {
        self.require_member(group_id, actor_id).await?;

        if !self.group_member_repo.is_admin(group_id, actor_id).await? {
            return Err(AppError::Forbidden(
                "only group admins can add members".to_string(),
            ));
        }

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let member = GroupMember::new(group_id, user_id, role);
        let member = self.group_member_repo.add(&member).await?;
        info!(group_id = %group_id, user_id = %user_id, role = member.role.as_str(), "member added");
        Ok(member)
    }

    /// List a group's members, enforcing membership
    pub async fn list_members(
        &self,
        group_id: Uuid,
        actor_id: Uuid,
    ) -> AppResult<Vec<GroupMember>> {
        self.require_member(group_id, actor_id).await?;
        Ok(self.group_member_repo.list_for_group(group_id).await?)
    }
}
