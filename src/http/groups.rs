//! Group and membership endpoints

use crate::error::AppError;
use crate::http::auth::CurrentUser;
use crate::models::{Group, GroupMember, MemberRole};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: Option<MemberRole>,
}

/// `POST /groups`
pub async fn create(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    let currency = payload.currency.as_deref().unwrap_or("USD");
    let group = state
        .group_service
        .create_group(user.id, &payload.name, currency)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /groups`: the caller's groups
pub async fn list_mine(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Group>>, AppError> {
    Ok(Json(state.group_service.list_groups(user.id).await?))
}

/// `GET /groups/{group_id}`
pub async fn get(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Group>, AppError> {
    Ok(Json(
        state.group_service.require_member(group_id, user.id).await?,
    ))
}

/// `POST /groups/{group_id}/members`: admin only
pub async fn add_member(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<GroupMember>), AppError> {
    let role = payload.role.unwrap_or(MemberRole::Member);
    let member = state
        .group_service
        .add_member(group_id, user.id, payload.user_id, role)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// `GET /groups/{group_id}/members`
pub async fn list_members(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<GroupMember>>, AppError> {
    Ok(Json(
        state.group_service.list_members(group_id, user.id).await?,
    ))
}
