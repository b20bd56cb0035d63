//! Expense-draft review endpoints

use crate::error::AppError;
use crate::http::auth::CurrentUser;
use crate::models::{DraftStatus, ExpenseDraft, PaginatedResponse};
use crate::services::draft_service::{ApproveDraft, ApprovedDraft, NewDraft};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DraftListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// `POST /groups/{group_id}/drafts`
pub async fn create(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<NewDraft>,
) -> Result<(StatusCode, Json<ExpenseDraft>), AppError> {
    let draft = state
        .draft_service
        .create_draft(group_id, user.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(draft)))
}

/// `GET /groups/{group_id}/drafts?status=pending_review`: paginated,
/// newest first
pub async fn list(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Query(params): Query<DraftListParams>,
) -> Result<Json<PaginatedResponse<ExpenseDraft>>, AppError> {
    let status = params
        .status
        .as_deref()
        .map(DraftStatus::from_str)
        .transpose()
        .map_err(AppError::Validation)?;

    let page = state
        .draft_service
        .list_drafts(
            group_id,
            user.id,
            status,
            params.cursor.as_deref(),
            params.limit,
        )
        .await?;
    Ok(Json(page))
}

/// `GET /drafts/{draft_id}`
pub async fn get(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<ExpenseDraft>, AppError> {
    Ok(Json(state.draft_service.get_draft(draft_id, user.id).await?))
}

/// `POST /drafts/{draft_id}/approve`: body is optional reviewer overrides
pub async fn approve(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
    payload: Option<Json<ApproveDraft>>,
) -> Result<Json<ApprovedDraft>, AppError> {
    let overrides = payload.map(|Json(p)| p).unwrap_or_default();
    let approved = state
        .draft_service
        .approve(draft_id, user.id, overrides)
        .await?;
    Ok(Json(approved))
}

/// `POST /drafts/{draft_id}/reject`
pub async fn reject(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<ExpenseDraft>, AppError> {
    Ok(Json(state.draft_service.reject(draft_id, user.id).await?))
}
