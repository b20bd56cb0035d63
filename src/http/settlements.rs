//! Settlement endpoints

use crate::error::AppError;
use crate::http::auth::CurrentUser;
use crate::models::{Settlement, SettlementSuggestion};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RecordSettlementRequest {
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub amount_cents: i64,
}

/// `GET /groups/{group_id}/settlements/suggestions`: minimal transfers
/// that would zero out current balances
pub async fn suggestions(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<SettlementSuggestion>>, AppError> {
    state.group_service.require_member(group_id, user.id).await?;
    Ok(Json(
        state
            .settlement_service
            .suggestions_for_group(group_id)
            .await?,
    ))
}

/// `POST /groups/{group_id}/settlements`: record a pending transfer
pub async fn record(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<RecordSettlementRequest>,
) -> Result<(StatusCode, Json<Settlement>), AppError> {
    state.group_service.require_member(group_id, user.id).await?;
    let settlement = state
        .settlement_service
        .record(
            group_id,
            payload.from_user,
            payload.to_user,
            payload.amount_cents,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(settlement)))
}

/// `GET /groups/{group_id}/settlements`
pub async fn list(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<Settlement>>, AppError> {
    state.group_service.require_member(group_id, user.id).await?;
    Ok(Json(
        state.settlement_service.list_for_group(group_id).await?,
    ))
}

/// `POST /settlements/{settlement_id}/complete`
pub async fn complete(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(settlement_id): Path<Uuid>,
) -> Result<Json<Settlement>, AppError> {
    Ok(Json(
        state
            .settlement_service
            .complete(settlement_id, user.id)
            .await?,
    ))
}

/// `POST /settlements/{settlement_id}/cancel`
pub async fn cancel(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(settlement_id): Path<Uuid>,
) -> Result<Json<Settlement>, AppError> {
    Ok(Json(
        state
            .settlement_service
            .cancel(settlement_id, user.id)
            .await?,
    ))
}
