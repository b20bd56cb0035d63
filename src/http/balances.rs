//! Balance endpoints

use crate::error::AppError;
use crate::http::auth::CurrentUser;
use crate::models::Balance;
use crate::AppState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

/// `GET /groups/{group_id}/balances`: derived net positions per member
pub async fn list(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<Balance>>, AppError> {
    state.group_service.require_member(group_id, user.id).await?;
    Ok(Json(
        state.balance_service.balances_for_group(group_id).await?,
    ))
}
