//! Expense endpoints

use crate::error::AppError;
use crate::http::auth::CurrentUser;
use crate::models::{Expense, PaginatedResponse};
use crate::services::expense_service::NewExpense;
use crate::services::ExpenseWithSplits;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// `POST /groups/{group_id}/expenses`
pub async fn create(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<NewExpense>,
) -> Result<(StatusCode, Json<ExpenseWithSplits>), AppError> {
    let expense = state
        .expense_service
        .create_expense(group_id, user.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// `GET /groups/{group_id}/expenses`: paginated, newest first
pub async fn list(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Expense>>, AppError> {
    let page = state
        .expense_service
        .list_expenses(group_id, user.id, params.cursor.as_deref(), params.limit)
        .await?;
    Ok(Json(page))
}

/// `GET /expenses/{expense_id}`: expense with its splits
pub async fn get(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseWithSplits>, AppError> {
    Ok(Json(
        state.expense_service.get_expense(expense_id, user.id).await?,
    ))
}
