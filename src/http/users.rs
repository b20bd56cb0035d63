//! User registration and profile endpoints

use crate::error::AppError;
use crate::http::auth::CurrentUser;
use crate::models::User;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Registration echoes the user plus, on first registration only, the
/// bearer credential for all subsequent calls. The token is never
/// serialized anywhere else and never re-disclosed for an existing email.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// `POST /users`: register, upserting by email.
///
/// Registering an existing email returns the existing account with 200
/// instead of 201, without the token: this endpoint is unauthenticated,
/// so the credential is only ever issued to the first registration.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(format!("invalid email: {}", email)));
    }

    if let Some(existing) = state.user_repo.find_by_email(&email).await? {
        return Ok((
            StatusCode::OK,
            Json(RegisterResponse {
                user: existing,
                api_token: None,
            }),
        ));
    }

    let display_name = payload
        .display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or("user").to_string());

    let user = User::new(email, display_name, payload.avatar_url);
    let user = state.user_repo.create(&user).await?;
    let api_token = Some(user.api_token.clone());

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user, api_token }),
    ))
}

/// `GET /users/me`
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}

/// `PATCH /users/me`: profile fields only; identity is immutable
pub async fn update_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    let updated = state
        .user_repo
        .update_profile(
            user.id,
            payload.display_name.as_deref(),
            payload.avatar_url.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;

    Ok(Json(updated))
}
