use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;
use uuid::Uuid;

/// Development-only bypass headers, honored outside production so the
/// mobile client's smoke tests can authenticate without a real credential
pub const TEST_USER_ID_HEADER: &str = "x-test-user-id";
pub const TEST_USER_EMAIL_HEADER: &str = "x-test-user-email";

/// Authenticated caller, inserted into request extensions by `require_auth`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn unauthorized(reason: &str) -> AppError {
    AppError::Unauthorized(reason.to_string())
}

/// Authentication middleware.
///
/// `Authorization: Bearer <token>` works in every environment; the
/// `X-Test-User-ID` / `X-Test-User-Email` pair works only outside
/// production and lazily registers the test user.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let test_id = request
        .headers()
        .get(TEST_USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let test_email = request
        .headers()
        .get(TEST_USER_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let user = if let Some(value) = bearer {
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("malformed Authorization header"))?;
        state
            .user_repo
            .find_by_api_token(token)
            .await?
            .ok_or_else(|| unauthorized("unknown API token"))?
    } else if !state.config.is_production() {
        match (test_id, test_email) {
            (Some(id), Some(email)) => test_user(&state, &id, &email).await?,
            _ => return Err(unauthorized("missing credentials")),
        }
    } else {
        return Err(unauthorized("missing credentials"));
    };

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Resolve (or lazily register) the test user named by the bypass headers
async fn test_user(state: &AppState, id: &str, email: &str) -> Result<User, AppError> {
    let id: Uuid = id
        .parse()
        .map_err(|_| unauthorized("malformed test user id"))?;

    if let Some(user) = state.user_repo.find_by_id(id).await? {
        return Ok(user);
    }

    debug!(user_id = %id, "registering test user from bypass headers");
    let display_name = email.split('@').next().unwrap_or("test").to_string();
    let mut user = User::new(email.to_string(), display_name, None);
    user.id = id;
    Ok(state.user_repo.create(&user).await?)
}
