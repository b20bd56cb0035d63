//! HTTP surface: router assembly, middleware stack, and resource handlers.

pub mod auth;
pub mod balances;
pub mod drafts;
pub mod expenses;
pub mod groups;
pub mod health;
pub mod middleware;
pub mod settlements;
pub mod users;

use crate::error::AppError;
use crate::AppState;
use axum::http::{header, HeaderValue, Method, Uri};
use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// `/healthz` and registration are public; everything else sits behind
/// the auth middleware. The request-context middleware wraps the whole
/// tree so even auth failures and the 404 fallback get a request id and
/// a uniform error envelope.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/groups", post(groups::create).get(groups::list_mine))
        .route("/groups/{group_id}", get(groups::get))
        .route(
            "/groups/{group_id}/members",
            post(groups::add_member).get(groups::list_members),
        )
        .route(
            "/groups/{group_id}/expenses",
            post(expenses::create).get(expenses::list),
        )
        .route("/expenses/{expense_id}", get(expenses::get))
        .route(
            "/groups/{group_id}/drafts",
            post(drafts::create).get(drafts::list),
        )
        .route("/drafts/{draft_id}", get(drafts::get))
        .route("/drafts/{draft_id}/approve", post(drafts::approve))
        .route("/drafts/{draft_id}/reject", post(drafts::reject))
        .route("/groups/{group_id}/balances", get(balances::list))
        .route(
            "/groups/{group_id}/settlements",
            post(settlements::record).get(settlements::list),
        )
        .route(
            "/groups/{group_id}/settlements/suggestions",
            get(settlements::suggestions),
        )
        .route(
            "/settlements/{settlement_id}/complete",
            post(settlements::complete),
        )
        .route(
            "/settlements/{settlement_id}/cancel",
            post(settlements::cancel),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/users", post(users::register))
        .merge(protected)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_context,
        ))
        .layer(cors_layer())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Catch-all for unmatched routes
async fn fallback(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} {} not found", method, uri.path()))
}
