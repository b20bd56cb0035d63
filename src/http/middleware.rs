use crate::error::{ErrorBody, ErrorDetails};
use crate::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

/// Per-request id, inserted into request extensions and echoed as the
/// `x-request-id` response header
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Outermost request middleware: assigns a request id and, outside
/// production, expands error responses with a `details` object carrying
/// the debug stack and the request id.
pub async fn request_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let req_id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(req_id.clone()));

    let response = next.run(request).await;

    let mut response = match response.extensions().get::<ErrorDetails>().cloned() {
        Some(details) if !state.config.is_production() => {
            let body = ErrorBody {
                code: details.code.clone(),
                message: details.message.clone(),
                details: Some(json!({
                    "stack": details.stack,
                    "req_id": req_id,
                })),
            };
            (details.status, Json(body)).into_response()
        }
        _ => response,
    };

    if let Ok(value) = HeaderValue::from_str(&req_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}
