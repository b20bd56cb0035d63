use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uniform shape for paginated list responses.
///
/// `cursor` is an opaque token for fetching the next page; it is present
/// exactly when `has_more` is true. `total` counts every row matching the
/// filter, not just this page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub has_more: bool,
    pub total: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>, has_more: bool, total: i64) -> Self {
        Self {
            items,
            cursor,
            has_more,
            total,
        }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_more: false,
            total: 0,
        }
    }
}

/// Default page size when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard ceiling on page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a client-requested page size into the allowed range
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Opaque keyset cursor.
///
/// Encodes the id of the last row on the previous page; the repository
/// anchors the next page strictly after that row in `(created_at, id)`
/// descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(pub Uuid);

impl Cursor {
    /// Encode the cursor as an opaque token
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.as_bytes())
    }

    /// Decode a client-supplied token, rejecting anything malformed
    pub fn decode(token: &str) -> Result<Self, String> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| "invalid cursor".to_string())?;
        let id = Uuid::from_slice(&bytes).map_err(|_| "invalid cursor".to_string())?;
        Ok(Cursor(id))
    }
}
