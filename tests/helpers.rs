//! Shared test harness: an app instance over an in-memory database plus
//! request helpers that speak JSON through the full router.

// Each test binary uses a different slice of these helpers.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use divvy_backend::config::AppConfig;
use divvy_backend::database::run_migrations;
use divvy_backend::http;
use divvy_backend::http::auth::{TEST_USER_EMAIL_HEADER, TEST_USER_ID_HEADER};
use divvy_backend::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tower::ServiceExt;
use uuid::Uuid;

/// A caller identity for the test-header auth bypass. The server
/// registers it lazily on first request.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
}

pub fn test_user(name: &str) -> TestUser {
    TestUser {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", name),
    }
}

/// Full application wired to a private in-memory SQLite database.
///
/// A single pool connection keeps every query on the same in-memory
/// database.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_environment("development").await
    }

    pub async fn with_environment(environment: &str) -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid sqlite url")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory database");

        run_migrations(&pool).await.expect("Failed to run migrations");

        let config = AppConfig {
            environment: environment.to_string(),
            ..AppConfig::default()
        };
        let state = AppState::new(pool, config);
        let router = http::router(state.clone());

        Self { state, router }
    }

    /// Send one request through the router and decode the JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.raw_request(method, path, user, body).await;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body was not JSON")
        };
        (status, json)
    }

    /// Same as `request` but keeps the raw response for header assertions.
    pub async fn raw_request(
        &self,
        method: Method,
        path: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(user) = user {
            builder = builder
                .header(TEST_USER_ID_HEADER, user.id.to_string())
                .header(TEST_USER_EMAIL_HEADER, &user.email);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router returned an error")
    }

    pub async fn get(&self, path: &str, user: &TestUser) -> (StatusCode, Value) {
        self.request(Method::GET, path, Some(user), None).await
    }

    pub async fn post(
        &self,
        path: &str,
        user: &TestUser,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(user), Some(body)).await
    }

    /// POST with no body (approve/reject/complete/cancel endpoints)
    pub async fn post_empty(&self, path: &str, user: &TestUser) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(user), None).await
    }

    /// Create a group as `admin` and return its id
    pub async fn create_group(&self, admin: &TestUser, name: &str) -> Uuid {
        let (status, body) = self
            .post("/groups", admin, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        parse_id(&body)
    }

    /// Add `member` to a group as `admin`. Registers `member` first via a
    /// throwaway request so the foreign key exists.
    pub async fn add_member(&self, group_id: Uuid, admin: &TestUser, member: &TestUser) {
        let (status, _) = self.get("/users/me", member).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self
            .post(
                &format!("/groups/{}/members", group_id),
                admin,
                serde_json::json!({ "user_id": member.id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }
}

/// Pull the `id` field out of a JSON response
pub fn parse_id(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("missing id in {}", body))
}
