//! End-to-end flows: the draft review workflow and the settlement
//! lifecycle, exercised through the HTTP API.

mod helpers;

use axum::http::StatusCode;
use divvy_backend::models::Cursor;
use helpers::{parse_id, test_user, TestApp, TestUser};
use serde_json::{json, Value};
use uuid::Uuid;

async fn trip_group(app: &TestApp, alice: &TestUser, bob: &TestUser) -> Uuid {
    let group_id = app.create_group(alice, "Trip").await;
    app.add_member(group_id, alice, bob).await;
    group_id
}

// =============================================================================
// DRAFT REVIEW WORKFLOW
// =============================================================================

#[tokio::test]
async fn test_incomplete_draft_is_created_with_warnings() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (status, body) = app
        .post(&format!("/groups/{}/drafts", group_id), &alice, json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending_review");
    assert_eq!(body["source"], "manual");

    let warnings = body["validation_warnings"].as_array().expect("warnings");
    let warnings: Vec<&str> = warnings.iter().filter_map(Value::as_str).collect();
    assert!(warnings.contains(&"missing_amount"));
    assert!(warnings.contains(&"missing_payer"));
    assert!(warnings.contains(&"missing_description"));
}

#[tokio::test]
async fn test_low_confidence_parse_is_flagged() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (status, body) = app
        .post(
            &format!("/groups/{}/drafts", group_id),
            &alice,
            json!({
                "amount_cents": 4200,
                "description": "Receipt scan",
                "paid_by": alice.id,
                "source": "llm_parsed",
                "llm_metadata": { "model": "parser-v2", "confidence": 0.3 }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(
        body["validation_warnings"],
        json!(["low_parse_confidence"])
    );
}

#[tokio::test]
async fn test_draft_list_filters_by_status() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (_, draft) = app
        .post(&format!("/groups/{}/drafts", group_id), &alice, json!({}))
        .await;
    let draft_id = parse_id(&draft);

    let (status, body) = app
        .get(
            &format!("/groups/{}/drafts?status=pending_review", group_id),
            &alice,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["has_more"], false);
    assert_eq!(parse_id(&body["items"][0]), draft_id);

    let (status, body) = app
        .get(&format!("/groups/{}/drafts?status=approved", group_id), &alice)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().expect("items").is_empty());

    let (status, body) = app
        .get(&format!("/groups/{}/drafts?status=bogus", group_id), &alice)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn test_draft_list_rejects_cursor_for_unknown_draft() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (_, _) = app
        .post(&format!("/groups/{}/drafts", group_id), &alice, json!({}))
        .await;

    // Decodable token whose anchor draft does not exist.
    let token = Cursor(Uuid::new_v4()).encode();
    let (status, body) = app
        .get(
            &format!("/groups/{}/drafts?cursor={}", group_id, token),
            &alice,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_approving_amountless_draft_fails() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (_, draft) = app
        .post(&format!("/groups/{}/drafts", group_id), &alice, json!({}))
        .await;
    let draft_id = parse_id(&draft);

    let (status, body) = app
        .post_empty(&format!("/drafts/{}/approve", draft_id), &alice)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // Still pending; the failed approval must not have resolved it
    let (_, draft) = app.get(&format!("/drafts/{}", draft_id), &alice).await;
    assert_eq!(draft["status"], "pending_review");
}

#[tokio::test]
async fn test_approval_promotes_draft_to_expense() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (_, draft) = app
        .post(
            &format!("/groups/{}/drafts", group_id),
            &alice,
            json!({ "description": "Dinner", "paid_by": alice.id }),
        )
        .await;
    let draft_id = parse_id(&draft);

    // Reviewer supplies the missing amount at approval time
    let (status, body) = app
        .post(
            &format!("/drafts/{}/approve", draft_id),
            &bob,
            json!({ "amount_cents": 3000 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["draft"]["status"], "approved");
    assert_eq!(body["draft"]["reviewed_by"], bob.id.to_string());
    assert_eq!(body["expense"]["amount_cents"], 3000);
    assert_eq!(body["expense"]["paid_by"], alice.id.to_string());
    assert_eq!(body["expense"]["description"], "Dinner");

    // With no splits on the draft, the roster splits equally
    let splits = body["splits"].as_array().expect("splits");
    assert_eq!(splits.len(), 2);
    let total: i64 = splits.iter().map(|s| s["amount_cents"].as_i64().unwrap()).sum();
    assert_eq!(total, 3000);

    // The promoted expense is fetchable and linked from the draft
    let expense_id = parse_id(&body["expense"]);
    assert_eq!(body["draft"]["expense_id"], expense_id.to_string());
    let (status, expense) = app.get(&format!("/expenses/{}", expense_id), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(expense["amount_cents"], 3000);

    // And it now shows up in balances
    let (_, balances) = app
        .get(&format!("/groups/{}/balances", group_id), &alice)
        .await;
    let total: i64 = balances
        .as_array()
        .expect("array")
        .iter()
        .map(|b| b["net_cents"].as_i64().unwrap())
        .sum();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_resolved_draft_rejects_further_transitions() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (_, draft) = app
        .post(
            &format!("/groups/{}/drafts", group_id),
            &alice,
            json!({ "amount_cents": 500, "description": "Snacks", "paid_by": alice.id }),
        )
        .await;
    let draft_id = parse_id(&draft);

    let (status, _) = app
        .post_empty(&format!("/drafts/{}/approve", draft_id), &alice)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post_empty(&format!("/drafts/{}/approve", draft_id), &alice)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = app
        .post_empty(&format!("/drafts/{}/reject", draft_id), &alice)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejected_draft_creates_no_expense() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (_, draft) = app
        .post(
            &format!("/groups/{}/drafts", group_id),
            &alice,
            json!({ "amount_cents": 800, "description": "Dubious", "paid_by": alice.id }),
        )
        .await;
    let draft_id = parse_id(&draft);

    let (status, body) = app
        .post_empty(&format!("/drafts/{}/reject", draft_id), &bob)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["reviewed_by"], bob.id.to_string());

    let (_, expenses) = app
        .get(&format!("/groups/{}/expenses", group_id), &alice)
        .await;
    assert_eq!(expenses["total"], 0);
}

#[tokio::test]
async fn test_draft_endpoints_enforce_membership() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let mallory = test_user("mallory");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (_, draft) = app
        .post(&format!("/groups/{}/drafts", group_id), &alice, json!({}))
        .await;
    let draft_id = parse_id(&draft);

    let (status, _) = app.get(&format!("/drafts/{}", draft_id), &mallory).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post_empty(&format!("/drafts/{}/reject", draft_id), &mallory)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// SETTLEMENTS
// =============================================================================

#[tokio::test]
async fn test_settlement_lifecycle() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    // Bob owes Alice 500 after this
    let (status, _) = app
        .post(
            &format!("/groups/{}/expenses", group_id),
            &alice,
            json!({ "amount_cents": 1000, "description": "Tickets" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            &format!("/groups/{}/settlements", group_id),
            &bob,
            json!({ "from_user": bob.id, "to_user": alice.id, "amount_cents": 500 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending");
    let settlement_id = parse_id(&body);

    // Pending settlements do not move balances
    let (_, balances) = app
        .get(&format!("/groups/{}/balances", group_id), &alice)
        .await;
    let net = |balances: &Value, u: &Uuid| {
        balances
            .as_array()
            .expect("array")
            .iter()
            .find(|b| b["user_id"] == u.to_string())
            .and_then(|b| b["net_cents"].as_i64())
            .expect("balance")
    };
    assert_eq!(net(&balances, &alice.id), 500);
    assert_eq!(net(&balances, &bob.id), -500);

    let (status, body) = app
        .post_empty(&format!("/settlements/{}/complete", settlement_id), &alice)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "completed");
    assert!(body["resolved_at"].as_str().is_some());

    // Completed settlement zeroes the debt
    let (_, balances) = app
        .get(&format!("/groups/{}/balances", group_id), &alice)
        .await;
    assert_eq!(net(&balances, &alice.id), 0);
    assert_eq!(net(&balances, &bob.id), 0);

    // Terminal: no second resolution
    let (status, body) = app
        .post_empty(&format!("/settlements/{}/complete", settlement_id), &alice)
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    let (status, _) = app
        .post_empty(&format!("/settlements/{}/cancel", settlement_id), &alice)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancelled_settlement_never_counts() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;

    let (_, body) = app
        .post(
            &format!("/groups/{}/settlements", group_id),
            &bob,
            json!({ "from_user": bob.id, "to_user": alice.id, "amount_cents": 250 }),
        )
        .await;
    let settlement_id = parse_id(&body);

    let (status, body) = app
        .post_empty(&format!("/settlements/{}/cancel", settlement_id), &bob)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (_, balances) = app
        .get(&format!("/groups/{}/balances", group_id), &alice)
        .await;
    for balance in balances.as_array().expect("array") {
        assert_eq!(balance["net_cents"], 0);
    }
}

#[tokio::test]
async fn test_settlement_validation() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let mallory = test_user("mallory");
    let group_id = trip_group(&app, &alice, &bob).await;
    let path = format!("/groups/{}/settlements", group_id);

    // Non-positive amount
    let (status, _) = app
        .post(
            &path,
            &alice,
            json!({ "from_user": bob.id, "to_user": alice.id, "amount_cents": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Self-transfer
    let (status, _) = app
        .post(
            &path,
            &alice,
            json!({ "from_user": alice.id, "to_user": alice.id, "amount_cents": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Counterparty outside the group
    let (_, _) = app.get("/users/me", &mallory).await;
    let (status, _) = app
        .post(
            &path,
            &alice,
            json!({ "from_user": mallory.id, "to_user": alice.id, "amount_cents": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suggestions_settle_the_group() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let carol = test_user("carol");
    let group_id = app.create_group(&alice, "Trip").await;
    app.add_member(group_id, &alice, &bob).await;
    app.add_member(group_id, &alice, &carol).await;

    // Alice fronts 3000 for everyone
    let (status, _) = app
        .post(
            &format!("/groups/{}/expenses", group_id),
            &alice,
            json!({ "amount_cents": 3000, "description": "Cabin" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .get(
            &format!("/groups/{}/settlements/suggestions", group_id),
            &bob,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = body.as_array().expect("array").clone();
    // Two debtors, one creditor: two transfers suffice
    assert_eq!(suggestions.len(), 2);
    for s in &suggestions {
        assert_eq!(s["to_user"], alice.id.to_string());
        assert_eq!(s["amount_cents"], 1000);
    }

    // Recording and completing every suggestion settles the group
    for s in &suggestions {
        let (status, body) = app
            .post(
                &format!("/groups/{}/settlements", group_id),
                &alice,
                json!({
                    "from_user": s["from_user"],
                    "to_user": s["to_user"],
                    "amount_cents": s["amount_cents"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let settlement_id = parse_id(&body);
        let (status, _) = app
            .post_empty(&format!("/settlements/{}/complete", settlement_id), &alice)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, balances) = app
        .get(&format!("/groups/{}/balances", group_id), &alice)
        .await;
    for balance in balances.as_array().expect("array") {
        assert_eq!(balance["net_cents"], 0);
    }

    // Nothing left to suggest
    let (_, body) = app
        .get(
            &format!("/groups/{}/settlements/suggestions", group_id),
            &alice,
        )
        .await;
    assert!(body.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_settlement_list_is_scoped_to_group() {
    let app = TestApp::new().await;
    let alice = test_user("alice");
    let bob = test_user("bob");
    let group_id = trip_group(&app, &alice, &bob).await;
    let other = app.create_group(&alice, "Other").await;

    let (_, _) = app
        .post(
            &format!("/groups/{}/settlements", group_id),
            &alice,
            json!({ "from_user": bob.id, "to_user": alice.id, "amount_cents": 100 }),
        )
        .await;

    let (status, body) = app
        .get(&format!("/groups/{}/settlements", group_id), &alice)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 1);

    let (status, body) = app
        .get(&format!("/groups/{}/settlements", other), &alice)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().expect("array").is_empty());
}
