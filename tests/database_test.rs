//! Repository-level tests against an in-memory database: persistence
//! round trips, constraint enforcement, and the guarded terminal
//! transitions.

mod helpers;

use divvy_backend::models::{
    DraftSource, DraftStatus, Expense, ExpenseDraft, ExpenseSplit, Group, MemberRole, Settlement,
    SettlementStatus, SplitType, User,
};
use divvy_backend::AppState;
use helpers::TestApp;
use sqlx::types::Json;
use uuid::Uuid;

async fn seed_user(state: &AppState, email: &str) -> User {
    let user = User::new(email.to_string(), email.to_string(), None);
    state.user_repo.create(&user).await.expect("create user")
}

async fn seed_group(state: &AppState, admin: &User) -> Group {
    let group = Group::new("Test Group".to_string(), "USD".to_string(), admin.id);
    state
        .group_repo
        .create_with_admin(&group)
        .await
        .expect("create group")
}

#[tokio::test]
async fn test_user_round_trip_and_token_lookup() {
    let app = TestApp::new().await;
    let user = seed_user(&app.state, "ada@example.com").await;

    let by_email = app
        .state
        .user_repo
        .find_by_email("ada@example.com")
        .await
        .expect("query")
        .expect("found");
    assert_eq!(by_email.id, user.id);

    let by_token = app
        .state
        .user_repo
        .find_by_api_token(&user.api_token)
        .await
        .expect("query")
        .expect("found");
    assert_eq!(by_token.id, user.id);

    assert!(app
        .state
        .user_repo
        .find_by_api_token("nope")
        .await
        .expect("query")
        .is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    seed_user(&app.state, "ada@example.com").await;

    let dup = User::new("ada@example.com".to_string(), "Ada".to_string(), None);
    assert!(app.state.user_repo.create(&dup).await.is_err());
}

#[tokio::test]
async fn test_update_profile_keeps_unset_fields() {
    let app = TestApp::new().await;
    let user = seed_user(&app.state, "ada@example.com").await;

    let updated = app
        .state
        .user_repo
        .update_profile(user.id, Some("Countess"), None)
        .await
        .expect("query")
        .expect("found");
    assert_eq!(updated.display_name, "Countess");
    assert_eq!(updated.email, user.email);
}

#[tokio::test]
async fn test_group_creation_enrolls_admin() {
    let app = TestApp::new().await;
    let admin = seed_user(&app.state, "admin@example.com").await;
    let group = seed_group(&app.state, &admin).await;

    let members = app
        .state
        .group_member_repo
        .list_for_group(group.id)
        .await
        .expect("query");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, admin.id);
    assert!(members[0].is_admin());

    let mine = app
        .state
        .group_repo
        .list_for_user(admin.id)
        .await
        .expect("query");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, group.id);
}

#[tokio::test]
async fn test_duplicate_membership_is_rejected() {
    let app = TestApp::new().await;
    let admin = seed_user(&app.state, "admin@example.com").await;
    let group = seed_group(&app.state, &admin).await;

    let again = divvy_backend::models::GroupMember::new(group.id, admin.id, MemberRole::Member);
    assert!(app.state.group_member_repo.add(&again).await.is_err());
}

#[tokio::test]
async fn test_expense_requires_existing_group() {
    let app = TestApp::new().await;
    let user = seed_user(&app.state, "ada@example.com").await;

    let orphan = Expense::new(
        Uuid::new_v4(),
        user.id,
        500,
        "No group".to_string(),
        None,
        user.id,
    );
    assert!(app
        .state
        .expense_repo
        .create_with_splits(&orphan, &[])
        .await
        .is_err());
}

#[tokio::test]
async fn test_expense_amount_must_be_positive() {
    let app = TestApp::new().await;
    let admin = seed_user(&app.state, "admin@example.com").await;
    let group = seed_group(&app.state, &admin).await;

    let zero = Expense::new(group.id, admin.id, 0, "Free".to_string(), None, admin.id);
    assert!(app
        .state
        .expense_repo
        .create_with_splits(&zero, &[])
        .await
        .is_err());
}

#[tokio::test]
async fn test_expense_with_splits_round_trip() {
    let app = TestApp::new().await;
    let admin = seed_user(&app.state, "admin@example.com").await;
    let group = seed_group(&app.state, &admin).await;

    let expense = Expense::new(group.id, admin.id, 900, "Dinner".to_string(), None, admin.id);
    let splits = vec![ExpenseSplit::new(
        expense.id,
        admin.id,
        900,
        SplitType::Equal,
    )];
    app.state
        .expense_repo
        .create_with_splits(&expense, &splits)
        .await
        .expect("create");

    let found = app
        .state
        .expense_repo
        .find_by_id(expense.id)
        .await
        .expect("query")
        .expect("found");
    assert_eq!(found.amount_cents, 900);
    assert_eq!(found.description, "Dinner");

    let stored = app
        .state
        .expense_repo
        .splits_for_expense(expense.id)
        .await
        .expect("query");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].amount_cents, 900);
    assert_eq!(stored[0].split_type_enum(), SplitType::Equal);
}

fn pending_draft(group_id: Uuid, created_by: Uuid) -> ExpenseDraft {
    ExpenseDraft {
        id: Uuid::new_v4(),
        group_id,
        created_by,
        paid_by: Some(created_by),
        amount_cents: Some(1200),
        description: Some("Draft".to_string()),
        source: DraftSource::Manual.as_str().to_string(),
        llm_metadata: None,
        validation_warnings: Json(Vec::new()),
        splits: Json(Vec::new()),
        status: DraftStatus::PendingReview.as_str().to_string(),
        expense_id: None,
        reviewed_by: None,
        reviewed_at: None,
        created_at: chrono::Utc::now().naive_utc(),
    }
}

#[tokio::test]
async fn test_draft_json_columns_round_trip() {
    let app = TestApp::new().await;
    let admin = seed_user(&app.state, "admin@example.com").await;
    let group = seed_group(&app.state, &admin).await;

    let mut draft = pending_draft(group.id, admin.id);
    draft.llm_metadata = Some(Json(serde_json::json!({ "confidence": 0.9 })));
    draft.validation_warnings = Json(vec!["missing_description".to_string()]);
    app.state.draft_repo.create(&draft).await.expect("create");

    let found = app
        .state
        .draft_repo
        .find_by_id(draft.id)
        .await
        .expect("query")
        .expect("found");
    assert_eq!(found.validation_warnings.0, vec!["missing_description"]);
    let metadata = found.llm_metadata.expect("metadata");
    assert_eq!(metadata.0["confidence"], 0.9);
}

#[tokio::test]
async fn test_rejection_guard_only_hits_pending_drafts() {
    let app = TestApp::new().await;
    let admin = seed_user(&app.state, "admin@example.com").await;
    let group = seed_group(&app.state, &admin).await;
    let draft = pending_draft(group.id, admin.id);
    app.state.draft_repo.create(&draft).await.expect("create");

    let now = chrono::Utc::now().naive_utc();
    let updated = app
        .state
        .draft_repo
        .mark_rejected(draft.id, admin.id, now)
        .await
        .expect("update");
    assert_eq!(updated, 1);

    // Already rejected: the guard refuses a second transition
    let updated = app
        .state
        .draft_repo
        .mark_rejected(draft.id, admin.id, now)
        .await
        .expect("update");
    assert_eq!(updated, 0);

    let found = app
        .state
        .draft_repo
        .find_by_id(draft.id)
        .await
        .expect("query")
        .expect("found");
    assert_eq!(found.status, DraftStatus::Rejected.as_str());
    assert_eq!(found.reviewed_by, Some(admin.id));
}

#[tokio::test]
async fn test_settlement_resolve_guard_only_hits_pending() {
    let app = TestApp::new().await;
    let admin = seed_user(&app.state, "admin@example.com").await;
    let other = seed_user(&app.state, "other@example.com").await;
    let group = seed_group(&app.state, &admin).await;
    let member = divvy_backend::models::GroupMember::new(group.id, other.id, MemberRole::Member);
    app.state.group_member_repo.add(&member).await.expect("add");

    let settlement = Settlement::new(group.id, other.id, admin.id, 700);
    app.state
        .settlement_repo
        .create(&settlement)
        .await
        .expect("create");

    let now = chrono::Utc::now().naive_utc();
    let updated = app
        .state
        .settlement_repo
        .resolve(settlement.id, SettlementStatus::Completed, now)
        .await
        .expect("update");
    assert_eq!(updated, 1);

    let updated = app
        .state
        .settlement_repo
        .resolve(settlement.id, SettlementStatus::Cancelled, now)
        .await
        .expect("update");
    assert_eq!(updated, 0);

    let transfers = app
        .state
        .settlement_repo
        .completed_transfers_for_group(group.id)
        .await
        .expect("query");
    assert_eq!(transfers, vec![(other.id, admin.id, 700)]);
}
