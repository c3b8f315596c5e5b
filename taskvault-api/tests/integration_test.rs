/// Integration tests for the TaskVault API
///
/// These tests verify the full system works end-to-end:
/// - Registration, login and the refresh-token lifecycle
/// - Task CRUD with owner isolation
/// - Status transition enforcement
/// - Pagination and filtering
///
/// All tests require a running PostgreSQL reachable via `DATABASE_URL`
/// and are marked `#[ignore]`; run them with `cargo test -- --ignored`.

mod common;

use axum::http::StatusCode;
use common::{json_body, refresh_cookie, TestContext, TEST_PASSWORD};
use serde_json::json;
use taskvault_shared::models::refresh_token::RefreshToken;

/// Register, login, create a task, complete it, refresh, logout
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_full_user_journey() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("journey-{}@example.com", uuid::Uuid::new_v4());

    // Register
    let response = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": email, "password": "pw123" })),
        )
        .await;
    let body = json_body(response, StatusCode::CREATED).await;
    assert_eq!(body["email"], email);
    let journey_user_id: uuid::Uuid = body["id"].as_str().unwrap().parse().unwrap();

    // Login
    let response = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "pw123" })),
        )
        .await;
    let cookie = refresh_cookie(&response).expect("login should set the refresh cookie");
    let body = json_body(response, StatusCode::OK).await;
    let access_token = body["access_token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["email"], email);
    assert!(
        body["user"].get("password_hash").is_none(),
        "password hash must never be serialized"
    );

    // Create a task
    let response = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&access_token),
            Some(json!({ "title": "Write report", "description": "Q3 numbers" })),
        )
        .await;
    let task = json_body(response, StatusCode::CREATED).await;
    assert_eq!(task["status"], "TODO");
    let task_id = task["id"].as_str().unwrap().to_string();

    // TODO -> IN_PROGRESS -> DONE
    let response = ctx
        .send(
            "PATCH",
            &format!("/api/tasks/{}/toggle", task_id),
            Some(&access_token),
            Some(json!({ "status": "IN_PROGRESS" })),
        )
        .await;
    let task = json_body(response, StatusCode::OK).await;
    assert_eq!(task["status"], "IN_PROGRESS");

    let response = ctx
        .send(
            "PATCH",
            &format!("/api/tasks/{}/toggle", task_id),
            Some(&access_token),
            Some(json!({ "status": "DONE" })),
        )
        .await;
    let task = json_body(response, StatusCode::OK).await;
    assert_eq!(task["status"], "DONE");

    // Rotate the refresh token; the old cookie must stop working
    let response = ctx
        .send_with_cookie("POST", "/api/auth/refresh", &cookie)
        .await;
    let new_cookie = refresh_cookie(&response).expect("refresh should rotate the cookie");
    let body = json_body(response, StatusCode::OK).await;
    assert!(body["access_token"].is_string());
    assert_ne!(new_cookie, cookie);

    // Rotation revokes the old token and persists exactly one new one
    let active = RefreshToken::count_active_for_user(&ctx.db, journey_user_id)
        .await
        .unwrap();
    assert_eq!(active, 1);

    let response = ctx
        .send_with_cookie("POST", "/api/auth/refresh", &cookie)
        .await;
    assert_eq!(
        response.status(),
        StatusCode::UNAUTHORIZED,
        "a rotated refresh token must be single-use"
    );

    // Logout revokes everything, including the freshly rotated token
    let response = ctx
        .send("POST", "/api/auth/logout", Some(&access_token), None)
        .await;
    // The clearing cookie must carry the same attributes as the
    // setting one, or user agents may keep the original alive
    let cleared = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("logout should clear the refresh cookie")
        .to_string();
    assert!(cleared.starts_with("refreshToken="));
    assert!(cleared.contains("Max-Age=0"));
    assert!(cleared.contains("HttpOnly"));
    assert!(cleared.contains("SameSite=Strict"));
    json_body(response, StatusCode::OK).await;

    let active = RefreshToken::count_active_for_user(&ctx.db, journey_user_id)
        .await
        .unwrap();
    assert_eq!(active, 0);

    let response = ctx
        .send_with_cookie("POST", "/api/auth/refresh", &new_cookie)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Duplicate registration maps the unique-constraint violation to 409
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_register_duplicate_email_conflicts() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": ctx.user.email, "password": "pw123" })),
        )
        .await;
    let body = json_body(response, StatusCode::CONFLICT).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "conflict");

    ctx.cleanup().await.unwrap();
}

/// Login failures are indistinguishable between bad email and bad password
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_login_error_does_not_leak_account_existence() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    let unknown_email = json_body(response, StatusCode::UNAUTHORIZED).await;

    let response = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": ctx.user.email, "password": "wrong-password" })),
        )
        .await;
    let wrong_password = json_body(response, StatusCode::UNAUTHORIZED).await;

    assert_eq!(
        unknown_email["error"]["message"],
        wrong_password["error"]["message"]
    );

    ctx.cleanup().await.unwrap();
}

/// Task routes reject requests without a valid access token
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_tasks_require_authentication() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.send("GET", "/api/tasks", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .send("GET", "/api/tasks", Some("not-a-jwt"), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Another user's task is a 404, never a 403
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_owner_isolation() {
    let ctx = TestContext::new().await.unwrap();
    let (_other, other_token) = ctx.other_user().await.unwrap();

    let response = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&ctx.access_token),
            Some(json!({ "title": "Private task" })),
        )
        .await;
    let task = json_body(response, StatusCode::CREATED).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    // Read, update, delete and toggle all see nothing
    let uri = format!("/api/tasks/{}", task_id);
    let response = ctx.send("GET", &uri, Some(&other_token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .send("PATCH", &uri, Some(&other_token), Some(json!({ "title": "Stolen" })))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx.send("DELETE", &uri, Some(&other_token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .send(
            "PATCH",
            &format!("/api/tasks/{}/toggle", task_id),
            Some(&other_token),
            Some(json!({ "status": "IN_PROGRESS" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner still sees the task untouched
    let response = ctx.send("GET", &uri, Some(&ctx.access_token), None).await;
    let task = json_body(response, StatusCode::OK).await;
    assert_eq!(task["title"], "Private task");
    assert_eq!(task["status"], "TODO");

    ctx.cleanup().await.unwrap();
}

/// Illegal transitions come back as 400 with the invalid_transition code
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_invalid_status_transitions() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&ctx.access_token),
            Some(json!({ "title": "State machine" })),
        )
        .await;
    let task = json_body(response, StatusCode::CREATED).await;
    let task_id = task["id"].as_str().unwrap().to_string();
    let toggle_uri = format!("/api/tasks/{}/toggle", task_id);

    // TODO -> DONE skips IN_PROGRESS
    let response = ctx
        .send(
            "PATCH",
            &toggle_uri,
            Some(&ctx.access_token),
            Some(json!({ "status": "DONE" })),
        )
        .await;
    let body = json_body(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"]["code"], "invalid_transition");

    // Same-state transition is rejected too
    let response = ctx
        .send(
            "PATCH",
            &toggle_uri,
            Some(&ctx.access_token),
            Some(json!({ "status": "TODO" })),
        )
        .await;
    let body = json_body(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"]["code"], "invalid_transition");

    // ARCHIVED is terminal
    let response = ctx
        .send(
            "PATCH",
            &toggle_uri,
            Some(&ctx.access_token),
            Some(json!({ "status": "ARCHIVED" })),
        )
        .await;
    json_body(response, StatusCode::OK).await;

    let response = ctx
        .send(
            "PATCH",
            &toggle_uri,
            Some(&ctx.access_token),
            Some(json!({ "status": "IN_PROGRESS" })),
        )
        .await;
    let body = json_body(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"]["code"], "invalid_transition");

    ctx.cleanup().await.unwrap();
}

/// Listing paginates newest-first and filters by status and title search
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_list_pagination_and_filters() {
    let ctx = TestContext::new().await.unwrap();

    for i in 0..5 {
        let response = ctx
            .send(
                "POST",
                "/api/tasks",
                Some(&ctx.access_token),
                Some(json!({ "title": format!("Task number {}", i) })),
            )
            .await;
        json_body(response, StatusCode::CREATED).await;
    }

    // First page of two
    let response = ctx
        .send(
            "GET",
            "/api/tasks?page=1&limit=2",
            Some(&ctx.access_token),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
    // Newest created first
    assert_eq!(body["tasks"][0]["title"], "Task number 4");

    // Last page holds the remainder
    let response = ctx
        .send(
            "GET",
            "/api/tasks?page=3&limit=2",
            Some(&ctx.access_token),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

    // Title search is a case-insensitive substring match
    let response = ctx
        .send(
            "GET",
            "/api/tasks?search=NUMBER%203",
            Some(&ctx.access_token),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["tasks"][0]["title"], "Task number 3");

    // Status filter
    let response = ctx
        .send(
            "GET",
            "/api/tasks?status=DONE",
            Some(&ctx.access_token),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["total"], 0);

    // Invalid pagination is a 400
    let response = ctx
        .send("GET", "/api/tasks?page=0", Some(&ctx.access_token), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A page value whose offset would overflow is a 400, not a 500
    let response = ctx
        .send(
            "GET",
            &format!("/api/tasks?page={}&limit=100", i64::MAX),
            Some(&ctx.access_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// Partial updates leave untouched fields alone and can clear description
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_partial_update() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&ctx.access_token),
            Some(json!({ "title": "Original", "description": "Keep me" })),
        )
        .await;
    let task = json_body(response, StatusCode::CREATED).await;
    let uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    // Title-only update keeps the description
    let response = ctx
        .send(
            "PATCH",
            &uri,
            Some(&ctx.access_token),
            Some(json!({ "title": "Renamed" })),
        )
        .await;
    let task = json_body(response, StatusCode::OK).await;
    assert_eq!(task["title"], "Renamed");
    assert_eq!(task["description"], "Keep me");

    // Explicit null clears the description
    let response = ctx
        .send(
            "PATCH",
            &uri,
            Some(&ctx.access_token),
            Some(json!({ "description": null })),
        )
        .await;
    let task = json_body(response, StatusCode::OK).await;
    assert_eq!(task["title"], "Renamed");
    assert!(task["description"].is_null());

    ctx.cleanup().await.unwrap();
}

/// Health endpoint works without authentication
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    for uri in ["/", "/health"] {
        let response = ctx.send("GET", uri, None, None).await;
        let body = json_body(response, StatusCode::OK).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "connected");
    }

    ctx.cleanup().await.unwrap();
}
