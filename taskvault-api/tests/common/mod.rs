/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup
/// - Test user creation
/// - Token generation
/// - Request/response helpers
///
/// Integration tests need a running PostgreSQL reachable via
/// `DATABASE_URL` and are marked `#[ignore]` so the default test run
/// stays database-free.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use sqlx::PgPool;
use taskvault_api::app::{build_router, AppState};
use taskvault_api::config::Config;
use taskvault_shared::auth::password;
use taskvault_shared::models::user::{CreateUser, User};
use tower::Service as _;
use uuid::Uuid;

/// Password used for all test users
pub const TEST_PASSWORD: &str = "test-password";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub state: AppState,
    pub user: User,
    pub access_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user
    pub async fn new() -> anyhow::Result<Self> {
        // Provide secrets when the environment doesn't
        if std::env::var("JWT_ACCESS_SECRET").is_err() {
            std::env::set_var(
                "JWT_ACCESS_SECRET",
                "test-access-secret-0123456789-0123456789",
            );
        }
        if std::env::var("JWT_REFRESH_SECRET").is_err() {
            std::env::set_var(
                "JWT_REFRESH_SECRET",
                "test-refresh-secret-0123456789-0123456789",
            );
        }

        let config = Config::from_env()?;

        // Connect to database and run migrations (path relative to
        // Cargo.toml, not this file)
        let db = PgPool::connect(&config.database.url).await?;
        sqlx::migrate!("../migrations").run(&db).await?;

        // Create a test user with a real password hash so login works
        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password(TEST_PASSWORD)?,
                name: Some("Test User".to_string()),
            },
        )
        .await?;

        // Build app and issue a token pair for the user
        let state = AppState::new(db.clone(), config);
        let pair = state.tokens.issue(&db, user.id).await?;
        let app = build_router(state.clone());

        Ok(TestContext {
            db,
            app,
            state,
            user,
            access_token: pair.access_token,
        })
    }

    /// Creates a second, unrelated user and returns their access token
    pub async fn other_user(&self) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("other-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password(TEST_PASSWORD)?,
                name: None,
            },
        )
        .await?;

        let pair = self.state.tokens.issue(&self.db, user.id).await?;
        Ok((user, pair.access_token))
    }

    /// Sends a request with an optional bearer token and JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().call(request).await.unwrap()
    }

    /// Sends a request carrying only the refresh-token cookie
    pub async fn send_with_cookie(&self, method: &str, uri: &str, cookie: &str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, format!("refreshToken={}", cookie))
            .body(Body::empty())
            .unwrap();

        self.app.clone().call(request).await.unwrap()
    }

    /// Cleans up test data (cascades to tasks and refresh tokens)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Reads a JSON response body, asserting the expected status first
pub async fn json_body(response: Response<Body>, expected: StatusCode) -> serde_json::Value {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    if status != expected {
        panic!(
            "Expected {}, got {}: {}",
            expected,
            status,
            String::from_utf8_lossy(&body)
        );
    }

    serde_json::from_slice(&body).unwrap()
}

/// Extracts the refreshToken cookie value from a response
pub fn refresh_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookie| {
            cookie
                .split(';')
                .next()
                .and_then(|pair| pair.strip_prefix("refreshToken="))
                .map(|value| value.to_string())
        })
}
