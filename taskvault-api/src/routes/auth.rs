/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Refresh-token rotation
/// - Logout (revokes all refresh tokens)
///
/// The refresh token only ever travels in an httpOnly cookie; the access
/// token is returned in the response body and presented as a bearer token.
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get tokens
/// - `POST /api/auth/refresh` - Rotate the refresh token
/// - `POST /api/auth/logout` - Revoke all refresh tokens

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use taskvault_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use validator::Validate;

/// Name of the refresh-token cookie
const REFRESH_COOKIE: &str = "refreshToken";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub id: String,

    /// Email address
    pub email: String,

    /// Display name
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Authenticated user (password hash never serialized)
    pub user: User,

    /// Access token
    pub access_token: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Confirmation message
    pub message: String,
}

/// Builds the refresh-token cookie
///
/// httpOnly and SameSite=Strict always; Secure only in production so
/// local development over plain HTTP still works.
fn refresh_cookie(state: &AppState, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_secure(state.config.api.production);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::days(state.config.jwt.refresh_expiry_days));
    cookie
}

/// Builds an expired cookie that clears the refresh token
///
/// Carries the same attributes as the setting cookie; a mismatch would
/// make some user agents treat it as a different cookie and keep the
/// original alive.
fn clear_refresh_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = refresh_cookie(state, String::new());
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "SecureP@ss123",
///   "name": "John Doe"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already exists
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    // Validate request
    req.validate().map_err(ApiError::from_validation)?;

    // Hash password. The raw password is never persisted or logged.
    let password_hash = password::hash_password(&req.password)?;

    // Create user. A duplicate email surfaces as a unique-constraint
    // violation and maps to 409 Conflict.
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
        }),
    ))
}

/// Login endpoint
///
/// Authenticates a user, returns the access token in the body and sets
/// the refresh token as an httpOnly cookie.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials (same message whether the
///   email is unknown or the password is wrong)
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    // Validate request
    req.validate().map_err(ApiError::from_validation)?;

    // Find user by email
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    // Verify password
    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    // Issue a token pair and persist the refresh-token hash
    let pair = state.tokens.issue(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    let jar = jar.add(refresh_cookie(&state, pair.refresh_token));

    Ok((
        jar,
        Json(LoginResponse {
            user,
            access_token: pair.access_token,
        }),
    ))
}

/// Token refresh endpoint
///
/// Rotates the refresh token presented in the cookie: the old token is
/// revoked and a fresh pair is issued. The token's signature is verified
/// before its payload is trusted; a replayed (already rotated) token
/// fails with 401.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/refresh
/// Cookie: refreshToken=eyJ...
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing cookie, invalid signature, expired,
///   revoked, or already-rotated token
/// - `500 Internal Server Error`: Server error
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<RefreshResponse>)> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".to_string()))?;

    // Signature check first; only a verified payload names the user
    let user_id = state.tokens.verify_refresh(&presented)?;

    // Rotate: single-use, atomic revoke of the presented token
    let pair = state.tokens.rotate(&state.db, user_id, &presented).await?;

    let jar = jar.add(refresh_cookie(&state, pair.refresh_token));

    Ok((
        jar,
        Json(RefreshResponse {
            access_token: pair.access_token,
        }),
    ))
}

/// Logout endpoint
///
/// Revokes every refresh token belonging to the caller and clears the
/// cookie. Requires a valid access token.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/logout
/// Authorization: Bearer eyJ...
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid access token
/// - `500 Internal Server Error`: Server error
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<LogoutResponse>)> {
    state.tokens.revoke_all(&state.db, auth.user_id).await?;

    tracing::info!(user_id = %auth.user_id, "User logged out");

    let jar = jar.add(clear_refresh_cookie(&state));

    Ok((
        jar,
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    ))
}
