/// Request authentication context
///
/// The API's bearer-token layer validates the access token and inserts an
/// [`AuthContext`] into request extensions. Handlers extract it with
/// Axum's `Extension` extractor.
///
/// # Example
///
/// ```text
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication context added to request extensions after a successful
/// bearer-token validation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID ("sub" claim of the verified access token)
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context from verified access-token claims
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
