/// Request authentication for Axum
///
/// Resolves the caller's identity exactly once at the request boundary and
/// threads it through as a [`CurrentUser`] request extension. Handlers and
/// guards read the extension; nothing recovers identity through an ambient
/// lookup.
///
/// A caller is authenticated when the `Authorization: Bearer <token>` header
/// carries a token that verifies against the signing key AND resolves to an
/// existing user row. Every token failure produces the same 401 response;
/// clients cannot tell a malformed token from an expired one.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, http::HeaderMap};
/// use sqlx::PgPool;
/// use taskdesk_shared::auth::middleware::{authenticate, CurrentUser};
///
/// async fn boundary(pool: &PgPool, headers: &HeaderMap) {
///     match authenticate(pool, "signing-secret", headers).await {
///         Ok(user) => println!("caller is user {}", user.id),
///         Err(e) => println!("rejected: {}", e),
///     }
/// }
/// ```
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use super::jwt::validate_token;
use crate::models::user::User;

/// Identity of the authenticated caller, resolved at the request boundary
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The caller's user id
    pub id: i64,

    /// Whether the caller has the admin role
    pub is_admin: bool,
}

impl CurrentUser {
    /// Builds the identity from a freshly loaded user row
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            is_admin: user.is_admin,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable bearer token in the Authorization header
    #[error("Missing bearer token")]
    MissingCredentials,

    /// Token failed verification (malformed, wrong key, or expired)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token verified but the subject no longer exists
    #[error("Unknown user")]
    UnknownUser,

    /// Database error while resolving the user
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // One body for every credential problem; only infrastructure
        // failures get a different status.
        match self {
            AuthError::Database(e) => {
                tracing::error!("Auth lookup failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "errors": "internal server error" })),
                )
                    .into_response()
            }
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "errors": "unauthenticated" })),
            )
                .into_response(),
        }
    }
}

/// Extracts the bearer token from an Authorization header, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Authenticates a request against the token service and user table
///
/// Verifies the bearer token, then loads the subject's user row so role
/// checks downstream see current data rather than whatever was true at
/// token issuance.
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<CurrentUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingCredentials)?;

    let claims =
        validate_token(token, secret).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    Ok(CurrentUser::from_user(&user))
}

/// Checks whether the request carries a token that would authenticate
///
/// Used by the guest-only guard on login/register: an already-authenticated
/// caller is rejected there, while absent or invalid tokens fall through to
/// the handler. No user lookup is performed.
pub fn holds_valid_token(secret: &str, headers: &HeaderMap) -> bool {
    bearer_token(headers)
        .map(|token| validate_token(token, secret).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_holds_valid_token() {
        let token = create_token(&Claims::new(1), SECRET).unwrap();

        assert!(holds_valid_token(
            SECRET,
            &headers_with(&format!("Bearer {}", token))
        ));
        assert!(!holds_valid_token(SECRET, &headers_with("Bearer junk")));
        assert!(!holds_valid_token(SECRET, &HeaderMap::new()));
    }

    #[test]
    fn test_auth_error_responses() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Invalid and expired tokens map to the identical status
        let response = AuthError::InvalidToken("expired".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::UnknownUser.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
