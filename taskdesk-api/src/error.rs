/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`; every error is recovered here and
/// mapped to a JSON body plus status code, so no request failure is fatal
/// to the process.
///
/// The wire contract for every failure is
/// `{"errors": <string | {field: [messages]}>}`:
///
/// - validation failures carry the field→messages map (400)
/// - bad credentials are 402 with a fixed string
/// - missing/invalid tokens are 401, role and scope denials 403
/// - absent entities referenced by admins are 404
/// - resubmitting a task is 400 with a fixed string
///
/// Internal errors are logged through tracing and answered with a generic
/// body; details never reach the client.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use taskdesk_shared::{
    auth::{jwt::JwtError, middleware::AuthError, password::PasswordError},
    workflow::WorkflowError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Field name → list of messages, as rendered in validation error bodies
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing input fields (400, field map body)
    Validation(FieldErrors),

    /// Request is well-formed but rejected (400, string body)
    BadRequest(String),

    /// Missing or invalid bearer token (401)
    Unauthorized,

    /// Authenticated but disallowed: wrong role or wrong scope (403)
    Forbidden(String),

    /// Referenced entity is absent (404)
    NotFound(String),

    /// Email+password pair did not resolve to a user (402)
    InvalidCredentials,

    /// Internal server error (500); message is logged, not exposed
    Internal(String),
}

impl ApiError {
    /// Builds a validation error with a single field and message
    pub fn field(name: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(name.to_string(), vec![message.to_string()]);
        ApiError::Validation(errors)
    }
}

/// Flattens `validator` output into the field→messages map
pub fn validation_map(errors: validator::ValidationErrors) -> FieldErrors {
    let mut map = FieldErrors::new();

    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid.", field))
            })
            .collect();
        map.insert(field.to_string(), messages);
    }

    map
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            ApiError::Validation(map) => (StatusCode::BAD_REQUEST, json!(map)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!("unauthenticated")),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!(msg)),
            ApiError::InvalidCredentials => (
                StatusCode::PAYMENT_REQUIRED,
                json!("email or password is invalid, try again"),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!("internal server error"),
                )
            }
        };

        (status, Json(json!({ "errors": errors }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique email violations surface as a validation error on
                // the email field, matching the registration contract.
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::field("email", "The email has already been taken.");
                    }
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::TaskNotFound | WorkflowError::UserNotFound => {
                ApiError::NotFound(err.to_string())
            }
            WorkflowError::NotAssignee => ApiError::Forbidden(err.to_string()),
            WorkflowError::AlreadySubmitted => ApiError::BadRequest(err.to_string()),
            WorkflowError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // All credential problems collapse to the same 401; the reason
            // is never surfaced to the caller.
            AuthError::MissingCredentials
            | AuthError::InvalidToken(_)
            | AuthError::UnknownUser => ApiError::Unauthorized,
            AuthError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(_: JwtError) -> Self {
        ApiError::Unauthorized
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::field("title", "required").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("forbidden".to_string())
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            ApiError::Internal("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_workflow_error_mapping() {
        assert!(matches!(
            ApiError::from(WorkflowError::TaskNotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(WorkflowError::NotAssignee),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(WorkflowError::AlreadySubmitted),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn test_auth_errors_are_indistinguishable() {
        // Expired, malformed, and unknown-subject tokens all map to the
        // same variant.
        for err in [
            AuthError::MissingCredentials,
            AuthError::InvalidToken("expired".to_string()),
            AuthError::InvalidToken("bad signature".to_string()),
            AuthError::UnknownUser,
        ] {
            assert!(matches!(ApiError::from(err), ApiError::Unauthorized));
        }
    }

    #[test]
    fn test_single_field_helper() {
        let err = ApiError::field("email", "The email has already been taken.");
        let ApiError::Validation(map) = err else {
            panic!("expected validation error");
        };
        assert_eq!(map["email"], vec!["The email has already been taken."]);
    }
}
