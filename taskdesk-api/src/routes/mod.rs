/// API route handlers, organized by resource
///
/// - `health`: liveness/readiness probe
/// - `auth`: login, registration, logout
/// - `projects`: admin CRUD plus the caller's derived project views
/// - `tasks`: admin CRUD, assignment, submission, and the caller's views
///
/// Request bodies are deserialized with every field optional and presence
/// is checked here, so a missing field produces the standard
/// `{"errors": {field: [messages]}}` body instead of a deserialization
/// rejection.
use serde::Serialize;

use crate::error::FieldErrors;

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;

/// `{"message": ...}` success body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Records a required-field error when `value` is absent, returning the
/// value otherwise
pub(crate) fn require<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: &'a Option<String>,
) -> Option<&'a str> {
    match value {
        Some(v) => Some(v.as_str()),
        None => {
            errors.insert(
                field.to_string(),
                vec![format!("The {} field is required.", field.replace('_', " "))],
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present_and_absent() {
        let mut errors = FieldErrors::new();

        assert_eq!(
            require(&mut errors, "title", &Some("x".to_string())),
            Some("x")
        );
        assert!(errors.is_empty());

        assert_eq!(require(&mut errors, "project_id", &None), None);
        assert_eq!(errors["project_id"], vec!["The project id field is required."]);
    }
}
