/// Authentication endpoints: login, registration, logout
///
/// Tokens are stateless. Logging in or registering mints a signed token;
/// logging out is an acknowledgment only, the client discards the token and
/// it remains formally valid until expiry.
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use taskdesk_shared::{
    auth::{
        jwt::{create_token, Claims},
        middleware::CurrentUser,
        password::{hash_password, verify_password},
    },
    models::user::{CreateUser, User},
};

use crate::{
    app::AppState,
    error::{validation_map, ApiError, ApiResult, FieldErrors},
};

use super::{require, MessageResponse};

/// `{"token": ...}` body returned by login and register
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Login request body; presence is checked in the handler
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration request body
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub name: Option<String>,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// `POST /auth/login`
///
/// Exchanges an email+password pair for a token. An unknown email and a
/// wrong password produce the same 402 response so accounts cannot be
/// enumerated here.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let mut errors = match req.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => validation_map(e),
    };

    let email = require(&mut errors, "email", &req.email);
    let password = require(&mut errors, "password", &req.password);

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let (email, password) = (email.unwrap(), password.unwrap());

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let claims = Claims::with_ttl(user.id, state.token_ttl());
    let token = create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(TokenResponse { token }))
}

/// `POST /auth/register`
///
/// Creates a regular (non-admin) account and logs it in. Admin accounts are
/// provisioned out of band; there is no path from here to the admin role.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let mut errors = match req.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => validation_map(e),
    };

    let name = require(&mut errors, "name", &req.name);
    let email = require(&mut errors, "email", &req.email);
    let password = require(&mut errors, "password", &req.password);

    if let Some(password) = password {
        if password.len() < 8 {
            errors
                .entry("password".to_string())
                .or_default()
                .push("The password must be at least 8 characters.".to_string());
        }
        if req.password_confirmation.as_deref() != Some(password) {
            errors
                .entry("password".to_string())
                .or_default()
                .push("The password confirmation does not match.".to_string());
        }
    }

    if let Some(email) = email {
        if errors.get("email").is_none() && User::email_exists(&state.db, email).await? {
            errors.insert(
                "email".to_string(),
                vec!["The email has already been taken.".to_string()],
            );
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let (name, email, password) = (name.unwrap(), email.unwrap(), password.unwrap());

    let password_hash = hash_password(password)?;

    // The unique index still backstops the pre-check above; a concurrent
    // duplicate insert maps back to the same email validation error.
    let user = User::create(
        &state.db,
        CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            is_admin: false,
        },
    )
    .await?;

    let claims = Claims::with_ttl(user.id, state.token_ttl());
    let token = create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.id, "user registered");

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// `DELETE /auth/logout`
///
/// Tokens are not tracked server side, so there is nothing to revoke; this
/// acknowledges the logout and the client discards its token.
pub async fn logout(Extension(user): Extension<CurrentUser>) -> ApiResult<Json<MessageResponse>> {
    tracing::info!(user_id = user.id, "user logged out");

    Ok(Json(MessageResponse::new(
        "You have logged out successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_tolerates_missing_fields() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }

    #[test]
    fn test_email_format_is_validated() {
        let req = LoginRequest {
            email: Some("not-an-email".to_string()),
            password: Some("secret".to_string()),
        };
        let errors = validation_map(req.validate().unwrap_err());
        assert_eq!(errors["email"], vec!["The email must be a valid email address."]);
    }

    #[test]
    fn test_absent_email_skips_format_validation() {
        let req = LoginRequest {
            email: None,
            password: Some("secret".to_string()),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_token_response_shape() {
        let body = serde_json::to_value(TokenResponse {
            token: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"token": "abc"}));
    }
}
