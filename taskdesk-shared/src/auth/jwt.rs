/// JWT token issuance and verification
///
/// Tokens are signed with HS256 (HMAC-SHA256) and bind a bearer to a user
/// identity for a limited time. Verification is stateless: a token is valid
/// if and only if its signature, issuer, expiry, and not-before checks pass
/// against the current clock and signing key. There is no revocation list;
/// logout is a client-side discard and an already-issued token stays valid
/// until it expires. This is an accepted limitation of the design.
///
/// Callers at the HTTP boundary must treat every verification failure the
/// same way. The error variants here exist for logging, not for
/// distinguishing failure reasons to clients.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-signing-secret-of-at-least-32-bytes!!";
/// let token = create_token(&Claims::new(42), secret)?;
///
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.sub, 42);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer claim stamped into every token
const ISSUER: &str = "taskdesk";

/// Default token lifetime
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode and sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token is malformed, unsigned, or signed with the wrong key
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Claims carried by a bearer token
///
/// - `sub`: the user's stable id
/// - `iss`: always "taskdesk"
/// - `iat` / `exp` / `nbf`: Unix timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: i64,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a user with the default expiration
    pub fn new(user_id: i64) -> Self {
        Self::with_ttl(user_id, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Creates claims with a custom lifetime
    pub fn with_ttl(user_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks whether the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a compact JWT string
///
/// Issuance never fails for a valid identity; the only failure mode is an
/// encoding error, which is surfaced as `JwtError::CreateError`.
///
/// The secret should be at least 32 bytes, randomly generated, and supplied
/// through configuration rather than hard-coded.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies a token and extracts its claims
///
/// Checks the signature, issuer, expiry, and not-before time. A malformed
/// token, a token signed with a different key, and an expired token are all
/// rejected; the distinction only matters for logs.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7);

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.iss, "taskdesk");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, DEFAULT_TTL_HOURS * 3600);
    }

    #[test]
    fn test_create_and_validate_token() {
        let token = create_token(&Claims::new(11), SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, 11);
        assert_eq!(validated.iss, "taskdesk");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&Claims::new(11), SECRET).expect("Should create token");

        let result = validate_token(&token, "another-secret-also-32-bytes-long!!!!");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_ttl(11, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_tampered_token() {
        let token = create_token(&Claims::new(11), SECRET).expect("Should create token");

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[1] = format!("x{}", &parts[1][1..]);
        let tampered = parts.join(".");

        assert!(validate_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_validate_garbage_token() {
        assert!(validate_token("not-a-token", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }
}
