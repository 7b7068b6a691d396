/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: stateless HS256 bearer tokens
/// - [`middleware`]: request-boundary identity resolution for Axum
///
/// Tokens are stateless by design: there is no server-side session table and
/// no revocation list. Logout acknowledges and the client discards its
/// token; an unexpired token remains verifiable until it expires.
pub mod jwt;
pub mod middleware;
pub mod password;
