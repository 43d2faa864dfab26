/// Credential and token errors
///
/// Every failure the auth core can report. The distinctions are kept here
/// even though the HTTP layer may collapse several of them into one response.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Salt generation or the hash derivation itself failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// The stored hash is not a valid encoded Argon2 hash.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    /// The signer rejected the secret or the claims.
    #[error("Token signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    TokenExpired,

    /// Token could not be decoded, or carries an unexpected issuer or subject.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// The OS random source could not be read.
    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Missing Authorization header")]
    MissingAuthorizationHeader,

    /// Authorization header present but not in the expected `<scheme> <value>` shape.
    #[error("Malformed Authorization header: {0}")]
    MalformedAuthorizationHeader(String),
}

impl AuthError {
    /// True for failures caused by the presented credential rather than the server.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::MalformedToken(_)
                | AuthError::MissingAuthorizationHeader
                | AuthError::MalformedAuthorizationHeader(_)
        )
    }
}
