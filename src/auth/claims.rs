/// JWT Claims structure
///
/// Registered claims (RFC 7519) carried by an access token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;

/// Issuer written into, and required from, every access token
pub const ISSUER: &str = "chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for `user_id` issued at `now` and expiring `ttl` later
    ///
    /// `ttl` may be zero or negative, producing an already-expired token.
    ///
    /// # Errors
    /// Returns `SigningFailed` if `now + ttl` is not a representable instant.
    pub fn new(user_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> Result<Self, AuthError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::SigningFailed("token lifetime out of range".to_string()))?;

        Ok(Self {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `MalformedToken` if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::MalformedToken("subject is not a valid user id".to_string()))
    }

    /// A token is expired from its `exp` second onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims::new(user_id, now, Duration::seconds(3600)).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, now.timestamp() + 3600);
        assert!(!claims.is_expired_at(now));
    }

    #[test]
    fn test_user_id_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Utc::now(), Duration::seconds(60)).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_invalid_user_id() {
        let mut claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::seconds(60)).unwrap();
        claims.sub = "invalid-uuid".to_string();

        assert!(matches!(claims.user_id(), Err(AuthError::MalformedToken(_))));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let zero = Claims::new(Uuid::new_v4(), now, Duration::zero()).unwrap();
        let negative = Claims::new(Uuid::new_v4(), now, Duration::seconds(-1)).unwrap();

        assert!(zero.is_expired_at(now));
        assert!(negative.is_expired_at(now));
    }

    #[test]
    fn test_ttl_overflow() {
        let result = Claims::new(Uuid::new_v4(), Utc::now(), Duration::max_value());
        assert!(matches!(result, Err(AuthError::SigningFailed(_))));
    }
}
