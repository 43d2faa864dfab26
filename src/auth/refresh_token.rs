/// Refresh Token Management
///
/// Refresh tokens are:
/// - 256 random bytes from the OS CSPRNG, hex-encoded (512 characters)
/// - persisted by the store together with their expiry and revocation time
/// - not rotated: refreshing an access token leaves the refresh token and its
///   expiry untouched until it expires or is explicitly revoked

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use uuid::Uuid;

use crate::auth::error::AuthError;

/// Number of random bytes behind each refresh token
pub const REFRESH_TOKEN_BYTES: usize = 256;

/// A persisted refresh token as returned by the store
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

// The token is a bearer secret; keep it out of logs
impl fmt::Debug for RefreshTokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRecord")
            .field("token", &"[redacted]")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("expires_at", &self.expires_at)
            .field("revoked_at", &self.revoked_at)
            .finish()
    }
}

/// Outcome of checking a looked-up refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenStatus {
    Valid,
    Expired,
    Revoked,
}

impl fmt::Display for RefreshTokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshTokenStatus::Valid => write!(f, "valid"),
            RefreshTokenStatus::Expired => write!(f, "expired"),
            RefreshTokenStatus::Revoked => write!(f, "revoked"),
        }
    }
}

/// Generate a new cryptographically secure refresh token
///
/// # Errors
/// Returns `EntropyUnavailable` if the OS random source cannot be read
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = vec![0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::EntropyUnavailable(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Decide whether a looked-up refresh token may be used at `now`
///
/// Revocation is checked before expiry, so a token that is both revoked and
/// expired reports `Revoked`.
pub fn evaluate_refresh_token(record: &RefreshTokenRecord, now: DateTime<Utc>) -> RefreshTokenStatus {
    if record.revoked_at.is_some() {
        RefreshTokenStatus::Revoked
    } else if now >= record.expires_at {
        RefreshTokenStatus::Expired
    } else {
        RefreshTokenStatus::Valid
    }
}
