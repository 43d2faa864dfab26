/// Password Hashing and Verification
///
/// Argon2id with a fresh random salt per hash. The encoded output is a PHC
/// string (`$argon2id$v=19$m=65536,t=1,p=2$<salt>$<digest>`), so verification
/// reads the cost parameters back out of the stored hash.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::auth::error::AuthError;

/// Memory cost in KiB (64 MiB)
pub const MEMORY_COST_KIB: u32 = 64 * 1024;
/// Number of passes over memory
pub const TIME_COST: u32 = 1;
pub const PARALLELISM: u32 = 2;
/// Digest length in bytes
pub const OUTPUT_LEN: usize = 32;
/// Salt length in bytes
pub const SALT_LEN: usize = 16;

fn hasher() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| AuthError::HashingFailed(format!("invalid argon2 parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id
///
/// Empty passwords are hashed like any other input; policy checks belong to
/// the caller.
///
/// # Errors
/// Returns `HashingFailed` if the salt cannot be drawn from the OS random
/// source or the derivation runs out of resources.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|e| AuthError::HashingFailed(format!("salt generation failed: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::HashingFailed(format!("salt encoding failed: {}", e)))?;

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashingFailed(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against its encoded hash
///
/// The digest comparison is constant-time.
///
/// # Returns
/// `Ok(false)` when the password does not match.
///
/// # Errors
/// Returns `MalformedHash` if `hash` is not a parseable Argon2 PHC string or
/// lacks its salt or digest.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::MalformedHash(e.to_string()))?;
    if parsed.salt.is_none() || parsed.hash.is_none() {
        return Err(AuthError::MalformedHash("missing salt or digest".to_string()));
    }

    // Cost parameters come from the parsed hash, not from our constants.
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::MalformedHash(e.to_string())),
    }
}
