/// JWT Token Generation and Validation
///
/// Access tokens are HS256-signed JWTs. The server keeps no record of issued
/// tokens; a token is accepted as long as its signature matches the current
/// secret and its `exp` has not been reached.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::auth::error::AuthError;

/// Generate a new access token for a user
///
/// # Arguments
/// * `user_id` - User's UUID, written to the `sub` claim
/// * `secret` - HMAC signing secret
/// * `ttl` - Lifetime from now; zero or negative yields an already-expired token
///
/// # Errors
/// Returns `SigningFailed` if the secret is empty or the signer fails
pub fn issue_access_token(user_id: Uuid, secret: &[u8], ttl: Duration) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SigningFailed(
            "signing secret must not be empty".to_string(),
        ));
    }

    let claims = Claims::new(user_id, Utc::now(), ttl)?;

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::SigningFailed(e.to_string()))
}

/// Validate an access token and return the user it was issued for
///
/// The signature is checked before any claim, so a token signed with another
/// secret reports `InvalidSignature` even if it has also expired.
///
/// # Errors
/// * `InvalidSignature` - signature does not match `secret`
/// * `TokenExpired` - current time is at or past `exp`
/// * `MalformedToken` - undecodable token, wrong issuer or non-UUID subject
pub fn validate_access_token(token: &str, secret: &[u8]) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| {
            tracing::debug!("JWT validation error: {}", e);
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidIssuer => {
                    AuthError::MalformedToken("unexpected issuer".to_string())
                }
                _ => AuthError::MalformedToken(e.to_string()),
            }
        })?;

    // jsonwebtoken treats `exp == now` as still valid
    if data.claims.is_expired_at(Utc::now()) {
        return Err(AuthError::TokenExpired);
    }

    data.claims.user_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-1";

    #[test]
    fn test_generate_and_validate_token() {
        let user_id = Uuid::new_v4();

        let token = issue_access_token(user_id, SECRET, Duration::seconds(120))
            .expect("Failed to generate token");
        let validated = validate_access_token(&token, SECRET).expect("Failed to validate token");

        assert_eq!(validated, user_id);
    }

    #[test]
    fn test_tokens_differ_across_users_and_secrets() {
        let token1 = issue_access_token(Uuid::new_v4(), b"test-secret-1", Duration::seconds(120)).unwrap();
        let token2 = issue_access_token(Uuid::new_v4(), b"test-secret-2", Duration::seconds(180)).unwrap();
        let token3 = issue_access_token(Uuid::new_v4(), b"test-secret-3", Duration::seconds(180)).unwrap();

        assert_ne!(token1, token2);
        assert_ne!(token1, token3);
        assert_ne!(token2, token3);
    }

    #[test]
    fn test_expired_token() {
        let token = issue_access_token(Uuid::new_v4(), b"s", Duration::seconds(-1)).unwrap();
        let result = validate_access_token(&token, b"s");

        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::zero()).unwrap();

        assert_eq!(validate_access_token(&token, SECRET), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::seconds(120)).unwrap();
        let result = validate_access_token(&token, b"wrong-secret");

        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_wrong_secret_wins_over_expiry() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::seconds(-60)).unwrap();

        assert_eq!(
            validate_access_token(&token, b"wrong-secret"),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_invalid_token() {
        let result = validate_access_token("not.a.valid.token", SECRET);
        assert!(matches!(result, Err(AuthError::MalformedToken(_))));

        let result = validate_access_token("", SECRET);
        assert!(matches!(result, Err(AuthError::MalformedToken(_))));
    }

    #[test]
    fn test_tampered_token() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::seconds(120)).unwrap();

        let tampered = format!("{}X", token);
        assert_eq!(
            validate_access_token(&tampered, SECRET),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = issue_access_token(Uuid::new_v4(), b"", Duration::seconds(120));
        assert!(matches!(result, Err(AuthError::SigningFailed(_))));
    }

    fn sign(claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    #[test]
    fn test_non_uuid_subject() {
        let mut claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::seconds(120)).unwrap();
        claims.sub = "not-a-uuid".to_string();

        let result = validate_access_token(&sign(&claims), SECRET);
        assert!(matches!(result, Err(AuthError::MalformedToken(_))));
    }

    #[test]
    fn test_wrong_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::seconds(120)).unwrap();
        claims.iss = "someone-else".to_string();

        let result = validate_access_token(&sign(&claims), SECRET);
        assert!(matches!(result, Err(AuthError::MalformedToken(_))));
    }
}
