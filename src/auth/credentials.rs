/// Authorization header parsing
///
/// Purely syntactic: checks the scheme prefix and hands back the rest of the
/// value untouched. Whether the credential is any good is decided by whoever
/// consumes it.

use actix_web::http::header::HeaderMap;
use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::auth::error::AuthError;

pub const AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";
pub const API_KEY_PREFIX: &str = "ApiKey ";

/// Read-only access to request headers by case-insensitive name
pub trait HeaderLookup {
    /// Raw bytes of the first header named `name`, if any.
    fn header(&self, name: &str) -> Option<&[u8]>;
}

impl HeaderLookup for HeaderMap {
    fn header(&self, name: &str) -> Option<&[u8]> {
        self.get(name).map(|value| value.as_bytes())
    }
}

impl<S: BuildHasher> HeaderLookup for HashMap<String, String, S> {
    fn header(&self, name: &str) -> Option<&[u8]> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_bytes())
    }
}

/// Extract the token from `Authorization: Bearer <token>`
///
/// # Errors
/// * `MissingAuthorizationHeader` - no Authorization header
/// * `MalformedAuthorizationHeader` - header does not start with `Bearer `
pub fn extract_bearer<H: HeaderLookup + ?Sized>(headers: &H) -> Result<&str, AuthError> {
    extract_with_prefix(headers, BEARER_PREFIX)
}

/// Extract the key from `Authorization: ApiKey <key>`
///
/// # Errors
/// * `MissingAuthorizationHeader` - no Authorization header
/// * `MalformedAuthorizationHeader` - header does not start with `ApiKey `
pub fn extract_api_key<H: HeaderLookup + ?Sized>(headers: &H) -> Result<&str, AuthError> {
    extract_with_prefix(headers, API_KEY_PREFIX)
}

fn extract_with_prefix<'a, H: HeaderLookup + ?Sized>(
    headers: &'a H,
    prefix: &str,
) -> Result<&'a str, AuthError> {
    let raw = headers
        .header(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorizationHeader)?;

    let value = std::str::from_utf8(raw).map_err(|_| {
        AuthError::MalformedAuthorizationHeader("header value is not valid UTF-8".to_string())
    })?;

    // Remainder is returned verbatim, even when empty
    value.strip_prefix(prefix).ok_or_else(|| {
        AuthError::MalformedAuthorizationHeader(format!(
            "expected `{}` scheme",
            prefix.trim_end()
        ))
    })
}
