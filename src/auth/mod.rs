/// Authentication module
///
/// Password hashing, access token issuing/validation, refresh token
/// generation/evaluation and Authorization header parsing. Everything here
/// is synchronous and holds no state; persistence lives in `crate::store`.

mod claims;
mod credentials;
mod error;
mod jwt;
mod password;
mod refresh_token;

pub use claims::{Claims, ISSUER};
pub use credentials::{extract_api_key, extract_bearer, HeaderLookup};
pub use error::AuthError;
pub use jwt::issue_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::{
    evaluate_refresh_token, generate_refresh_token, RefreshTokenRecord, RefreshTokenStatus,
};
