mod admin;
mod auth;
mod health_check;
mod users;
mod webhooks;

pub use admin::{metrics, reset};
pub use auth::{login, refresh, revoke};
pub use health_check::health_check;
pub use users::{create_user, update_user};
pub use webhooks::polka_webhook;

use actix_web::web;

use crate::error::AppError;

// Argon2 is deliberately slow; keep it off the async workers.

async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    web::block(move || crate::auth::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AppError> {
    web::block(move || crate::auth::verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))?
        .map_err(AppError::from)
}
