/// User Routes
///
/// Registration and credential updates.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::hash_password_blocking;
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::store::{Store, UserStore};
use crate::validators::{is_valid_email, is_valid_password};

/// Body of both POST and PUT /api/users
#[derive(Deserialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email or empty password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<UserCredentials>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");
    let UserCredentials { email, password } = form.into_inner();

    let email = is_valid_email(&email)?;
    is_valid_password(&password)?;
    let hashed_password = hash_password_blocking(password).await?;

    let user = store.create_user(&email, &hashed_password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/users
///
/// Replaces the caller's email and password.
/// **Requires valid access token**: `Authorization: Bearer <access_token>`
///
/// # Errors
/// - 401: Missing or invalid token (handled by middleware)
/// - 400: Invalid email or empty password
/// - 404: Caller no longer exists
/// - 409: Email taken by another user
pub async fn update_user(
    caller: web::ReqData<AuthenticatedUser>,
    form: web::Json<UserCredentials>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let AuthenticatedUser(user_id) = caller.into_inner();
    let context = ErrorContext::new("user_update").with_user_id(user_id);
    let UserCredentials { email, password } = form.into_inner();

    let email = is_valid_email(&email)?;
    is_valid_password(&password)?;
    let hashed_password = hash_password_blocking(password).await?;

    let user = store
        .update_user(user_id, &email, &hashed_password)
        .await
        .map_err(|e| context.fail(e))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User credentials updated"
    );

    Ok(HttpResponse::Ok().json(user))
}
