/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::verify_password_blocking;
use crate::auth::{
    evaluate_refresh_token, extract_bearer, generate_refresh_token, issue_access_token,
    RefreshTokenStatus,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, ErrorContext};
use crate::store::{RefreshTokenStore, Store, StoreError, UserStore};

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User plus freshly issued tokens
#[derive(Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// Returns an access token and a new refresh token.
///
/// # Errors
/// - 401: Unknown email or wrong password (same response for both)
/// - 500: Hashing, signing or storage failure
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<dyn Store>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let LoginRequest { email, password } = form.into_inner();

    let user = match store.get_user_by_email(email.trim()).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => return Err(context.fail(AppError::InvalidCredentials)),
        Err(e) => return Err(context.fail(e)),
    };
    let context = context.with_user_id(user.id);

    if !verify_password_blocking(password, user.hashed_password.clone())
        .await
        .map_err(|e| context.fail(e))?
    {
        return Err(context.fail(AppError::InvalidCredentials));
    }

    let token = issue_access_token(user.id, auth.signing_secret(), auth.access_token_ttl())?;
    let refresh_token = generate_refresh_token()?;
    store
        .insert_refresh_token(&refresh_token, user.id, Utc::now() + auth.refresh_token_ttl())
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: user.id,
        created_at: user.created_at,
        updated_at: user.updated_at,
        email: user.email,
        is_chirpy_red: user.is_chirpy_red,
        token,
        refresh_token,
    }))
}

/// POST /api/refresh
///
/// Exchanges `Authorization: Bearer <refresh_token>` for a new access token.
/// The refresh token itself is neither replaced nor extended.
///
/// # Errors
/// - 401: Missing header, or unknown, expired or revoked refresh token
pub async fn refresh(
    req: HttpRequest,
    store: web::Data<dyn Store>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");
    let presented = extract_bearer(req.headers())?;

    let record = match store.lookup_refresh_token(presented).await {
        Ok(record) => record,
        Err(StoreError::NotFound(_)) => return Err(context.fail(AppError::UnknownRefreshToken)),
        Err(e) => return Err(context.fail(e)),
    };
    let context = context.with_user_id(record.user_id);

    match evaluate_refresh_token(&record, Utc::now()) {
        RefreshTokenStatus::Valid => {}
        status => return Err(context.fail(AppError::RefreshTokenRejected(status))),
    }

    let token = issue_access_token(record.user_id, auth.signing_secret(), auth.access_token_ttl())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %record.user_id,
        "Access token refreshed"
    );

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Revokes `Authorization: Bearer <refresh_token>`. Revoking an already
/// revoked token succeeds.
///
/// # Errors
/// - 401: Missing header or unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_revoke");
    let presented = extract_bearer(req.headers())?;

    match store.revoke_refresh_token(presented).await {
        Ok(()) => {}
        Err(StoreError::NotFound(_)) => return Err(context.fail(AppError::UnknownRefreshToken)),
        Err(e) => return Err(context.fail(e)),
    }

    tracing::info!(request_id = %context.request_id, "Refresh token revoked");

    Ok(HttpResponse::NoContent().finish())
}
