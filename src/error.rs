/// Application error handling
///
/// Unifies validation, persistence and credential errors into `AppError`,
/// maps them to HTTP responses and logs each of them once with a request id.
/// Errors tagged through `ErrorContext::fail` reuse the handler's request id,
/// so the `error_id` a client sees matches the server log.
///
/// Credential failures keep their precise cause in the logs, but every
/// token problem is reported to the client as the same `TOKEN_INVALID` 401.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::auth::{AuthError, RefreshTokenStatus};
use crate::store::StoreError;

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Validation errors for request input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(&'static str),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(&'static str, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(&'static str),
}

// ============================================================================
// 2. UNIFIED APPLICATION ERROR TYPE
// ============================================================================

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Refresh token not recognised")]
    UnknownRefreshToken,

    #[error("Refresh token is {0}")]
    RefreshTokenRejected(RefreshTokenStatus),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// An error raised inside a handler, tagged with that handler's context
    #[error("{source}")]
    Contextual {
        context: ErrorContext,
        source: Box<AppError>,
    },
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            AppError::Store(e) => match e {
                StoreError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found".to_string())
                }
                StoreError::UniqueViolation(_) => (
                    StatusCode::CONFLICT,
                    "DUPLICATE_ENTRY",
                    "Resource already exists".to_string(),
                ),
                StoreError::Backend(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error occurred".to_string(),
                ),
            },

            AppError::Auth(e) => match e {
                AuthError::MissingAuthorizationHeader => (
                    StatusCode::UNAUTHORIZED,
                    "MISSING_TOKEN",
                    "Missing authentication token".to_string(),
                ),
                e if e.is_credential_rejection() => (
                    StatusCode::UNAUTHORIZED,
                    "TOKEN_INVALID",
                    "Invalid or expired token".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                ),
            },

            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
            ),

            AppError::UnknownRefreshToken | AppError::RefreshTokenRejected(_) => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".to_string(),
            ),

            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "INVALID_API_KEY",
                self.to_string(),
            ),

            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),

            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),

            AppError::Contextual { source, .. } => source.classify(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            AppError::Contextual { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Request id to report: the handler's when tagged, otherwise a fresh one
    pub fn request_id(&self) -> String {
        self.context()
            .map(|context| context.request_id.clone())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = self.classify();
        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        let operation = self.context().map(|c| c.operation.as_str());
        let user_id = self.context().and_then(|c| c.user_id.as_deref());

        if self.classify().0.is_server_error() {
            tracing::error!(
                request_id = request_id,
                operation = ?operation,
                user_id = ?user_id,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::warn!(
                request_id = request_id,
                operation = ?operation,
                user_id = ?user_id,
                error = %self,
                "Request rejected"
            );
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = self.request_id();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-request context for handler logs
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Tag `error` with this context. It is logged when the response is built.
    pub fn fail(&self, error: impl Into<AppError>) -> AppError {
        match error.into() {
            AppError::Contextual { source, .. } => self.fail(*source),
            error => AppError::Contextual {
                context: self.clone(),
                source: Box::new(error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email");
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = ValidationError::InvalidFormat("email").into();
        assert!(matches!(app_err, AppError::Validation(_)));

        let app_err: AppError = AuthError::TokenExpired.into();
        assert!(matches!(app_err, AppError::Auth(AuthError::TokenExpired)));
    }

    #[test]
    fn test_token_failures_collapse_to_one_response() {
        let errors = [
            AppError::Auth(AuthError::TokenExpired),
            AppError::Auth(AuthError::InvalidSignature),
            AppError::Auth(AuthError::MalformedToken("x".to_string())),
            AppError::RefreshTokenRejected(RefreshTokenStatus::Revoked),
            AppError::UnknownRefreshToken,
        ];

        for err in errors {
            let (status, body) = <AppError as ErrorHandler>::error_response(&err, "req");
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body.code, "TOKEN_INVALID");
            assert_eq!(body.message, "Invalid or expired token");
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Store(StoreError::UniqueViolation("email".to_string())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Store(StoreError::NotFound("user".to_string())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Auth(AuthError::HashingFailed("oom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Auth(AuthError::MissingAuthorizationHeader).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("dev only".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("user_login");
        assert_eq!(ctx.operation, "user_login");
        assert!(ctx.user_id.is_none());

        let ctx = ctx.with_user_id("user-123");
        assert_eq!(ctx.user_id, Some("user-123".to_string()));
    }

    #[test]
    fn test_contextual_error_reports_handler_request_id() {
        let ctx = ErrorContext::new("token_refresh");
        let err = ctx.fail(AppError::RefreshTokenRejected(RefreshTokenStatus::Expired));

        assert_eq!(err.request_id(), ctx.request_id);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Refresh token is expired");

        let (_, body) = <AppError as ErrorHandler>::error_response(&err, &err.request_id());
        assert_eq!(body.error_id, ctx.request_id);
        assert_eq!(body.code, "TOKEN_INVALID");
    }

    #[test]
    fn test_fail_does_not_nest_contexts() {
        let inner = ErrorContext::new("inner").fail(StoreError::NotFound("user".to_string()));
        let outer = ErrorContext::new("outer");
        let err = outer.fail(inner);

        match &err {
            AppError::Contextual { context, source } => {
                assert_eq!(context.operation, "outer");
                assert!(matches!(**source, AppError::Store(StoreError::NotFound(_))));
            }
            other => panic!("expected contextual error, got {:?}", other),
        }
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_untagged_errors_get_fresh_request_ids() {
        let err = AppError::InvalidCredentials;
        assert_ne!(err.request_id(), err.request_id());
    }
}
