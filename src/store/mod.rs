/// Persistence for users and refresh tokens
///
/// Handlers only see the `Store` trait object, so the Postgres backend and the
/// in-memory backend are interchangeable.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::RefreshTokenRecord;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres error code for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => StoreError::UniqueViolation(db.message().to_string()),
                Some(FOREIGN_KEY_VIOLATION) => {
                    StoreError::NotFound("Referenced record not found".to_string())
                }
                _ => StoreError::Backend(err.to_string()),
            },
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UniqueViolation` if the email is taken.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Replace email and password hash. Fails with `NotFound` for unknown ids.
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError>;

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<(), StoreError>;

    /// Remove every user and, with them, every refresh token.
    /// Returns the number of users removed.
    async fn delete_all_users(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Fails with `NotFound` if `user_id` does not exist.
    async fn insert_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StoreError>;

    async fn lookup_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, StoreError>;

    /// Mark a token revoked. Revoking twice keeps the first `revoked_at`.
    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError>;
}

/// Everything the HTTP layer needs from persistence
pub trait Store: UserStore + RefreshTokenStore {}

impl<T: UserStore + RefreshTokenStore> Store for T {}
