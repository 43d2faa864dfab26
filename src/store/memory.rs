/// In-memory store
///
/// Same semantics as the Postgres backend, including the unique email
/// constraint and the user -> refresh token cascade. Used by the integration
/// tests and handy for running the server without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{RefreshTokenStore, StoreError, User, UserStore};
use crate::auth::RefreshTokenRecord;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation(format!("email {}", email)));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.tables()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user with email {}", email)))
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::UniqueViolation(format!("email {}", email)));
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_all_users(&self) -> Result<u64, StoreError> {
        let mut tables = self.tables()?;
        let deleted = tables.users.len() as u64;
        tables.users.clear();
        tables.refresh_tokens.clear();
        Ok(deleted)
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn insert_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StoreError> {
        let mut tables = self.tables()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        if tables.refresh_tokens.contains_key(token) {
            return Err(StoreError::UniqueViolation("refresh token".to_string()));
        }

        let now = Utc::now();
        let record = RefreshTokenRecord {
            token: token.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };
        tables
            .refresh_tokens
            .insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn lookup_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        self.tables()?
            .refresh_tokens
            .get(token)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("refresh token".to_string()))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let record = tables
            .refresh_tokens
            .get_mut(token)
            .ok_or_else(|| StoreError::NotFound("refresh token".to_string()))?;

        let now = Utc::now();
        record.revoked_at.get_or_insert(now);
        record.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryStore::new();
        store.create_user("a@example.com", "hash").await.unwrap();

        let result = store.create_user("a@example.com", "hash").await;
        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_update_user() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@example.com", "hash").await.unwrap();

        let updated = store
            .update_user(user.id, "b@example.com", "new-hash")
            .await
            .unwrap();
        assert_eq!(updated.email, "b@example.com");
        assert_eq!(updated.hashed_password, "new-hash");
        assert!(store.get_user_by_email("a@example.com").await.is_err());

        let missing = store.update_user(Uuid::new_v4(), "c@example.com", "h").await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_refresh_token_requires_user() {
        let store = InMemoryStore::new();
        let result = store
            .insert_refresh_token("token", Uuid::new_v4(), Utc::now() + Duration::days(60))
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@example.com", "hash").await.unwrap();
        store
            .insert_refresh_token("token", user.id, Utc::now() + Duration::days(60))
            .await
            .unwrap();

        store.revoke_refresh_token("token").await.unwrap();
        let first = store.lookup_refresh_token("token").await.unwrap().revoked_at;
        store.revoke_refresh_token("token").await.unwrap();
        let second = store.lookup_refresh_token("token").await.unwrap().revoked_at;

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_revoke_unknown_token() {
        let store = InMemoryStore::new();

        let result = store.revoke_refresh_token("missing").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_all_users_cascades() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@example.com", "hash").await.unwrap();
        store
            .insert_refresh_token("token", user.id, Utc::now() + Duration::days(60))
            .await
            .unwrap();

        assert_eq!(store.delete_all_users().await.unwrap(), 1);
        assert!(store.lookup_refresh_token("token").await.is_err());
    }
}
