use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// User record in the database. The reset fields are set together when a
/// reset is requested and cleared together when it is consumed; a stale pair
/// simply fails the validity lookup and is never purged eagerly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Single source of truth for identity. Handed around as a trait object so
/// the auth core can be exercised against an in-memory double.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Fails with `DuplicateEmail` when the email is already registered.
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, AppError>;

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), AppError>;

    /// Matches only on an exact hash whose expiry is still in the future.
    async fn find_by_valid_reset_hash(&self, token_hash: &str) -> Result<Option<User>, AppError>;

    /// Conditional update keyed on the unexpired hash: sets the new password
    /// hash and clears both reset fields in one statement. Returns `false`
    /// when no row matched, which callers treat as a stale token.
    async fn update_password_clear_reset(
        &self,
        id: Uuid,
        token_hash: &str,
        new_password_hash: &str,
    ) -> Result<bool, AppError>;
}
