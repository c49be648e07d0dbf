use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::store::{CredentialStore, User};
use crate::error::AppError;

const USER_COLUMNS: &str =
    "id, email, name, password_hash, reset_token_hash, reset_token_expires_at, created_at";

/// Postgres-backed credential store.
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#,
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEmail
            }
            other => AppError::Database(other),
        })?;
        Ok(user)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $1, reset_token_expires_at = $2
            WHERE id = $3
            "#,
        )
        .bind(token_hash)
        .bind(expires_at)
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_valid_reset_hash(&self, token_hash: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE reset_token_hash = $1 AND reset_token_expires_at > now()
            "#,
        ))
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_password_clear_reset(
        &self,
        id: Uuid,
        token_hash: &str,
        new_password_hash: &str,
    ) -> Result<bool, AppError> {
        // Keyed on the unexpired hash so a racing consume of the same token
        // affects zero rows instead of overwriting the winner's password.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, reset_token_hash = NULL, reset_token_expires_at = NULL
            WHERE id = $2 AND reset_token_hash = $3 AND reset_token_expires_at > now()
            "#,
        )
        .bind(new_password_hash)
        .bind(id)
        .bind(token_hash)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
