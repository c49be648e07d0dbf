use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::auth::store::CredentialStore;
use crate::error::AppError;
use crate::mailer::{Mailer, SentMail};

pub const RESET_TOKEN_TTL_HOURS: i64 = 24;

/// 32 bytes from the OS RNG, hex-encoded. The raw value is handed to the
/// mailer inside the reset URL and is never persisted or logged.
pub(crate) fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Stored form of a token. Lookups rehash the candidate and match on this.
pub(crate) fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[derive(Debug)]
pub struct ResetRequested {
    pub preview_url: Option<String>,
}

/// Issue a reset token for `email`. Reports success whether or not the email
/// is registered, so callers cannot probe for accounts; only a notifier
/// failure for a known address surfaces as an error.
pub async fn issue(
    store: &dyn CredentialStore,
    mailer: &dyn Mailer,
    app_url: &str,
    email: &str,
) -> Result<ResetRequested, AppError> {
    let Some(user) = store.find_by_email(email).await? else {
        info!("password reset requested for an unknown address");
        return Ok(ResetRequested { preview_url: None });
    };

    let token = generate_token();
    let expires_at = OffsetDateTime::now_utc() + Duration::hours(RESET_TOKEN_TTL_HOURS);
    store
        .set_reset_token(user.id, &hash_token(&token), expires_at)
        .await?;

    let reset_url = format!("{}/reset-password/{token}", app_url.trim_end_matches('/'));
    let SentMail { preview_url } = mailer
        .send_password_reset(&user.email, &reset_url)
        .await
        .map_err(AppError::Notifier)?;

    info!(user_id = %user.id, "password reset email sent");
    Ok(ResetRequested { preview_url })
}

/// Consume a reset token: verify it is known and unexpired, then set the new
/// password and clear the reset fields in one conditional update. A token is
/// usable at most once.
pub async fn consume(
    store: &dyn CredentialStore,
    raw_token: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let token_hash = hash_token(raw_token);
    let Some(user) = store.find_by_valid_reset_hash(&token_hash).await? else {
        return Err(AppError::InvalidOrExpiredToken);
    };

    let new_hash = hash_password(new_password)?;
    let applied = store
        .update_password_clear_reset(user.id, &token_hash, &new_hash)
        .await?;
    if !applied {
        // A concurrent consume won between the lookup and the update.
        warn!(user_id = %user.id, "reset token was consumed concurrently");
        return Err(AppError::InvalidOrExpiredToken);
    }

    info!(user_id = %user.id, "password reset completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::auth::store::memory::MemoryCredentialStore;
    use crate::mailer::testing::{FailingMailer, MockMailer};

    const APP_URL: &str = "http://localhost:8080";

    async fn store_with_user(email: &str) -> MemoryCredentialStore {
        let store = MemoryCredentialStore::default();
        store
            .create(email, &hash_password("Secret123").unwrap(), "Alice")
            .await
            .unwrap();
        store
    }

    fn sent_token(mailer: &MockMailer) -> String {
        let sent = mailer.sent.lock().unwrap();
        let (_, url) = sent.last().expect("a reset mail should have been sent");
        url.rsplit('/').next().unwrap().to_string()
    }

    #[test]
    fn tokens_are_64_hex_characters() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[tokio::test]
    async fn issue_reports_success_for_unknown_and_known_addresses() {
        let store = store_with_user("alice@example.com").await;
        let mailer = MockMailer::default();

        let unknown = issue(&store, &mailer, APP_URL, "nobody@example.com")
            .await
            .expect("unknown address must still succeed");
        let known = issue(&store, &mailer, APP_URL, "alice@example.com")
            .await
            .expect("known address must succeed");

        assert!(unknown.preview_url.is_none());
        assert!(known.preview_url.is_none());
        // Only the known address produced mail.
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn issue_never_persists_the_raw_token() {
        let store = store_with_user("alice@example.com").await;
        let mailer = MockMailer::default();
        issue(&store, &mailer, APP_URL, "alice@example.com")
            .await
            .unwrap();

        let token = sent_token(&mailer);
        let user = store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        let stored = user.reset_token_hash.expect("hash should be stored");
        assert_ne!(stored, token);
        assert_eq!(stored, hash_token(&token));
        assert!(user.reset_token_expires_at.unwrap() > OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn issue_builds_the_reset_url_from_the_app_url() {
        let store = store_with_user("alice@example.com").await;
        let mailer = MockMailer::default();
        issue(&store, &mailer, "http://app.example.com/", "alice@example.com")
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        let (to, url) = &sent[0];
        assert_eq!(to, "alice@example.com");
        assert!(url.starts_with("http://app.example.com/reset-password/"));
    }

    #[tokio::test]
    async fn issue_surfaces_notifier_failures_as_such() {
        let store = store_with_user("alice@example.com").await;
        let err = issue(&store, &FailingMailer, APP_URL, "alice@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Notifier(_)));

        // An unknown address never reaches the notifier.
        assert!(issue(&store, &FailingMailer, APP_URL, "nobody@example.com")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn a_token_is_usable_at_most_once() {
        let store = store_with_user("alice@example.com").await;
        let mailer = MockMailer::default();
        issue(&store, &mailer, APP_URL, "alice@example.com")
            .await
            .unwrap();
        let token = sent_token(&mailer);

        consume(&store, &token, "NewPass123")
            .await
            .expect("first consume should succeed");
        let err = consume(&store, &token, "AnotherPass123").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOrExpiredToken));

        // The first consume's password stands.
        let user = store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password("NewPass123", &user.password_hash).unwrap());
        assert!(user.reset_token_hash.is_none());
        assert!(user.reset_token_expires_at.is_none());
    }

    #[tokio::test]
    async fn an_expired_token_never_consumes() {
        let store = store_with_user("alice@example.com").await;
        let mailer = MockMailer::default();
        issue(&store, &mailer, APP_URL, "alice@example.com")
            .await
            .unwrap();
        let token = sent_token(&mailer);

        // Backdate the expiry; the hash still matches exactly.
        let user = store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        store
            .set_reset_token(
                user.id,
                &hash_token(&token),
                OffsetDateTime::now_utc() - Duration::hours(1),
            )
            .await
            .unwrap();

        let err = consume(&store, &token, "NewPass123").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn an_unknown_token_never_consumes() {
        let store = store_with_user("alice@example.com").await;
        let err = consume(&store, &generate_token(), "NewPass123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidOrExpiredToken));
    }
}
