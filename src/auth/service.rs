use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::reset::{self, ResetRequested};
use crate::auth::store::{CredentialStore, User};
use crate::error::AppError;
use crate::mailer::Mailer;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

lazy_static! {
    // Verified when login hits an unknown email, so both miss paths cost one
    // argon2 verification.
    static ref DUMMY_HASH: String = hash_password("not-a-real-password").unwrap_or_default();
}

/// Create a user from already-validated input. The plaintext password is
/// hashed here and is never returned or logged.
pub async fn register(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, AppError> {
    let user = store.create(email, &hash_password(password)?, name).await?;
    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Check credentials. Returns `None` on any mismatch; an unknown email and a
/// wrong password are indistinguishable to the caller.
pub async fn login(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let Some(user) = store.find_by_email(email).await? else {
        let _ = verify_password(password, &DUMMY_HASH);
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash)? {
        return Ok(None);
    }
    info!(user_id = %user.id, "user logged in");
    Ok(Some(user))
}

pub async fn request_password_reset(
    store: &dyn CredentialStore,
    mailer: &dyn Mailer,
    app_url: &str,
    email: &str,
) -> Result<ResetRequested, AppError> {
    reset::issue(store, mailer, app_url, email).await
}

pub async fn reset_password(
    store: &dyn CredentialStore,
    raw_token: &str,
    new_password: &str,
) -> Result<(), AppError> {
    reset::consume(store, raw_token, new_password).await
}
