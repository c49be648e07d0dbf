use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash a plaintext password with a fresh salt. The plaintext never leaves
/// this function in any form.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hashing failed");
            anyhow::anyhow!("password hashing failed")
        })?;
    Ok(hash.to_string())
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!("stored password hash is malformed")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("Secret123").expect("hashing should succeed");
        assert!(verify_password("Secret123", &hash).expect("verify should succeed"));
    }

    #[test]
    fn stored_form_is_not_the_plaintext() {
        let hash = hash_password("Secret123").expect("hashing should succeed");
        assert_ne!(hash, "Secret123");
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_password("Secret123").expect("hashing should succeed");
        assert!(!verify_password("NotTheSecret", &hash).expect("verify should not error"));
    }

    #[test]
    fn two_hashes_of_the_same_password_differ() {
        // Fresh salt per call.
        let a = hash_password("Secret123").unwrap();
        let b = hash_password("Secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
