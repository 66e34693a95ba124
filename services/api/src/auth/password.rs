//! services/api/src/auth/password.rs
//!
//! Salted argon2 hashing of user secrets, plus recognition of rows that were
//! stored before hashing was introduced.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::error;

use crate::error::ApiError;

/// Result of checking a presented secret against a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretCheck {
    Match,
    /// The stored value is clear text and equals the presented secret.
    /// The caller should re-hash and store it.
    LegacyMatch,
    Mismatch,
}

pub fn hash_secret(secret: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })
}

pub fn verify_secret(secret: &str, stored: &str) -> SecretCheck {
    match PasswordHash::new(stored) {
        Ok(parsed_hash) => {
            if Argon2::default()
                .verify_password(secret.as_bytes(), &parsed_hash)
                .is_ok()
            {
                SecretCheck::Match
            } else {
                SecretCheck::Mismatch
            }
        }
        // Not a PHC string, so the row predates hashing.
        Err(_) if !stored.is_empty() && stored == secret => SecretCheck::LegacyMatch,
        Err(_) => SecretCheck::Mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_secret_verifies_and_is_salted() {
        let first = hash_secret("adminpassword").unwrap();
        let second = hash_secret("adminpassword").unwrap();

        assert!(first.starts_with("$argon2"));
        assert_ne!(first, second);
        assert_eq!(verify_secret("adminpassword", &first), SecretCheck::Match);
        assert_eq!(verify_secret("wrong", &first), SecretCheck::Mismatch);
    }

    #[test]
    fn clear_text_rows_are_recognised_as_legacy() {
        assert_eq!(
            verify_secret("userpassword", "userpassword"),
            SecretCheck::LegacyMatch
        );
        assert_eq!(verify_secret("guess", "userpassword"), SecretCheck::Mismatch);
        assert_eq!(verify_secret("", ""), SecretCheck::Mismatch);
    }
}
