/// Password Hashing and Verification
///
/// Argon2id with PHC-encoded output: parameters and salt travel inside the
/// hash string, so stored hashes keep verifying after a defaults bump.

use argon2::password_hash::{Error as PhcError, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::AppError;

const SALT_LEN: usize = 16;

/// Hash a password with Argon2id and a fresh random salt.
///
/// Two calls on the same input produce different encodings.
///
/// # Errors
/// `AppError::Hashing` if the salt source or the primitive fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|e| AppError::Hashing(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| AppError::Hashing(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Hashing(e.to_string()))
}

/// Verify a password against a stored PHC hash string.
///
/// Parameters are re-derived from the hash itself, not assumed from current
/// defaults. A non-matching password is `Ok(false)`; only a malformed hash
/// or a primitive failure is an error.
pub fn verify_password(password: &str, phc_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(phc_hash).map_err(|e| AppError::Hashing(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PhcError::Password) => Ok(false),
        Err(e) => Err(AppError::Hashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let password = "correct horse battery staple";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).expect("Failed to verify password"));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("correct horse battery staple").expect("Failed to hash password");

        let matched =
            verify_password("incorrect horse", &hash).expect("Failed to verify password");
        assert!(!matched);
    }

    #[test]
    fn same_password_hashes_differently_each_time() {
        let password = "correct horse battery staple";
        let first = hash_password(password).expect("Failed to hash password");
        let second = hash_password(password).expect("Failed to hash password");

        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(AppError::Hashing(_))));
    }
}
