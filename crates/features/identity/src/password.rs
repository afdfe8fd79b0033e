//! Argon2id password hashing in PHC string form.

use crate::error::IdentityError;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use getrandom::fill;

const SALT_LEN: usize = 16;

/// Hashes `password` with a fresh random 16-byte salt.
///
/// # Errors
///
/// Returns [`IdentityError::Password`] when the system RNG or the hasher fails.
pub fn hash_password(password: &str) -> Result<String, IdentityError> {
    let mut salt = [0u8; SALT_LEN];
    fill(&mut salt).map_err(|e| IdentityError::Password {
        message: e.to_string().into(),
        context: Some("Generating salt".into()),
    })?;

    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| IdentityError::Password { message: e.to_string().into(), context: None })?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::Password { message: e.to_string().into(), context: None })
}

/// Constant-time check of `password` against a stored PHC hash; malformed hashes never match.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_argon2id() {
        let first = hash_password("correct horse").unwrap();
        let second = hash_password("correct horse").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify_password("correct horse", &first));
        assert!(verify_password("correct horse", &second));
    }

    #[test]
    fn wrong_or_garbled_input_does_not_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }
}
