//! Argon2 password hashing.
//!
//! Hashes are self-describing PHC strings (algorithm, params and salt
//! embedded), so verification needs no extra configuration.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHashError(String);

impl Display for PasswordHashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for PasswordHashError {}

/// Hashes `raw` with a fresh random salt.
pub fn hash_password(raw: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError(err.to_string()))
}

/// Returns whether `raw` matches `hash`. Malformed hashes never match.
pub fn verify_password(raw: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}

static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("fitclub-unknown-member").ok());

/// Verifies `raw` against a fixed hash and discards the outcome.
///
/// Called for unknown accounts so a miss costs the same Argon2 work as a
/// wrong password.
pub(crate) fn verify_against_dummy(raw: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        verify_password(raw, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_against_dummy, verify_password, DUMMY_HASH};
    use once_cell::sync::Lazy;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("s3cret-pasS", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify_password("pw", "plain-text"));
    }

    #[test]
    fn dummy_verification_uses_a_real_hash() {
        verify_against_dummy("whatever");
        let hash = Lazy::get(&DUMMY_HASH).cloned().flatten().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_password("whatever", &hash));
    }
}
