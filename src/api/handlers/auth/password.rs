//! Password hashing and verification.
//!
//! Hashes are Argon2id in PHC string format, so the salt and parameters
//! travel inside the hash and no separate salt storage is needed.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
/// Returns an error if the hasher rejects its parameters.
pub(super) fn hash(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Verify a plaintext password against a stored hash.
///
/// Malformed hash input is a verification failure, never a fault.
pub(super) fn verify(plaintext: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hashed = hash("p1").expect("hash");
        assert!(verify("p1", &hashed));
        assert!(!verify("p2", &hashed));
    }

    #[test]
    fn hashes_are_salted_per_call() {
        let first = hash("p1").expect("hash");
        let second = hash("p1").expect("hash");
        assert_ne!(first, second);
        assert!(verify("p1", &first));
        assert!(verify("p1", &second));
    }

    #[test]
    fn hash_is_never_the_plaintext() {
        let hashed = hash("hunter2").expect("hash");
        assert_ne!(hashed, "hunter2");
        assert!(hashed.starts_with("$argon2"));
    }

    #[test]
    fn malformed_hash_fails_verification() {
        assert!(!verify("p1", ""));
        assert!(!verify("p1", "not-a-phc-string"));
        assert!(!verify("p1", "$argon2id$v=19$garbage"));
    }
}
