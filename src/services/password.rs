//! Password hashing and verification

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, AppResult};

/// Argon2 credential hashing. A fresh salt is drawn per call, so two digests
/// of the same password differ while both verify.
pub struct PasswordService;

impl PasswordService {
    /// Hash a plaintext password for storage
    pub fn hash(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(digest.to_string())
    }

    /// Check a plaintext password against a stored digest. Binary outcome;
    /// an unparseable digest verifies as false.
    pub fn verify(password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let digest = PasswordService::hash("correct horse").unwrap();
        assert!(PasswordService::verify("correct horse", &digest));
        assert!(!PasswordService::verify("wrong horse", &digest));
    }

    #[test]
    fn hashing_is_salted() {
        let a = PasswordService::hash("same input").unwrap();
        let b = PasswordService::hash("same input").unwrap();
        assert_ne!(a, b);
        assert!(PasswordService::verify("same input", &a));
        assert!(PasswordService::verify("same input", &b));
    }

    #[test]
    fn garbage_digest_never_verifies() {
        assert!(!PasswordService::verify("anything", "not-a-digest"));
    }
}
