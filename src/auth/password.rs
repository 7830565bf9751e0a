// Password hashing and verification for locally held credentials

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::auth::provider::{ProviderError, ProviderErrorKind};

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id
    pub fn hash_password(password: &str) -> Result<String, ProviderError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                ProviderError::new(ProviderErrorKind::Unavailable, format!("Password hashing error: {}", e))
            })
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, ProviderError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            ProviderError::new(ProviderErrorKind::Unavailable, format!("Stored hash unreadable: {}", e))
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = PasswordService::hash_password("Passw0rd!").unwrap();
        assert_ne!(hash, "Passw0rd!");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_matches_only_hashed_password() {
        let hash = PasswordService::hash_password("Passw0rd!").unwrap();
        assert!(PasswordService::verify_password("Passw0rd!", &hash).unwrap());
        assert!(!PasswordService::verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(PasswordService::verify_password("x", "not-a-hash").is_err());
    }
}
