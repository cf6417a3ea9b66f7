//! Credential normalization: plaintext candidate in, stored hash out.

use std::sync::Arc;

use crate::domain::User;
use crate::ports::{AuthError, PasswordService};

/// Turns a user's plaintext password candidate into a stored hash.
///
/// Policy checks (strength, confirmation) are not done here; they belong to
/// the write boundary and must have passed before a record reaches this point.
#[derive(Clone)]
pub struct CredentialNormalizer {
    passwords: Arc<dyn PasswordService>,
}

impl CredentialNormalizer {
    pub fn new(passwords: Arc<dyn PasswordService>) -> Self {
        Self { passwords }
    }

    /// Hash the candidate into `password_hash` and erase the plaintext.
    ///
    /// Records without a candidate keep their current hash. Returns whether a
    /// new hash was written.
    pub fn normalize(&self, user: &mut User) -> Result<bool, AuthError> {
        let Some(plain) = user.plain_password.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(false);
        };

        let hash = self.passwords.hash(plain)?;
        user.password_hash = Some(hash);
        user.erase_credentials();

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in for a real hasher.
    struct PrefixHasher;

    impl PasswordService for PrefixHasher {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            Ok(format!("hashed:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
            Ok(hash == format!("hashed:{password}"))
        }
    }

    struct FailingHasher;

    impl PasswordService for FailingHasher {
        fn hash(&self, _password: &str) -> Result<String, AuthError> {
            Err(AuthError::HashingError("out of memory".to_string()))
        }

        fn verify(&self, _password: &str, _hash: &str) -> Result<bool, AuthError> {
            Ok(false)
        }
    }

    #[test]
    fn test_normalize_hashes_and_erases_plaintext() {
        let normalizer = CredentialNormalizer::new(Arc::new(PrefixHasher));
        let mut user = User {
            plain_password: Some("Abcdef1".to_string()),
            password_confirmation: Some("Abcdef1".to_string()),
            ..User::new()
        };

        assert!(normalizer.normalize(&mut user).unwrap());

        let hash = user.password_hash.as_deref().unwrap();
        assert_ne!(hash, "Abcdef1");
        assert!(PrefixHasher.verify("Abcdef1", hash).unwrap());
        assert!(user.plain_password.is_none());
        assert!(user.password_confirmation.is_none());
    }

    #[test]
    fn test_normalize_without_candidate_keeps_hash() {
        let normalizer = CredentialNormalizer::new(Arc::new(PrefixHasher));
        let mut user = User {
            password_hash: Some("existing".to_string()),
            ..User::new()
        };

        assert!(!normalizer.normalize(&mut user).unwrap());
        assert_eq!(user.password_hash.as_deref(), Some("existing"));

        user.plain_password = Some(String::new());
        assert!(!normalizer.normalize(&mut user).unwrap());
        assert_eq!(user.password_hash.as_deref(), Some("existing"));
    }

    #[test]
    fn test_hashing_failure_leaves_record_untouched() {
        let normalizer = CredentialNormalizer::new(Arc::new(FailingHasher));
        let mut user = User {
            password_hash: Some("existing".to_string()),
            plain_password: Some("Abcdef1".to_string()),
            ..User::new()
        };

        assert!(normalizer.normalize(&mut user).is_err());
        assert_eq!(user.password_hash.as_deref(), Some("existing"));
        assert_eq!(user.plain_password.as_deref(), Some("Abcdef1"));
    }
}
