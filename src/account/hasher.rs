//! Password hashing.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

/// Hashing failure other than a password mismatch.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct HashingError(String);

impl From<tokio::task::JoinError> for HashingError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self(format!("hashing task failed: {}", err))
    }
}

/// One-way password hashing.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing hash string.
    fn hash(&self, plaintext: &str) -> Result<String, HashingError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; errors are reserved for everything
    /// else (malformed hash, unsupported algorithm).
    fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, HashingError>;
}

/// Argon2id hasher with configurable cost.
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Create a hasher with explicit cost parameters.
    ///
    /// # Errors
    /// Returns an error if the parameters are outside Argon2's limits.
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, HashingError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| HashingError(format!("invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashingError(e.to_string()))
    }

    fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, HashingError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| HashingError(format!("malformed password hash: {}", e)))?;

        // Cost parameters are read from the hash itself.
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashingError(e.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2Hasher {
    Argon2Hasher::with_cost(1024, 1, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_roundtrip() {
        let hasher = test_hasher();

        for plaintext in ["secret123", "p", "pässwörd with spaces", "🦀🦀"] {
            let hash = hasher.hash(plaintext).unwrap();

            assert_ne!(hash, plaintext);
            assert!(hash.starts_with("$argon2id$"));
            assert!(hasher.verify(&hash, plaintext).unwrap());
            assert!(!hasher.verify(&hash, &format!("{}x", plaintext)).unwrap());
        }
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = test_hasher();

        let first = hasher.hash("secret123").unwrap();
        let second = hasher.hash("secret123").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_uses_cost_from_hash() {
        let cheap = test_hasher();
        let other = Argon2Hasher::with_cost(2048, 2, 1).unwrap();

        let hash = other.hash("secret123").unwrap();

        assert!(cheap.verify(&hash, "secret123").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = test_hasher();

        assert!(hasher.verify("not-a-valid-hash", "secret123").is_err());
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(Argon2Hasher::with_cost(0, 0, 0).is_err());
    }
}
