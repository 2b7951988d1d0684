//! Argon2id password hashing and verification.
//!
//! All password hashes use the Argon2id variant with a cryptographically random
//! salt generated via [`OsRng`]. The PHC string format is used for storage so
//! that algorithm parameters and salt are embedded in the hash itself, and
//! verification always runs under those embedded parameters.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Why a hash or verify call failed.
///
/// Callers authenticating a user must treat [`PasswordError::Mismatch`] and
/// [`PasswordError::MalformedHash`] the same way.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password does not match")]
    Mismatch,

    #[error("malformed password hash: {0}")]
    MalformedHash(argon2::password_hash::Error),

    #[error("password hashing failed: {0}")]
    Hashing(argon2::password_hash::Error),
}

/// Argon2id hasher holding the cost parameters used for new hashes.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// Returns the PHC-formatted hash string. No length limits are enforced.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordError::Hashing)?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a stored PHC-formatted hash.
    ///
    /// The digest comparison is constant time.
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(PasswordError::MalformedHash)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(()),
            Err(argon2::password_hash::Error::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::MalformedHash(e)),
        }
    }
}
