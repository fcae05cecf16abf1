//! Password value object - Domain layer password handling.
//!
//! Argon2id with cost parameters fixed at build time. Hashes are stored as
//! PHC strings and round-trip through the database unchanged.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::Lazy;

use crate::config::{HASH_ITERATIONS, HASH_MEMORY_KIB, HASH_PARALLELISM, MIN_PASSWORD_LENGTH};
use crate::errors::{AppError, AppResult};

/// Hash verified when there is nothing real to compare against, so a
/// missing user or a corrupt stored hash costs the same as a wrong password.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| Password::hash("timing-equalizer-not-a-password").unwrap_or_default());

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns a validation error if the password is shorter than
    /// `MIN_PASSWORD_LENGTH` characters.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            ));
        }

        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Hash on the blocking pool so request workers are not stalled.
    pub async fn new_blocking(plain_text: String) -> AppResult<Self> {
        tokio::task::spawn_blocking(move || Self::new(&plain_text))
            .await
            .map_err(|e| AppError::internal(format!("Password hash task failed: {}", e)))?
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// An unparseable hash is never a match; the dummy hash is verified in
    /// its place.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Self::verify_parsed(plain_text, &parsed),
            Err(e) => {
                tracing::warn!("Stored password hash is unparseable: {}", e);
                Self::verify_dummy(plain_text);
                false
            }
        }
    }

    /// Verify on the blocking pool.
    pub async fn verify_blocking(self, plain_text: String) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || self.verify(&plain_text))
            .await
            .map_err(|e| AppError::internal(format!("Password verify task failed: {}", e)))
    }

    /// Burn one verification worth of work. Always returns false.
    pub fn verify_dummy(plain_text: &str) -> bool {
        if let Ok(parsed) = PasswordHash::new(&DUMMY_HASH) {
            let _ = Self::verify_parsed(plain_text, &parsed);
        }
        false
    }

    fn verify_parsed(plain_text: &str, parsed: &PasswordHash<'_>) -> bool {
        match Self::argon2() {
            Ok(argon2) => argon2.verify_password(plain_text.as_bytes(), parsed).is_ok(),
            Err(_) => false,
        }
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()?
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn argon2() -> AppResult<Argon2<'static>> {
        let params = Params::new(HASH_MEMORY_KIB, HASH_ITERATIONS, HASH_PARALLELISM, None)
            .map_err(|e| AppError::internal(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}
