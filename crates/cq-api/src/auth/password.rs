//! Password hashing and verification using Argon2id
//!
//! Hashes are PHC strings carrying algorithm, parameters and a random
//! 16-byte salt, so hashing the same password twice never yields the same
//! string. Verification compares digests in constant time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use cq_core::AuthConfig;
use thiserror::Error;

/// Shortest password accepted at registration, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password hashing and verification errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Password hashing configuration
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 2)
    pub time_cost: u32,
    /// Parallelism (lanes, default: 1)
    pub parallelism: u32,
    /// Output length in bytes (default: 32)
    pub output_len: Option<usize>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        AuthConfig::default().into()
    }
}

impl From<&AuthConfig> for PasswordConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            memory_cost: config.argon2_memory_kib,
            time_cost: config.argon2_iterations,
            parallelism: config.argon2_parallelism,
            output_len: Some(32),
        }
    }
}

impl From<AuthConfig> for PasswordConfig {
    fn from(config: AuthConfig) -> Self {
        Self::from(&config)
    }
}

impl PasswordConfig {
    /// Create Argon2 parameters from this configuration
    fn to_params(&self) -> Result<Params, PasswordError> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            self.output_len,
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }
}

/// Hash a plaintext password with the default parameters
///
/// # Example
///
/// ```no_run
/// use cq_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("secret1").expect("Failed to hash password");
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_password("secret1", &hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_config(password, &PasswordConfig::default())
}

/// Hash a password with custom configuration
pub fn hash_password_with_config(
    password: &str,
    config: &PasswordConfig,
) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = config.to_params()?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a plaintext password against a stored hash
///
/// # Returns
///
/// * `Ok(true)` - Password matches
/// * `Ok(false)` - Password does not match
/// * `Err(PasswordError)` - The stored hash is not a valid PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // Parameters come from the PHC string, not from Argon2::default()
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

/// Check the registration length rule
pub fn validate_password_length(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> PasswordConfig {
        PasswordConfig {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            output_len: Some(32),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("secret1").expect("Failed to hash password");

        assert!(verify_password("secret1", &hash).expect("Verification failed"));
        assert!(!verify_password("secret2", &hash).expect("Verification failed"));
    }

    #[test]
    fn test_same_password_produces_different_hashes() {
        let hash1 = hash_password_with_config("same-password", &light()).unwrap();
        let hash2 = hash_password_with_config("same-password", &light()).unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("same-password", &hash1).unwrap());
        assert!(verify_password("same-password", &hash2).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "invalid-hash-format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_custom_config() {
        let hash = hash_password_with_config("TestPassword", &light()).unwrap();

        assert!(verify_password("TestPassword", &hash).unwrap());
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=1024"));
        assert!(hash.contains("t=1"));
        assert!(hash.contains("p=1"));
    }

    #[test]
    fn test_config_from_auth_config() {
        let auth = AuthConfig {
            argon2_memory_kib: 4096,
            argon2_iterations: 3,
            argon2_parallelism: 2,
            ..Default::default()
        };
        let config = PasswordConfig::from(&auth);
        assert_eq!(config.memory_cost, 4096);
        assert_eq!(config.time_cost, 3);
        assert_eq!(config.parallelism, 2);
    }

    #[test]
    fn test_password_length_rule() {
        assert!(validate_password_length("secret").is_ok());
        assert!(validate_password_length("secret1").is_ok());
        assert!(validate_password_length("12345").is_err());
        assert!(validate_password_length("").is_err());
        // Counted in characters, not bytes
        assert!(validate_password_length("ééééé").is_err());
        assert!(validate_password_length("éééééé").is_ok());
    }
}
