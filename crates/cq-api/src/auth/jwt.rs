//! JWT token generation and validation
//!
//! Implements stateless bearer tokens signed with HMAC-SHA256.
//! The subject claim carries the user's email; tokens are never stored
//! server-side and expire after a fixed window.

use cq_core::AuthConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's email
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// JWT token generation and validation errors
///
/// The variants exist for logging. Callers facing a client must collapse
/// all of them into a single unauthorized outcome.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token signed with an unexpected algorithm")]
    InvalidAlgorithm,

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

/// JWT Configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,
    /// Access token expiration time in seconds (default: 1800 = 30 minutes)
    pub access_expiration_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        AuthConfig::default().into()
    }
}

impl From<&AuthConfig> for JwtConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            access_expiration_secs: config.access_token_ttl_secs,
        }
    }
}

impl From<AuthConfig> for JwtConfig {
    fn from(config: AuthConfig) -> Self {
        Self::from(&config)
    }
}

impl JwtConfig {
    /// Default token lifetime
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_expiration_secs)
    }
}

/// Generate an access token for `subject` with the configured lifetime
pub fn generate_access_token(config: &JwtConfig, subject: &str) -> Result<String, JwtError> {
    generate_access_token_with_ttl(config, subject, config.access_ttl())
}

/// Generate an access token for `subject` that expires after `ttl`
///
/// # Example
///
/// ```no_run
/// use cq_api::auth::jwt::{generate_access_token_with_ttl, validate_access_token, JwtConfig};
/// use std::time::Duration;
///
/// let config = JwtConfig::default();
/// let token = generate_access_token_with_ttl(&config, "alice@x.com", Duration::from_secs(60))
///     .expect("Failed to generate token");
/// let claims = validate_access_token(&config, &token).expect("Invalid token");
/// assert_eq!(claims.sub, "alice@x.com");
/// ```
pub fn generate_access_token_with_ttl(
    config: &JwtConfig,
    subject: &str,
    ttl: Duration,
) -> Result<String, JwtError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: subject.to_string(),
        iat: now,
        exp: now + ttl.as_secs(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate a JWT access token and extract claims
///
/// The algorithm is pinned to HS256 regardless of the token header, expiry is
/// checked with no leeway, and `sub` must be present and non-empty.
pub fn validate_access_token(config: &JwtConfig, token: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => JwtError::InvalidAlgorithm,
        _ => JwtError::InvalidToken,
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(JwtError::InvalidToken);
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use proptest::prelude::*;

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = JwtConfig::default();

        let token =
            generate_access_token(&config, "test@example.com").expect("Failed to generate token");
        let claims = validate_access_token(&config, &token).expect("Failed to validate token");

        assert_eq!(claims.sub, "test@example.com");
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_invalid_token() {
        let config = JwtConfig::default();
        let result = validate_access_token(&config, "invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let config1 = JwtConfig {
            secret: "secret1".to_string(),
            ..Default::default()
        };
        let config2 = JwtConfig {
            secret: "secret2".to_string(),
            ..Default::default()
        };

        let token = generate_access_token(&config1, "test@example.com").unwrap();

        let result = validate_access_token(&config2, &token);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_expired_token() {
        let config = JwtConfig::default();
        let now = now();

        // Expired ten seconds ago
        let claims = Claims {
            sub: "test@example.com".to_string(),
            iat: now - 1810,
            exp: now - 10,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let result = validate_access_token(&config, &token);
        assert!(matches!(result, Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let config = JwtConfig::default();
        let token =
            generate_access_token_with_ttl(&config, "short@example.com", Duration::from_secs(90))
                .unwrap();

        let claims = validate_access_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "short@example.com");
        assert_eq!(claims.exp - claims.iat, 90);

        // One second past expiry is already rejected
        let lapsed = Claims {
            iat: now() - 91,
            exp: now() - 1,
            ..claims
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &lapsed,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            validate_access_token(&config, &token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_other_hmac_algorithm_rejected() {
        let config = JwtConfig::default();
        let claims = Claims {
            sub: "test@example.com".to_string(),
            iat: now(),
            exp: now() + 600,
        };

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            validate_access_token(&config, &token),
            Err(JwtError::InvalidAlgorithm)
        ));
    }

    #[test]
    fn test_alg_none_rejected() {
        let config = JwtConfig::default();
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"sub":"test@example.com","iat":{},"exp":{}}}"#,
            now(),
            now() + 600
        ));

        let unsigned = format!("{header}.{payload}.");
        assert!(validate_access_token(&config, &unsigned).is_err());
    }

    #[test]
    fn test_missing_subject_rejected() {
        let config = JwtConfig::default();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "exp": now() + 600 }),
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_access_token(&config, &token).is_err());
    }

    #[test]
    fn test_empty_subject_rejected() {
        let config = JwtConfig::default();
        let token = generate_access_token(&config, "").unwrap();

        assert!(matches!(
            validate_access_token(&config, &token),
            Err(JwtError::InvalidToken)
        ));
    }

    proptest! {
        #[test]
        fn prop_issued_token_verifies_to_subject(
            subject in "[a-z0-9._+-]{1,24}@[a-z0-9-]{1,12}\\.[a-z]{2,6}",
            ttl in 60u64..86_400,
        ) {
            let config = JwtConfig::default();
            let token = generate_access_token_with_ttl(&config, &subject, Duration::from_secs(ttl)).unwrap();
            let claims = validate_access_token(&config, &token).unwrap();
            prop_assert_eq!(claims.sub, subject);
        }

        #[test]
        fn prop_altered_payload_fails(
            subject in "[a-z]{1,12}@[a-z]{1,8}\\.com",
            other in "[a-z]{1,12}@[a-z]{1,8}\\.org",
        ) {
            let config = JwtConfig::default();
            let token = generate_access_token(&config, &subject).unwrap();
            let parts: Vec<&str> = token.split('.').collect();

            let forged_payload = URL_SAFE_NO_PAD.encode(format!(
                r#"{{"sub":"{}","iat":{},"exp":{}}}"#,
                other,
                now(),
                now() + 600
            ));
            let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

            prop_assert!(validate_access_token(&config, &forged).is_err());
        }
    }
}
