//! Account models for authentication
//!
//! This module defines the data structures of the auth layer:
//! - User: account as held by the credential store, including the hash
//! - UserPublic: outward view of an account, never carrying the hash
//! - CredentialsForm / TokenResponse: the login and registration wire shapes

use chrono::{DateTime, Utc};
use cq_core::{DailyGoals, Profile};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User account model
///
/// Identity is the email address, unique across all users and compared
/// exactly as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User's email address (unique, used for login and as token subject)
    pub email: String,

    /// Hashed password (Argon2id PHC string)
    /// This field is never serialized in API responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Body profile used for calorie targets
    #[serde(default)]
    pub profile: Profile,

    /// Daily nutrition goals
    #[serde(default)]
    pub goals: DailyGoals,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with an already hashed password
    pub fn new(email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            email,
            password_hash,
            profile: Profile::default(),
            goals: DailyGoals::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Convert user to public representation (without the password hash)
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            email: self.email.clone(),
            profile: self.profile.clone(),
            goals: self.goals.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Public user representation (safe for API responses)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub email: String,
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(flatten)]
    pub goals: DailyGoals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form-encoded credentials for login and registration
///
/// Mirrors the OAuth2 password grant form: the email travels as `username`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Bearer token issued at login and registration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cq_core::Gender;

    #[test]
    fn test_user_creation() {
        let user = User::new("test@example.com".to_string(), "hash".to_string());

        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.profile, Profile::default());
        assert_eq!(user.goals, DailyGoals::default());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_user_serialization_skips_hash() {
        let user = User::new("test@example.com".to_string(), "secret_hash".to_string());

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret_hash"));
    }

    #[test]
    fn test_user_to_public() {
        let mut user = User::new("test@example.com".to_string(), "secret_hash".to_string());
        user.profile.gender = Some(Gender::Female);
        user.goals.daily_calorie_goal = Some(1800.0);

        let public = user.to_public();
        assert_eq!(public.email, user.email);

        let json = serde_json::to_value(&public).unwrap();
        assert_eq!(json["gender"], "female");
        assert_eq!(json["daily_calorie_goal"], 1800.0);
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_token_response_shape() {
        let response = TokenResponse::bearer("abc".to_string(), 1800);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "abc");
        assert_eq!(json["token_type"], "bearer");
    }
}
