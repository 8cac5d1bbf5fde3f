//! Authentication service layer
//!
//! Registration and login. Both return a bearer token; registration logs the
//! new user in immediately.

use super::jwt::{generate_access_token, JwtConfig};
use super::models::{TokenResponse, User};
use super::password::{
    hash_password_with_config, validate_password_length, verify_password, PasswordConfig,
    PasswordError,
};
use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::AppError;
use crate::store::UserStore;
use cq_core::{AuthConfig, CqError};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Message of every failed login, whatever the cause
pub const LOGIN_FAILED: &str = "Incorrect email or password";

/// Message of a registration for an email that is taken
pub const EMAIL_TAKEN: &str = "Email already registered";

/// Hashed once per service and verified against when the email is unknown
const DECOY_PASSWORD: &str = "calorie-quest-decoy-password";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtConfig,
    password: PasswordConfig,
    /// Hash with the configured cost, so an unknown email pays for the
    /// same verification as a wrong password
    decoy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, config: &AuthConfig) -> Self {
        Self {
            users,
            jwt: JwtConfig::from(config),
            password: PasswordConfig::from(config),
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Register a new user and issue a token
    ///
    /// # Returns
    ///
    /// * `Ok(TokenResponse)` - User created, token issued
    /// * `Err(AppError::BadRequest)` - Empty email, short password or email taken
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<TokenResponse, AppError> {
        let result = self.try_register(email, password).await;

        match &result {
            Ok(_) => audit_log(&AuditEvent::RegistrationSuccess {
                email: email.to_string(),
                client,
            }),
            Err(AppError::BadRequest(reason)) => audit_log(&AuditEvent::RegistrationFailure {
                email: email.to_string(),
                reason: reason.clone(),
                client,
            }),
            Err(_) => {}
        }

        result
    }

    async fn try_register(&self, email: &str, password: &str) -> Result<TokenResponse, AppError> {
        if email.trim().is_empty() {
            return Err(AppError::BadRequest("Email is required".to_string()));
        }

        validate_password_length(password).map_err(AppError::BadRequest)?;

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::BadRequest(EMAIL_TAKEN.to_string()));
        }

        let password_hash = self.hash(password).await?;

        // The pre-check above can race; the store has the final word
        match self
            .users
            .insert_user(User::new(email.to_string(), password_hash))
            .await
        {
            Ok(user) => {
                tracing::info!(email = %user.email, "User registered");
                self.issue_token(&user.email)
            }
            Err(CqError::AlreadyExists(_)) => Err(AppError::BadRequest(EMAIL_TAKEN.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and issue a token
    ///
    /// Unknown email and wrong password fail identically, and both run a
    /// full Argon2 verification.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<TokenResponse, AppError> {
        let user = self.users.find_by_email(email).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.decoy_hash().await?,
        };
        let matches = self.verify(password, &stored_hash).await?;

        let user = match user {
            Some(user) if matches => user,
            found => {
                let reason = if found.is_some() {
                    "wrong password"
                } else {
                    "unknown email"
                };
                audit_log(&AuditEvent::LoginFailure {
                    email: email.to_string(),
                    reason: reason.to_string(),
                    client,
                });
                return Err(AppError::Unauthorized(LOGIN_FAILED.to_string()));
            }
        };

        audit_log(&AuditEvent::LoginSuccess {
            email: user.email.clone(),
            client,
        });

        self.issue_token(&user.email)
    }

    /// Compute the decoy hash ahead of the first login
    pub async fn warm_up(&self) -> Result<(), AppError> {
        self.decoy_hash().await.map(|_| ())
    }

    async fn decoy_hash(&self) -> Result<String, AppError> {
        self.decoy_hash
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))
            .await
            .cloned()
    }

    fn issue_token(&self, email: &str) -> Result<TokenResponse, AppError> {
        let access_token = generate_access_token(&self.jwt, email)
            .map_err(|e| AppError::Internal(format!("Failed to generate access token: {e}")))?;

        Ok(TokenResponse::bearer(
            access_token,
            self.jwt.access_expiration_secs,
        ))
    }

    /// Argon2 is CPU-bound, so it runs off the async workers
    async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let config = self.password.clone();

        tokio::task::spawn_blocking(move || hash_password_with_config(&password, &config))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {e}")))?
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let hash = hash.to_string();

        let result = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {e}")))?;

        match result {
            Ok(matches) => Ok(matches),
            // A stored hash we cannot parse is a data fault, not a wrong password
            Err(PasswordError::InvalidHashFormat) => Err(AppError::Internal(
                "Stored password hash is malformed".to_string(),
            )),
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }
}
