//! Authentication middleware for protecting routes
//!
//! Extracts and validates the bearer token from the Authorization header,
//! resolves its subject to a stored user and adds the user to request
//! extensions.

use super::jwt::{validate_access_token, JwtError};
use super::models::UserPublic;
use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::UserStore;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;

/// Message of every 401 produced by the gate
pub const INVALID_CREDENTIALS: &str = "Could not validate credentials";

/// Authenticated user resolved from a bearer token
///
/// Added to request extensions by [`auth_middleware`]; extract it in handlers
/// with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Token subject, identical to the stored email
    pub email: String,
    /// Stored user at the time of the request
    pub user: UserPublic,
}

/// Authentication middleware errors
///
/// The variants are kept apart for the audit log. Clients see one uniform
/// 401 for all of them except store failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),

    #[error("Token subject does not resolve to a user")]
    UnknownSubject,

    #[error("User lookup failed: {0}")]
    Store(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Store(msg) = self {
            tracing::error!(error = %msg, "User lookup failed during authentication");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::internal_error()),
            )
                .into_response();
        }

        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(ApiError::unauthorized(INVALID_CREDENTIALS)),
        )
            .into_response()
    }
}

/// Authentication middleware that requires a valid bearer token
///
/// This middleware:
/// 1. Extracts the Authorization header and requires the `Bearer` scheme
/// 2. Validates the token signature, algorithm and expiry
/// 3. Resolves the subject through the user store
/// 4. Adds AuthenticatedUser to request extensions
///
/// # Usage
///
/// ```ignore
/// use axum::{middleware, routing::get, Router};
/// use cq_api::auth::middleware::auth_middleware;
///
/// let app = Router::new()
///     .route("/protected", get(protected_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match authenticate(&state, request.headers()).await {
        Ok(user) => user,
        Err(e) => {
            if !matches!(e, AuthError::Store(_)) {
                audit_log(&AuditEvent::InvalidToken {
                    reason: e.to_string(),
                    client: ClientInfo::from_headers(request.headers()),
                });
            }
            return Err(e);
        }
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = validate_access_token(&state.jwt, token)?;

    // A valid signature is not enough: the subject must still exist
    let user = state
        .users
        .find_by_email(&claims.sub)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?
        .ok_or(AuthError::UnknownSubject)?;

    Ok(AuthenticatedUser {
        email: user.email.clone(),
        user: user.to_public(),
    })
}
