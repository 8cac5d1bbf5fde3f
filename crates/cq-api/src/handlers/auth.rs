//! Authentication API handlers
//!
//! Registration and login take form-encoded credentials, the shape OAuth2
//! password-grant clients send: the email travels in the `username` field.

use crate::audit::ClientInfo;
use crate::auth::{AuthenticatedUser, CredentialsForm, TokenResponse, UserPublic};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, Extension, Form, Json};
use std::sync::Arc;

/// Register a new user account
///
/// Creates the user and logs them in: the response carries a bearer token.
///
/// # Responses
///
/// * `200 OK` - User registered, token issued
/// * `400 Bad Request` - Missing email, password under 6 characters or email taken
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "auth",
    request_body(content = CredentialsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User registered", body = TokenResponse),
        (status = 400, description = "Invalid input or email already registered", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = state
        .auth
        .register(&form.username, &form.password, ClientInfo::from_headers(&headers))
        .await?;

    Ok(Json(response))
}

/// Login with email and password
///
/// # Responses
///
/// * `200 OK` - Token issued
/// * `401 Unauthorized` - Unknown email or wrong password (indistinguishable)
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = CredentialsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Incorrect email or password", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = state
        .auth
        .login(&form.username, &form.password, ClientInfo::from_headers(&headers))
        .await?;

    Ok(Json(response))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserPublic),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me_handler(Extension(user): Extension<AuthenticatedUser>) -> Json<UserPublic> {
    Json(user.user)
}
