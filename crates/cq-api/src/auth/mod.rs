//! Authentication and authorization module
//!
//! This module provides JWT-based authentication with the following components:
//! - Token generation and validation
//! - Password hashing with Argon2
//! - Middleware resolving bearer tokens to stored users
//! - Ownership scoping for per-user resources
//! - Authentication service for registration and login

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod ownership;
pub mod password;
pub mod service;

pub use jwt::{generate_access_token, validate_access_token, Claims, JwtConfig};
pub use middleware::{auth_middleware, AuthError, AuthenticatedUser};
pub use models::{CredentialsForm, TokenResponse, User, UserPublic};
pub use ownership::Owner;
pub use password::{hash_password, verify_password};
pub use service::AuthService;
