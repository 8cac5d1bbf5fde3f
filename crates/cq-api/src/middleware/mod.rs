//! HTTP middleware
//!
//! Authentication lives in `crate::auth::middleware`.

pub mod security_headers;

pub use security_headers::security_headers_middleware;
