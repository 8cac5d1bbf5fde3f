//! Security audit logging for authentication events
//!
//! Registration, login and rejected-token events are logged at INFO level on
//! the "audit" target so they can be filtered and routed separately from
//! application logs. Passwords and tokens are never part of an event.
//!
//! # Example
//!
//! ```ignore
//! use cq_api::audit::{audit_log, AuditEvent, ClientInfo};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     email: "alice@x.com".to_string(),
//!     client: ClientInfo::from_headers(request.headers()),
//! });
//! ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request origin attached to every audit event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: extract_ip_address(headers),
            user_agent: extract_user_agent(headers),
        }
    }
}

/// Security audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    RegistrationSuccess {
        email: String,
        #[serde(flatten)]
        client: ClientInfo,
    },

    RegistrationFailure {
        email: String,
        reason: String,
        #[serde(flatten)]
        client: ClientInfo,
    },

    LoginSuccess {
        email: String,
        #[serde(flatten)]
        client: ClientInfo,
    },

    /// Unknown email and wrong password are both logged here; only the
    /// reason field tells them apart
    LoginFailure {
        email: String,
        reason: String,
        #[serde(flatten)]
        client: ClientInfo,
    },

    /// A protected route was called with a missing, malformed, expired or
    /// unresolvable token
    InvalidToken {
        reason: String,
        #[serde(flatten)]
        client: ClientInfo,
    },
}

impl AuditEvent {
    fn summary(&self) -> &'static str {
        match self {
            AuditEvent::RegistrationSuccess { .. } => "Registration successful",
            AuditEvent::RegistrationFailure { .. } => "Registration failed",
            AuditEvent::LoginSuccess { .. } => "Login successful",
            AuditEvent::LoginFailure { .. } => "Login failed",
            AuditEvent::InvalidToken { .. } => "Invalid token",
        }
    }

    fn client(&self) -> &ClientInfo {
        match self {
            AuditEvent::RegistrationSuccess { client, .. }
            | AuditEvent::RegistrationFailure { client, .. }
            | AuditEvent::LoginSuccess { client, .. }
            | AuditEvent::LoginFailure { client, .. }
            | AuditEvent::InvalidToken { client, .. } => client,
        }
    }

    fn email(&self) -> Option<&str> {
        match self {
            AuditEvent::RegistrationSuccess { email, .. }
            | AuditEvent::RegistrationFailure { email, .. }
            | AuditEvent::LoginSuccess { email, .. }
            | AuditEvent::LoginFailure { email, .. } => Some(email),
            AuditEvent::InvalidToken { .. } => None,
        }
    }
}

/// Log a security audit event with structured fields
///
/// The whole event is also attached as JSON in the `event` field for log
/// aggregators.
pub fn audit_log(event: &AuditEvent) {
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));
    let client = event.client();

    info!(
        target: "audit",
        event = %event_json,
        email = ?event.email(),
        ip_address = ?client.ip_address,
        user_agent = ?client.user_agent,
        "{}",
        event.summary()
    );
}

/// Extract the client IP address from proxy headers
///
/// Checks X-Forwarded-For (first hop) then X-Real-IP.
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(first_ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        return Some(first_ip.trim().to_string());
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::LoginFailure {
            email: "alice@x.com".to_string(),
            reason: "wrong password".to_string(),
            client: ClientInfo {
                ip_address: Some("192.168.1.1".to_string()),
                user_agent: None,
            },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "login_failure");
        assert_eq!(json["email"], "alice@x.com");
        assert_eq!(json["ip_address"], "192.168.1.1");
    }

    #[test]
    fn test_audit_log_does_not_panic() {
        audit_log(&AuditEvent::RegistrationSuccess {
            email: "alice@x.com".to_string(),
            client: ClientInfo::default(),
        });
        audit_log(&AuditEvent::InvalidToken {
            reason: "Token has expired".to_string(),
            client: ClientInfo::default(),
        });
    }

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        assert_eq!(extract_ip_address(&headers), Some("10.0.0.2".to_string()));
    }

    #[test]
    fn test_client_info_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.5.0"));

        let client = ClientInfo::from_headers(&headers);
        assert_eq!(client.user_agent.as_deref(), Some("curl/8.5.0"));
        assert!(client.ip_address.is_none());
    }
}
