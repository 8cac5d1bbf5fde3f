//! Resource ownership scoping
//!
//! Every per-user store operation takes an [`Owner`]. The only way to obtain
//! one is from the [`AuthenticatedUser`] placed in request extensions by the
//! auth middleware, so a handler cannot address another user's records by
//! passing an id or email from the request.

use super::middleware::AuthenticatedUser;
use std::fmt;

/// Identity that scopes reads and writes of per-user resources
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Owner(String);

impl Owner {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a record stamped with `owner` belongs to this identity
    pub fn owns(&self, owner: &str) -> bool {
        self.0 == owner
    }
}

impl From<&AuthenticatedUser> for Owner {
    fn from(user: &AuthenticatedUser) -> Self {
        Owner(user.email.clone())
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
impl Owner {
    /// Build an owner directly, for store-level tests only
    pub(crate) fn for_tests(email: &str) -> Self {
        Owner(email.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::User;

    #[test]
    fn test_owner_from_authenticated_user() {
        let user = User::new("alice@x.com".to_string(), "hash".to_string());
        let auth = AuthenticatedUser {
            email: user.email.clone(),
            user: user.to_public(),
        };

        let owner = Owner::from(&auth);
        assert_eq!(owner.as_str(), "alice@x.com");
        assert!(owner.owns("alice@x.com"));
        assert!(!owner.owns("bob@x.com"));
    }

    #[test]
    fn test_owner_comparison_is_exact() {
        let owner = Owner::for_tests("Alice@x.com");
        assert!(!owner.owns("alice@x.com"));
        assert!(!owner.owns("Alice@x.com "));
    }
}
