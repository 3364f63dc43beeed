//! Authorization checks

use std::collections::HashSet;

/// Decides whether the acting subject holds a permission on a class
pub trait AuthorizationChecker: Send + Sync {
    fn is_granted(&self, permission: &str, class: &str) -> bool;
}

/// Authorization backed by a fixed grant list
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorization {
    allow_all: bool,
    grants: HashSet<(String, String)>,
}

impl StaticAuthorization {
    /// Grant every permission on every class
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            grants: HashSet::new(),
        }
    }

    /// Grant nothing until `grant` is called
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// Grant a permission on a class
    pub fn grant(mut self, permission: impl Into<String>, class: impl Into<String>) -> Self {
        self.grants.insert((permission.into(), class.into()));
        self
    }
}

impl AuthorizationChecker for StaticAuthorization {
    fn is_granted(&self, permission: &str, class: &str) -> bool {
        self.allow_all
            || self
                .grants
                .contains(&(permission.to_string(), class.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let auth = StaticAuthorization::allow_all();
        assert!(auth.is_granted("perm:view", "app.anything"));
    }

    #[test]
    fn test_explicit_grants() {
        let auth = StaticAuthorization::deny_all().grant("perm:view", "app.invoice");
        assert!(auth.is_granted("perm:view", "app.invoice"));
        assert!(!auth.is_granted("perm:edit", "app.invoice"));
        assert!(!auth.is_granted("perm:view", "app.customer"));
    }
}
