//! Permission configuration
//!
//! A permission config may declare a `master` class. Such a class is a
//! sub-resource of its master and is never searched on its own.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Permission configuration of one class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Class this one inherits its permissions from
    #[serde(default)]
    pub master: Option<String>,
}

impl PermissionConfig {
    /// Config without a master
    pub fn standalone() -> Self {
        Self::default()
    }

    /// Config delegating to a master class
    pub fn with_master(master: impl Into<String>) -> Self {
        Self {
            master: Some(master.into()),
        }
    }
}

/// Read access to permission configurations
pub trait PermissionManager: Send + Sync {
    fn has_config(&self, class: &str) -> bool;

    fn get_config(&self, class: &str) -> Option<PermissionConfig>;
}

/// Permission configurations held in memory
#[derive(Debug, Clone, Default)]
pub struct PermissionRegistry {
    configs: HashMap<String, PermissionConfig>,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the config of a class
    pub fn with_config(mut self, class: impl Into<String>, config: PermissionConfig) -> Self {
        self.configs.insert(class.into(), config);
        self
    }

    pub fn insert(&mut self, class: impl Into<String>, config: PermissionConfig) {
        self.configs.insert(class.into(), config);
    }
}

impl PermissionManager for PermissionRegistry {
    fn has_config(&self, class: &str) -> bool {
        self.configs.contains_key(class)
    }

    fn get_config(&self, class: &str) -> Option<PermissionConfig> {
        self.configs.get(class).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = PermissionRegistry::new()
            .with_config("app.invoice", PermissionConfig::standalone())
            .with_config("app.invoice_line", PermissionConfig::with_master("app.invoice"));

        assert!(registry.has_config("app.invoice"));
        assert!(!registry.has_config("app.customer"));
        assert_eq!(registry.get_config("app.invoice").unwrap().master, None);
        assert_eq!(
            registry.get_config("app.invoice_line").unwrap().master.as_deref(),
            Some("app.invoice")
        );
        assert!(registry.get_config("app.customer").is_none());
    }
}
