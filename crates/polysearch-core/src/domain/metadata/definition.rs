//! Catalog definition files
//!
//! A catalog definition is a TOML document declaring object types, their
//! fields, permission configs and (optionally) explicit view grants:
//!
//! ```toml
//! [[objects]]
//! name = "invoice"
//! class = "app.invoice"
//! contexts = ["user", "organization"]
//! fields = [
//!     { field = "number" },
//!     { field = "notes", searchable = false },
//! ]
//!
//! [[permissions]]
//! class = "app.invoice_line"
//! master = "app.invoice"
//!
//! [authorization]
//! grants = [{ permission = "perm:view", class = "app.invoice" }]
//! ```
//!
//! Without an `[authorization]` table every permission is granted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::catalog::InMemoryCatalog;
use super::entity::{FieldMetadata, MetadataContext, ObjectTypeMetadata};
use crate::domain::search::value::is_field_path;
use crate::domain::security::{PermissionConfig, PermissionRegistry, StaticAuthorization};
use crate::error::{Error, Result};

fn default_true() -> bool {
    true
}

fn default_contexts() -> Vec<MetadataContext> {
    vec![MetadataContext::User]
}

/// Parsed catalog definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDefinition {
    #[serde(default)]
    pub objects: Vec<ObjectDefinition>,
    #[serde(default)]
    pub permissions: Vec<PermissionDefinition>,
    #[serde(default)]
    pub authorization: Option<AuthorizationDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDefinition {
    pub name: String,
    pub class: String,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default)]
    pub translatable: bool,
    #[serde(default = "default_contexts")]
    pub contexts: Vec<MetadataContext>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub field: String,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default = "default_true")]
    pub searchable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub class: String,
    #[serde(default)]
    pub master: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationDefinition {
    #[serde(default)]
    pub grants: Vec<GrantDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantDefinition {
    pub permission: String,
    pub class: String,
}

impl CatalogDefinition {
    /// Parse a definition from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let definition: Self =
            toml::from_str(contents).map_err(|e| Error::CatalogError(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Read and parse a definition file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::CatalogError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject duplicate object names or classes and unusable field paths
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut classes = HashSet::new();

        for object in &self.objects {
            if object.name.trim().is_empty() || object.class.trim().is_empty() {
                return Err(Error::CatalogError(
                    "Object name and class cannot be empty".to_string(),
                ));
            }
            if !names.insert(object.name.as_str()) {
                return Err(Error::CatalogError(format!(
                    "Duplicate object name '{}'",
                    object.name
                )));
            }
            if !classes.insert(object.class.as_str()) {
                return Err(Error::CatalogError(format!(
                    "Duplicate object class '{}'",
                    object.class
                )));
            }
            if let Some(field) = object.fields.iter().find(|f| !is_field_path(&f.field)) {
                return Err(Error::CatalogError(format!(
                    "Invalid field path '{}' in object '{}'",
                    field.field, object.name
                )));
            }
        }

        Ok(())
    }

    /// Build the metadata catalog
    pub fn catalog(&self) -> InMemoryCatalog {
        self.objects
            .iter()
            .map(|object| ObjectTypeMetadata {
                name: object.name.clone(),
                class: object.class.clone(),
                public: object.public,
                searchable: object.searchable,
                translatable: object.translatable,
                available_contexts: object.contexts.clone(),
                fields: object
                    .fields
                    .iter()
                    .map(|field| FieldMetadata {
                        field: field.field.clone(),
                        public: field.public,
                        searchable: field.searchable,
                    })
                    .collect(),
            })
            .collect()
    }

    /// Build the permission registry
    pub fn permissions(&self) -> PermissionRegistry {
        let mut registry = PermissionRegistry::new();
        for permission in &self.permissions {
            registry.insert(
                permission.class.clone(),
                PermissionConfig {
                    master: permission.master.clone(),
                },
            );
        }
        registry
    }

    /// Build the authorization checker
    pub fn authorization(&self) -> StaticAuthorization {
        match &self.authorization {
            None => StaticAuthorization::allow_all(),
            Some(definition) => definition
                .grants
                .iter()
                .fold(StaticAuthorization::deny_all(), |auth, grant| {
                    auth.grant(grant.permission.clone(), grant.class.clone())
                }),
        }
    }
}
