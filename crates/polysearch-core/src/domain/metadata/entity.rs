//! Object type and field metadata
//!
//! Describes which entity kinds exist, how they are stored and which of
//! their fields take part in keyword search.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::search::value::is_field_path;

/// Context an object type can be used in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataContext {
    /// Personal (non-organizational) usage
    User,
    /// Usage while acting on behalf of an organization
    Organization,
}

impl MetadataContext {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organization => "organization",
        }
    }
}

impl fmt::Display for MetadataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of an object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Dot-qualified accessor into the stored document
    pub field: String,
    pub public: bool,
    pub searchable: bool,
}

impl FieldMetadata {
    /// Create a public, searchable field
    pub fn searchable(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            public: true,
            searchable: true,
        }
    }

    /// Create a public field excluded from keyword search
    pub fn public(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            public: true,
            searchable: false,
        }
    }

    /// Create a private field
    pub fn private(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            public: false,
            searchable: false,
        }
    }

    /// Whether keyword search may look at this field
    ///
    /// A path no backend can address is never searched.
    pub fn is_search_target(&self) -> bool {
        self.public && self.searchable && is_field_path(&self.field)
    }
}

/// Metadata for one searchable entity kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeMetadata {
    /// Stable external name (e.g. `invoice`)
    pub name: String,
    /// Opaque handle of the backing collection
    pub class: String,
    pub public: bool,
    pub searchable: bool,
    /// Field values carry per-locale translations
    pub translatable: bool,
    pub available_contexts: Vec<MetadataContext>,
    pub fields: Vec<FieldMetadata>,
}

impl ObjectTypeMetadata {
    /// Create public, searchable metadata available in the user context
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            public: true,
            searchable: true,
            translatable: false,
            available_contexts: vec![MetadataContext::User],
            fields: Vec::new(),
        }
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the contexts this type is available in
    pub fn with_contexts(mut self, contexts: Vec<MetadataContext>) -> Self {
        self.available_contexts = contexts;
        self
    }

    /// Set the public flag
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Set the searchable flag
    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    /// Mark field values as translatable
    pub fn with_translatable(mut self, translatable: bool) -> Self {
        self.translatable = translatable;
        self
    }

    /// Check if the type is available in a context
    pub fn supports_context(&self, context: MetadataContext) -> bool {
        self.available_contexts.contains(&context)
    }

    /// Fields keyword search may look at, in declaration order
    pub fn search_fields(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.fields.iter().filter(|f| f.is_search_target())
    }
}
