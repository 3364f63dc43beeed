//! Metadata catalog
//!
//! The catalog is the process-wide registry of object type metadata.

use std::collections::HashMap;
use std::sync::Arc;

use super::entity::ObjectTypeMetadata;

/// Read access to registered object type metadata
pub trait MetadataCatalog: Send + Sync {
    /// All registered object types, in registration order
    fn all(&self) -> Vec<Arc<ObjectTypeMetadata>>;

    /// Metadata for a backing class
    fn get(&self, class: &str) -> Option<Arc<ObjectTypeMetadata>>;
}

/// Catalog held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: Vec<Arc<ObjectTypeMetadata>>,
    by_class: HashMap<String, usize>,
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register metadata, replacing any previous entry for the same class
    pub fn register(&mut self, metadata: ObjectTypeMetadata) {
        let metadata = Arc::new(metadata);
        match self.by_class.get(&metadata.class) {
            Some(&index) => self.entries[index] = metadata,
            None => {
                self.by_class
                    .insert(metadata.class.clone(), self.entries.len());
                self.entries.push(metadata);
            }
        }
    }

    /// Builder-style registration
    pub fn with(mut self, metadata: ObjectTypeMetadata) -> Self {
        self.register(metadata);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ObjectTypeMetadata> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = ObjectTypeMetadata>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for metadata in iter {
            catalog.register(metadata);
        }
        catalog
    }
}

impl MetadataCatalog for InMemoryCatalog {
    fn all(&self) -> Vec<Arc<ObjectTypeMetadata>> {
        self.entries.clone()
    }

    fn get(&self, class: &str) -> Option<Arc<ObjectTypeMetadata>> {
        self.by_class
            .get(class)
            .map(|&index| Arc::clone(&self.entries[index]))
    }
}
