//! Polysearch Core Library
//!
//! This crate provides the core functionality for Polysearch, including:
//! - Object metadata catalog and catalog definition files
//! - Eligibility resolution (visibility, context, permissions)
//! - Keyword predicates with case and diacritic folding
//! - Per-object search and multi-object aggregation
//! - Storage (in-memory and SQLite object stores)

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::metadata::{
        CatalogDefinition, FieldMetadata, InMemoryCatalog, MetadataCatalog, MetadataContext,
        ObjectTypeMetadata,
    };
    pub use crate::domain::search::{
        FieldFilter, ObjectRecord, ObjectStore, SearchRequest, SearchResult, SearchResults,
        SearchService, SortOrder,
    };
    pub use crate::error::{Error, Result};
    pub use crate::infrastructure::search::{MemoryObjectStore, SqliteObjectStore};
    pub use crate::storage::Database;
}
