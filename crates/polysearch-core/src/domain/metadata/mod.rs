//! Object metadata module
//!
//! # Architecture
//!
//! - **Entities**: `ObjectTypeMetadata`, `FieldMetadata`, `MetadataContext`
//! - **Catalog**: `MetadataCatalog` trait and the `InMemoryCatalog` registry
//! - **Definition**: `CatalogDefinition`, a TOML description of a catalog
//!   together with its permission configs and grants

pub mod catalog;
pub mod definition;
pub mod entity;

pub use catalog::{InMemoryCatalog, MetadataCatalog};
pub use definition::CatalogDefinition;
pub use entity::{FieldMetadata, MetadataContext, ObjectTypeMetadata};
