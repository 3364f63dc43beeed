//! Domain layer
//!
//! Contains the core business logic and domain models.

pub mod metadata;
pub mod search;
pub mod security;
pub mod specification;
