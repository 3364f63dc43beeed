//! Infrastructure layer
//!
//! Contains implementations for external systems like databases.

pub mod search;
