//! Object store implementations
//!
//! - `MemoryObjectStore`: records held in process memory
//! - `SqliteObjectStore`: records persisted in SQLite

pub mod memory;
pub mod repository;

pub use memory::MemoryObjectStore;
pub use repository::SqliteObjectStore;
