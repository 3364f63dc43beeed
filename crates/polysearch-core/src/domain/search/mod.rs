//! Search domain module
//!
//! Keyword search across every object type the acting subject may see.
//!
//! # Architecture
//!
//! - **Registry**: `ObjectRegistryResolver` memoizes the eligible object set
//! - **Predicates**: `build_predicate` turns query words into a field filter
//! - **Executor**: `TypeSearchExecutor` runs one object type's search
//! - **Service**: `SearchService` fans out and aggregates into `SearchResults`
//! - **Storage**: `ObjectStore` is the only seam to a backend
//!
//! # Example
//!
//! ```ignore
//! use polysearch_core::domain::search::{SearchRequest, SearchService};
//!
//! let service = SearchService::builder()
//!     .catalog(catalog)
//!     .store(store)
//!     .build()?;
//!
//! // Every eligible object
//! let results = service.search(&SearchRequest::new(), "widget", &[]).await?;
//!
//! // One object, with request filters
//! let request = SearchRequest::new().with_filter("status=paid".parse()?);
//! let invoices = service.search_one(&request, "invoice", "widget").await?;
//! ```

pub mod entity;
pub mod executor;
pub mod predicate;
pub mod query;
pub mod registry;
pub mod repository_trait;
pub mod request;
pub mod service;
pub mod value;

// Re-export main types
pub use entity::{SearchResult, SearchResults};
pub use executor::TypeSearchExecutor;
pub use predicate::{CompareOp, Predicate, build_predicate, tokenize};
pub use query::{ObjectQuery, ObjectRecord, SortDirection, SortOrder};
pub use registry::{EligibleObjectSet, ObjectRegistryResolver};
pub use repository_trait::{CountingPaginator, ObjectStore};
pub use request::{
    FieldFilter, FilterFromRequest, FilterOperator, PageFromRequest, RequestFiltering,
    RequestPagination, RequestSorting, SearchRequest, SortFromRequest,
};
pub use service::{SearchService, SearchServiceBuilder};
