//! Per-type search execution

use std::sync::Arc;
use tracing::{debug, info};

use super::entity::SearchResult;
use super::predicate::build_predicate;
use super::repository_trait::{CountingPaginator, ObjectStore};
use super::request::{RequestFiltering, RequestPagination, RequestSorting, SearchRequest};
use super::query::ObjectQuery;
use crate::domain::metadata::ObjectTypeMetadata;
use crate::error::Result;

/// Runs the search of a single object type
pub struct TypeSearchExecutor {
    store: Arc<dyn ObjectStore>,
    pagination: Arc<dyn RequestPagination>,
    sorting: Arc<dyn RequestSorting>,
    filtering: Arc<dyn RequestFiltering>,
    default_locale: String,
}

impl TypeSearchExecutor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        pagination: Arc<dyn RequestPagination>,
        sorting: Arc<dyn RequestSorting>,
        filtering: Arc<dyn RequestFiltering>,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            store,
            pagination,
            sorting,
            filtering,
            default_locale: default_locale.into(),
        }
    }

    /// Search one object type
    ///
    /// Without words nothing is queried: the result is empty and only
    /// carries the page size. Request filters apply only when `lock_page`
    /// is set. Store errors are returned as they are.
    pub async fn execute(
        &self,
        metadata: &ObjectTypeMetadata,
        words: &[String],
        request: &SearchRequest,
        lock_page: bool,
    ) -> Result<SearchResult> {
        let alias = ObjectQuery::alias_for(&metadata.name);
        let mut query = self.store.create_query(&metadata.class, &alias);

        if words.is_empty() {
            self.pagination.paginate(&mut query, request, lock_page)?;
            let limit = query.max_results().unwrap_or(0);
            debug!(object = %metadata.name, limit, "Empty query, nothing to search");
            return Ok(SearchResult::empty(metadata.name.clone(), limit));
        }

        debug!(object = %metadata.name, words = words.len(), lock_page, "Searching object");

        query.and_where(build_predicate(metadata, words, &request.query_fields));
        self.pagination.paginate(&mut query, request, lock_page)?;
        self.sorting.sort(&mut query, request)?;
        if lock_page {
            self.filtering.filter(&mut query, request)?;
        }
        if metadata.translatable {
            let locale = request.locale.as_deref().unwrap_or(&self.default_locale);
            query.translate(locale);
        }

        let limit = query.max_results().unwrap_or(0);
        let mut paginator = CountingPaginator::new(self.store.as_ref(), &query);
        let total = paginator.count().await?;

        let result = if total > 0 {
            let items = paginator.items().await?;
            let page = query.page_hint().unwrap_or(1);
            let pages = if limit > 0 {
                total.div_ceil(u64::from(limit))
            } else {
                1
            };
            SearchResult::new(metadata.name.clone(), items, page, limit, pages, total)
        } else {
            SearchResult::empty(metadata.name.clone(), limit)
        };

        info!(
            object = %result.name,
            total = result.total,
            page = result.page,
            pages = result.pages,
            "Object searched"
        );
        Ok(result)
    }
}
