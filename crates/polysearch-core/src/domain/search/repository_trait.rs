//! Storage trait for object search
//!
//! The search core reaches every backend through `ObjectStore`: open a
//! query for a backing class, count its matches and fetch one page.

use async_trait::async_trait;

use crate::error::Result;

use super::query::{ObjectQuery, ObjectRecord};

/// Storage backend the search core runs queries against
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Open an unfiltered query over a backing class
    fn create_query(&self, class: &str, alias: &str) -> ObjectQuery {
        ObjectQuery::new(class, alias)
    }

    /// Number of records matching the query, ignoring pagination
    async fn count(&self, query: &ObjectQuery) -> Result<u64>;

    /// Records of the page the query describes
    async fn fetch(&self, query: &ObjectQuery) -> Result<Vec<ObjectRecord>>;
}

/// Runs a query once for its total and once for the current page
pub struct CountingPaginator<'a> {
    store: &'a dyn ObjectStore,
    query: &'a ObjectQuery,
    total: Option<u64>,
}

impl<'a> CountingPaginator<'a> {
    pub fn new(store: &'a dyn ObjectStore, query: &'a ObjectQuery) -> Self {
        Self {
            store,
            query,
            total: None,
        }
    }

    /// Total matches; the counting query runs at most once
    pub async fn count(&mut self) -> Result<u64> {
        if let Some(total) = self.total {
            return Ok(total);
        }
        let total = self.store.count(self.query).await?;
        self.total = Some(total);
        Ok(total)
    }

    /// Records of the current page
    pub async fn items(&self) -> Result<Vec<ObjectRecord>> {
        self.store.fetch(self.query).await
    }

    pub fn query(&self) -> &ObjectQuery {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        counts: AtomicUsize,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for CountingStore {
        async fn count(&self, _query: &ObjectQuery) -> Result<u64> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        }

        async fn fetch(&self, _query: &ObjectQuery) -> Result<Vec<ObjectRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ObjectRecord::new("1", json!({}))])
        }
    }

    #[tokio::test]
    async fn test_count_runs_once() {
        let store = CountingStore::default();
        let query = store.create_query("app.invoice", "invoice");
        let mut paginator = CountingPaginator::new(&store, &query);

        assert_eq!(paginator.count().await.unwrap(), 7);
        assert_eq!(paginator.count().await.unwrap(), 7);
        assert_eq!(store.counts.load(Ordering::SeqCst), 1);

        assert_eq!(paginator.items().await.unwrap().len(), 1);
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(paginator.query().alias(), "invoice");
    }
}
