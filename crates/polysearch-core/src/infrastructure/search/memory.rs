//! In-memory object store

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::search::value::{SortKey, lookup};
use crate::domain::search::{ObjectQuery, ObjectRecord, ObjectStore, SortDirection};
use crate::domain::specification::Specification;
use crate::error::Result;

/// Object store keeping every record in process memory
///
/// Records of a class keep insertion order; that order breaks ties when
/// sorting.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    records: RwLock<HashMap<String, Vec<ObjectRecord>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, replacing one with the same id in place
    pub async fn insert(&self, class: &str, record: ObjectRecord) {
        let mut records = self.records.write().await;
        let list = records.entry(class.to_string()).or_default();
        match list.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => list.push(record),
        }
    }

    pub async fn insert_many(&self, class: &str, records: impl IntoIterator<Item = ObjectRecord>) {
        for record in records {
            self.insert(class, record).await;
        }
    }

    /// Remove a record, returning whether it existed
    pub async fn remove(&self, class: &str, id: &str) -> bool {
        let mut records = self.records.write().await;
        match records.get_mut(class) {
            Some(list) => {
                let before = list.len();
                list.retain(|r| r.id != id);
                list.len() != before
            }
            None => false,
        }
    }

    /// Number of records stored for a class
    pub async fn len(&self, class: &str) -> usize {
        self.records.read().await.get(class).map_or(0, Vec::len)
    }

    async fn matching(&self, query: &ObjectQuery) -> Vec<ObjectRecord> {
        let records = self.records.read().await;
        let Some(list) = records.get(query.class()) else {
            return Vec::new();
        };

        let views: Vec<ObjectRecord> = list.iter().map(|r| r.view(query.locale())).collect();
        query
            .predicate()
            .select(&views)
            .into_iter()
            .cloned()
            .collect()
    }
}

fn compare(query: &ObjectQuery, a: &ObjectRecord, b: &ObjectRecord) -> Ordering {
    for order in query.order_by() {
        let left = SortKey::of(lookup(&a.data, &order.field));
        let right = SortKey::of(lookup(&b.data, &order.field));
        let ordering = match order.direction {
            SortDirection::Asc => left.cmp(&right),
            SortDirection::Desc => right.cmp(&left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn count(&self, query: &ObjectQuery) -> Result<u64> {
        Ok(self.matching(query).await.len() as u64)
    }

    async fn fetch(&self, query: &ObjectQuery) -> Result<Vec<ObjectRecord>> {
        let mut matched = self.matching(query).await;
        matched.sort_by(|a, b| compare(query, a, b));

        let skip = usize::try_from(query.first_result()).unwrap_or(usize::MAX);
        let take = query
            .max_results()
            .map_or(usize::MAX, |limit| limit as usize);

        Ok(matched.into_iter().skip(skip).take(take).collect())
    }
}
