//! Search result entities

use serde::Serialize;
use std::collections::HashMap;

use super::query::ObjectRecord;

/// Paginated result of one object type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub name: String,
    pub items: Vec<ObjectRecord>,
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
    pub pages: u64,
    /// Matches before pagination
    pub total: u64,
}

impl SearchResult {
    pub fn new(
        name: impl Into<String>,
        items: Vec<ObjectRecord>,
        page: u32,
        limit: u32,
        pages: u64,
        total: u64,
    ) -> Self {
        Self {
            name: name.into(),
            items,
            page,
            limit,
            pages,
            total,
        }
    }

    /// First and only page of an empty result
    pub fn empty(name: impl Into<String>, limit: u32) -> Self {
        Self::new(name, Vec::new(), 1, limit, 1, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Results of several object types
///
/// A name seen twice keeps the later result, yet the aggregate total still
/// counts both.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    total: u64,
    objects: Vec<SearchResult>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SearchResults {
    pub fn new(results: impl IntoIterator<Item = SearchResult>) -> Self {
        let mut aggregate = Self::default();

        for result in results {
            aggregate.total += result.total;
            match aggregate.index.get(&result.name) {
                Some(&i) => aggregate.objects[i] = result,
                None => {
                    aggregate
                        .index
                        .insert(result.name.clone(), aggregate.objects.len());
                    aggregate.objects.push(result);
                }
            }
        }

        aggregate
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get_object(&self, name: &str) -> Option<&SearchResult> {
        self.index.get(name).map(|&i| &self.objects[i])
    }

    /// Take ownership of one object's result
    pub fn into_object(mut self, name: &str) -> Option<SearchResult> {
        let i = self.index.remove(name)?;
        Some(self.objects.swap_remove(i))
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|r| r.name.as_str())
    }

    pub fn objects(&self) -> &[SearchResult] {
        &self.objects
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
