//! Search service orchestrating multi-object search
//!
//! Resolves the requested object names against the eligible set, runs
//! every object search concurrently and folds the outcomes into one
//! `SearchResults`.

use futures_util::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::entity::{SearchResult, SearchResults};
use super::executor::TypeSearchExecutor;
use super::predicate::tokenize;
use super::registry::{EligibleObjectSet, ObjectRegistryResolver};
use super::repository_trait::ObjectStore;
use super::request::{
    FilterFromRequest, PageFromRequest, RequestFiltering, RequestPagination, RequestSorting,
    SearchRequest, SortFromRequest,
};
use crate::config::SearchConfig;
use crate::domain::metadata::{MetadataCatalog, ObjectTypeMetadata};
use crate::domain::security::{
    AuthorizationChecker, OrganizationalContext, PermissionManager, PermissionRegistry,
    StaticAuthorization,
};
use crate::error::{Error, Result};

/// Keyword search across eligible object types
pub struct SearchService {
    registry: ObjectRegistryResolver,
    executor: TypeSearchExecutor,
}

impl SearchService {
    /// Start building a service
    pub fn builder() -> SearchServiceBuilder {
        SearchServiceBuilder::default()
    }

    /// Search several object types
    ///
    /// An empty `objects` list searches every eligible object. Names that
    /// are not eligible are skipped. When exactly one distinct name is
    /// given the search runs in single-object mode: first page only, with
    /// the request filters applied.
    pub async fn search(
        &self,
        request: &SearchRequest,
        query: &str,
        objects: &[&str],
    ) -> Result<SearchResults> {
        let words = tokenize(query);

        let mut seen = HashSet::new();
        let requested: Vec<&str> = objects
            .iter()
            .copied()
            .filter(|name| seen.insert(*name))
            .collect();
        let lock_page = requested.len() == 1;

        let eligible = self.registry.resolve().await;
        let targets = self.targets(&eligible, &requested)?;

        let searches = targets
            .iter()
            .map(|metadata| self.executor.execute(metadata, &words, request, lock_page));
        let results = SearchResults::new(try_join_all(searches).await?);

        info!(
            objects = results.len(),
            total = results.total(),
            words = words.len(),
            "Search completed"
        );
        Ok(results)
    }

    /// Search a single object type
    ///
    /// Fails with `Error::InvalidArgument` when the object is unknown or
    /// not eligible.
    pub async fn search_one(
        &self,
        request: &SearchRequest,
        object: &str,
        query: &str,
    ) -> Result<SearchResult> {
        self.search(request, query, &[object])
            .await?
            .into_object(object)
            .ok_or_else(|| Error::InvalidArgument(object.to_string()))
    }

    /// The memoized eligible object set
    pub async fn eligible_objects(&self) -> Arc<EligibleObjectSet> {
        self.registry.resolve().await
    }

    /// Drop the memoized eligible object set
    pub async fn reset_cache(&self) {
        self.registry.reset().await;
    }

    fn targets(
        &self,
        eligible: &EligibleObjectSet,
        requested: &[&str],
    ) -> Result<Vec<Arc<ObjectTypeMetadata>>> {
        let classes: Vec<&str> = if requested.is_empty() {
            eligible.iter().map(|(_, class)| class).collect()
        } else {
            requested
                .iter()
                .filter_map(|name| {
                    let class = eligible.get(name);
                    if class.is_none() {
                        debug!(object = %name, "Skipping object that is not searchable");
                    }
                    class
                })
                .collect()
        };

        classes
            .into_iter()
            .map(|class| {
                self.registry
                    .catalog()
                    .get(class)
                    .ok_or_else(|| Error::MetadataNotFound(class.to_string()))
            })
            .collect()
    }
}

/// Builder for `SearchService`
///
/// A catalog and a store are required. Authorization defaults to granting
/// everything, permissions to an empty registry and the helpers to the
/// request-driven defaults configured from `SearchConfig`.
#[derive(Default)]
pub struct SearchServiceBuilder {
    catalog: Option<Arc<dyn MetadataCatalog>>,
    store: Option<Arc<dyn ObjectStore>>,
    authorization: Option<Arc<dyn AuthorizationChecker>>,
    permissions: Option<Arc<dyn PermissionManager>>,
    organization: Option<Arc<dyn OrganizationalContext>>,
    config: SearchConfig,
    pagination: Option<Arc<dyn RequestPagination>>,
    sorting: Option<Arc<dyn RequestSorting>>,
    filtering: Option<Arc<dyn RequestFiltering>>,
}

impl SearchServiceBuilder {
    pub fn catalog(mut self, catalog: Arc<dyn MetadataCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn authorization(mut self, authorization: Arc<dyn AuthorizationChecker>) -> Self {
        self.authorization = Some(authorization);
        self
    }

    pub fn permissions(mut self, permissions: Arc<dyn PermissionManager>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn organization(mut self, organization: Arc<dyn OrganizationalContext>) -> Self {
        self.organization = Some(organization);
        self
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pagination(mut self, pagination: Arc<dyn RequestPagination>) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn sorting(mut self, sorting: Arc<dyn RequestSorting>) -> Self {
        self.sorting = Some(sorting);
        self
    }

    pub fn filtering(mut self, filtering: Arc<dyn RequestFiltering>) -> Self {
        self.filtering = Some(filtering);
        self
    }

    pub fn build(self) -> Result<SearchService> {
        self.config
            .validate()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let catalog = self
            .catalog
            .ok_or_else(|| Error::ConfigError("A metadata catalog is required".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| Error::ConfigError("An object store is required".to_string()))?;

        let registry = ObjectRegistryResolver::new(
            catalog,
            self.authorization
                .unwrap_or_else(|| Arc::new(StaticAuthorization::allow_all())),
            self.permissions
                .unwrap_or_else(|| Arc::new(PermissionRegistry::new())),
            self.organization,
            self.config.view_permission.clone(),
        );

        let executor = TypeSearchExecutor::new(
            store,
            self.pagination
                .unwrap_or_else(|| Arc::new(PageFromRequest::from(&self.config))),
            self.sorting.unwrap_or_else(|| Arc::new(SortFromRequest)),
            self.filtering.unwrap_or_else(|| Arc::new(FilterFromRequest)),
            self.config.default_locale.clone(),
        );

        Ok(SearchService { registry, executor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::{FieldMetadata, InMemoryCatalog};
    use crate::domain::search::query::{ObjectQuery, ObjectRecord};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;

    /// Store returning a fixed total per class
    struct FixedStore(HashMap<&'static str, u64>);

    #[async_trait]
    impl ObjectStore for FixedStore {
        async fn count(&self, query: &ObjectQuery) -> Result<u64> {
            Ok(self.0.get(query.class()).copied().unwrap_or(0))
        }

        async fn fetch(&self, query: &ObjectQuery) -> Result<Vec<ObjectRecord>> {
            let total = self.0.get(query.class()).copied().unwrap_or(0);
            Ok((0..total)
                .map(|i| ObjectRecord::new(i.to_string(), json!({})))
                .collect())
        }
    }

    fn service() -> SearchService {
        let catalog = InMemoryCatalog::new()
            .with(
                ObjectTypeMetadata::new("invoice", "app.invoice")
                    .with_field(FieldMetadata::searchable("number")),
            )
            .with(
                ObjectTypeMetadata::new("customer", "app.customer")
                    .with_field(FieldMetadata::searchable("name")),
            );
        let store = FixedStore(HashMap::from([("app.invoice", 3), ("app.customer", 2)]));

        SearchService::builder()
            .catalog(Arc::new(catalog))
            .store(Arc::new(store))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_all_eligible() {
        let results = service()
            .search(&SearchRequest::new(), "x", &[])
            .await
            .unwrap();

        assert_eq!(
            results.object_names().collect::<Vec<_>>(),
            vec!["invoice", "customer"]
        );
        assert_eq!(results.total(), 5);
    }

    #[tokio::test]
    async fn test_unknown_names_dropped() {
        let results = service()
            .search(&SearchRequest::new(), "x", &["ghost", "customer"])
            .await
            .unwrap();

        assert_eq!(results.object_names().collect::<Vec<_>>(), vec!["customer"]);
        assert_eq!(results.total(), 2);
    }

    #[tokio::test]
    async fn test_search_one_unknown_object() {
        let err = service()
            .search_one(&SearchRequest::new(), "Ghost", "x")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(ref name) if name == "Ghost"));
        assert!(err.to_string().contains("\"Ghost\""));
    }

    #[tokio::test]
    async fn test_search_one() {
        let result = service()
            .search_one(&SearchRequest::new(), "invoice", "x")
            .await
            .unwrap();
        assert_eq!(result.name, "invoice");
        assert_eq!(result.total, 3);
    }

    #[tokio::test]
    async fn test_builder_requires_catalog_and_store() {
        let err = SearchService::builder().build().err().unwrap();
        assert_eq!(err.code(), "E600");

        let err = SearchService::builder()
            .catalog(Arc::new(InMemoryCatalog::new()))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("object store"));
    }

    #[tokio::test]
    async fn test_builder_rejects_invalid_config() {
        let config = SearchConfig {
            default_limit: 0,
            ..SearchConfig::default()
        };
        let err = SearchService::builder()
            .catalog(Arc::new(InMemoryCatalog::new()))
            .store(Arc::new(FixedStore(HashMap::new())))
            .config(config)
            .build()
            .err()
            .unwrap();
        assert_eq!(err.code(), "E600");
    }

    #[tokio::test]
    async fn test_eligible_objects_and_reset() {
        let service = service();
        let first = service.eligible_objects().await;
        assert_eq!(first.len(), 2);

        service.reset_cache().await;
        let second = service.eligible_objects().await;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }
}
