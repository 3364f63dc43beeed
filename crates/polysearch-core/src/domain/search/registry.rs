//! Eligible object registry
//!
//! Works out which object types the acting subject may search and keeps
//! the answer until `reset` is called. There is no expiry.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::metadata::{MetadataCatalog, MetadataContext, ObjectTypeMetadata};
use crate::domain::security::{AuthorizationChecker, OrganizationalContext, PermissionManager};

/// Object names mapped to their backing classes, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleObjectSet {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl EligibleObjectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object; a repeated name keeps its position and takes the new class
    pub fn insert(&mut self, name: impl Into<String>, class: impl Into<String>) {
        let name = name.into();
        let class = class.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = class,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, class));
            }
        }
    }

    /// Backing class of an object name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, class)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, class)| (name.as_str(), class.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves and memoizes the eligible object set
pub struct ObjectRegistryResolver {
    catalog: Arc<dyn MetadataCatalog>,
    authorization: Arc<dyn AuthorizationChecker>,
    permissions: Arc<dyn PermissionManager>,
    organization: Option<Arc<dyn OrganizationalContext>>,
    view_permission: String,
    cache: RwLock<Option<Arc<EligibleObjectSet>>>,
}

impl ObjectRegistryResolver {
    pub fn new(
        catalog: Arc<dyn MetadataCatalog>,
        authorization: Arc<dyn AuthorizationChecker>,
        permissions: Arc<dyn PermissionManager>,
        organization: Option<Arc<dyn OrganizationalContext>>,
        view_permission: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            authorization,
            permissions,
            organization,
            view_permission: view_permission.into(),
            cache: RwLock::new(None),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn MetadataCatalog> {
        &self.catalog
    }

    /// The eligible set, computed on first use
    ///
    /// Concurrent first calls wait on the write lock, so the catalog is
    /// scanned only once.
    pub async fn resolve(&self) -> Arc<EligibleObjectSet> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Arc::clone(cached);
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref() {
            return Arc::clone(cached);
        }

        let set = Arc::new(self.compute());
        *cache = Some(Arc::clone(&set));
        set
    }

    /// Forget the memoized set
    pub async fn reset(&self) {
        *self.cache.write().await = None;
        info!("Eligible object cache reset");
    }

    fn required_context(&self) -> MetadataContext {
        match &self.organization {
            Some(context) if context.is_organization() => MetadataContext::Organization,
            _ => MetadataContext::User,
        }
    }

    fn compute(&self) -> EligibleObjectSet {
        let context = self.required_context();
        let mut set = EligibleObjectSet::new();

        for metadata in self.catalog.all() {
            match self.exclusion(&metadata, context) {
                None => set.insert(metadata.name.clone(), metadata.class.clone()),
                Some(reason) => {
                    debug!(object = %metadata.name, class = %metadata.class, reason, "Object not searchable")
                }
            }
        }

        info!(eligible = set.len(), context = %context, "Resolved searchable objects");
        set
    }

    fn exclusion(&self, metadata: &ObjectTypeMetadata, context: MetadataContext) -> Option<&'static str> {
        if !metadata.public || !metadata.searchable {
            return Some("not public or not searchable");
        }
        if !metadata.supports_context(context) {
            return Some("context not available");
        }
        if !self
            .authorization
            .is_granted(&self.view_permission, &metadata.class)
        {
            return Some("view permission not granted");
        }
        if self.permissions.has_config(&metadata.class)
            && self
                .permissions
                .get_config(&metadata.class)
                .is_some_and(|config| config.master.is_some())
        {
            return Some("permission config has a master");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::{FieldMetadata, InMemoryCatalog};
    use crate::domain::security::{
        PermissionConfig, PermissionRegistry, StaticAuthorization, StaticOrganizationalContext,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with(
                ObjectTypeMetadata::new("invoice", "app.invoice")
                    .with_field(FieldMetadata::searchable("number")),
            )
            .with(
                ObjectTypeMetadata::new("customer", "app.customer")
                    .with_contexts(vec![MetadataContext::User, MetadataContext::Organization]),
            )
            .with(
                ObjectTypeMetadata::new("team", "app.team")
                    .with_contexts(vec![MetadataContext::Organization]),
            )
            .with(ObjectTypeMetadata::new("secret", "app.secret").with_public(false))
            .with(ObjectTypeMetadata::new("log", "app.log").with_searchable(false))
            .with(ObjectTypeMetadata::new("invoice_line", "app.invoice_line"))
    }

    fn resolver(
        catalog: Arc<dyn MetadataCatalog>,
        authorization: StaticAuthorization,
        organization: Option<Arc<dyn OrganizationalContext>>,
    ) -> ObjectRegistryResolver {
        let permissions = PermissionRegistry::new()
            .with_config("app.customer", PermissionConfig::standalone())
            .with_config("app.invoice_line", PermissionConfig::with_master("app.invoice"));

        ObjectRegistryResolver::new(
            catalog,
            Arc::new(authorization),
            Arc::new(permissions),
            organization,
            "perm:view",
        )
    }

    fn names(set: &EligibleObjectSet) -> Vec<&str> {
        set.names().collect()
    }

    #[tokio::test]
    async fn test_user_context_eligibility() {
        let resolver = resolver(Arc::new(catalog()), StaticAuthorization::allow_all(), None);
        let set = resolver.resolve().await;

        assert_eq!(names(&set), vec!["invoice", "customer"]);
        assert_eq!(set.get("invoice"), Some("app.invoice"));
        assert!(!set.contains("invoice_line"));
    }

    #[tokio::test]
    async fn test_organization_context_eligibility() {
        let organization: Arc<dyn OrganizationalContext> =
            Arc::new(StaticOrganizationalContext::organization());
        let resolver = resolver(
            Arc::new(catalog()),
            StaticAuthorization::allow_all(),
            Some(organization),
        );

        assert_eq!(names(&*resolver.resolve().await), vec!["customer", "team"]);
    }

    #[tokio::test]
    async fn test_user_organizational_context_uses_user_branch() {
        let organization: Arc<dyn OrganizationalContext> =
            Arc::new(StaticOrganizationalContext::user());
        let resolver = resolver(
            Arc::new(catalog()),
            StaticAuthorization::allow_all(),
            Some(organization),
        );

        assert_eq!(names(&*resolver.resolve().await), vec!["invoice", "customer"]);
    }

    #[tokio::test]
    async fn test_view_permission_required() {
        let authorization = StaticAuthorization::deny_all()
            .grant("perm:view", "app.customer")
            .grant("perm:edit", "app.invoice");
        let resolver = resolver(Arc::new(catalog()), authorization, None);

        assert_eq!(names(&*resolver.resolve().await), vec!["customer"]);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_valid() {
        let resolver = resolver(
            Arc::new(InMemoryCatalog::new()),
            StaticAuthorization::allow_all(),
            None,
        );
        assert!(resolver.resolve().await.is_empty());
    }

    struct CountingCatalog {
        inner: InMemoryCatalog,
        scans: AtomicUsize,
    }

    impl MetadataCatalog for CountingCatalog {
        fn all(&self) -> Vec<Arc<ObjectTypeMetadata>> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            self.inner.all()
        }

        fn get(&self, class: &str) -> Option<Arc<ObjectTypeMetadata>> {
            self.inner.get(class)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_resolution_scans_once() {
        let catalog = Arc::new(CountingCatalog {
            inner: catalog(),
            scans: AtomicUsize::new(0),
        });
        let resolver = Arc::new(resolver(
            catalog.clone(),
            StaticAuthorization::allow_all(),
            None,
        ));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.resolve().await.len() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 2);
        }
        assert_eq!(catalog.scans.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_recomputes() {
        let catalog = Arc::new(CountingCatalog {
            inner: catalog(),
            scans: AtomicUsize::new(0),
        });
        let resolver = resolver(catalog.clone(), StaticAuthorization::allow_all(), None);

        resolver.resolve().await;
        resolver.resolve().await;
        assert_eq!(catalog.scans.load(Ordering::SeqCst), 1);

        resolver.reset().await;
        resolver.resolve().await;
        assert_eq!(catalog.scans.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_set_insert_overwrites_in_place() {
        let mut set = EligibleObjectSet::new();
        set.insert("a", "app.a");
        set.insert("b", "app.b");
        set.insert("a", "app.a2");

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![("a", "app.a2"), ("b", "app.b")]
        );
    }
}
