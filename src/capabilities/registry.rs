//! Capability Registry: the live catalog of discovered capabilities.
//!
//! The registry is bound once to a [`RouteSource`] and rebuilt from it on
//! every [`CapabilityRegistry::scan`]. A scan builds a fresh map and swaps it
//! in whole, so readers see either the previous catalog or the new one.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};

use super::capability::CapabilityDescriptor;
use super::error::CatalogError;
use super::scanner::RouteScanner;
use crate::routing::RouteSource;

type Catalog = IndexMap<String, CapabilityDescriptor>;

/// Name-keyed, insertion-ordered catalog of capability descriptors.
pub struct CapabilityRegistry {
    /// Current catalog, replaced wholesale by each scan.
    tools: RwLock<Arc<Catalog>>,

    route_source: OnceCell<Arc<dyn RouteSource>>,

    scanner: RouteScanner,

    /// Serializes writers (scans, `register`, `clear`); readers never take it.
    update_lock: Mutex<()>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    /// Create an empty, unbound registry using the default `/tools` prefix.
    pub fn new() -> Self {
        Self::with_scanner(RouteScanner::default())
    }

    pub fn with_scanner(scanner: RouteScanner) -> Self {
        Self {
            tools: RwLock::new(Arc::new(Catalog::new())),
            route_source: OnceCell::new(),
            scanner,
            update_lock: Mutex::new(()),
        }
    }

    /// Bind the route source that scans read from. Allowed once.
    pub fn set_route_source(&self, source: Arc<dyn RouteSource>) -> Result<(), CatalogError> {
        self.route_source
            .set(source)
            .map_err(|_| CatalogError::RouteSourceAlreadyBound)
    }

    pub fn is_bound(&self) -> bool {
        self.route_source.get().is_some()
    }

    pub fn scanner(&self) -> &RouteScanner {
        &self.scanner
    }

    /// Insert or replace a descriptor by name.
    ///
    /// A replaced entry moves to the end of the listing order. Waits for a
    /// running scan to finish, so the entry is never lost to its swap; the
    /// next scan still rebuilds the catalog without it.
    pub fn register(&self, descriptor: CapabilityDescriptor) {
        log::info!("Registering tool: {}", descriptor.name);
        let _updating = self.update_lock.lock();
        let mut guard = self.tools.write();
        let tools = Arc::make_mut(&mut *guard);
        tools.shift_remove(&descriptor.name);
        tools.insert(descriptor.name.clone(), descriptor);
    }

    pub fn clear(&self) {
        let _updating = self.update_lock.lock();
        *self.tools.write() = Arc::new(Catalog::new());
    }

    /// Rebuild the catalog from the bound route source.
    ///
    /// Returns the number of capabilities now registered. When two routes
    /// share a capability name the later route wins.
    pub fn scan(&self) -> Result<usize, CatalogError> {
        let Some(source) = self.route_source.get() else {
            log::error!("Cannot scan for tools - app not set");
            return Err(CatalogError::Configuration(
                "no route source bound to the registry".to_string(),
            ));
        };

        let _updating = self.update_lock.lock();
        let mut fresh = Catalog::new();
        for descriptor in self.scanner.scan(source.as_ref()) {
            log::info!("Registering tool: {}", descriptor.name);
            if fresh.shift_remove(&descriptor.name).is_some() {
                log::warn!(
                    "Duplicate tool name '{}'; keeping the one at {}",
                    descriptor.name,
                    descriptor.endpoint_path
                );
            }
            fresh.insert(descriptor.name.clone(), descriptor);
        }

        let count = fresh.len();
        *self.tools.write() = Arc::new(fresh);
        Ok(count)
    }

    /// All descriptors in listing order.
    pub fn list_all(&self) -> Vec<CapabilityDescriptor> {
        self.snapshot().values().cloned().collect()
    }

    /// A consistent view of the catalog as of the last completed update.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.tools.read().clone()
    }

    pub fn get(&self, name: &str) -> Option<CapabilityDescriptor> {
        self.tools.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    /// Descriptors carrying `tag`, in listing order.
    pub fn search_by_tag(&self, tag: &str) -> Vec<CapabilityDescriptor> {
        self.snapshot()
            .values()
            .filter(|descriptor| descriptor.has_tag(tag))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("tools", &self.len())
            .field("bound", &self.is_bound())
            .field("prefix", &self.scanner.prefix())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::capabilities::CapabilityMeta;
    use crate::routing::{HandlerSignature, ParamDesc, RouteInfo, RouteTable};
    use crate::schema::SchemaNode;

    fn descriptor(name: &str, path: &str) -> CapabilityDescriptor {
        CapabilityDescriptor {
            name: name.to_string(),
            description: String::new(),
            endpoint_path: path.to_string(),
            method: "GET".to_string(),
            input_schema: SchemaNode::open_object(None),
            output_schema: SchemaNode::open_object(None),
            tags: Default::default(),
            example_input: None,
            example_output: None,
        }
    }

    fn names(registry: &CapabilityRegistry) -> Vec<String> {
        registry.list_all().into_iter().map(|d| d.name).collect()
    }

    fn mixed_routes_table() -> RouteTable {
        RouteTable::new()
            .with(
                RouteInfo::get("/", HandlerSignature::new("health_check").returns::<String>())
                    .capability(CapabilityMeta::new("health_check").tag("system")),
            )
            .with(
                RouteInfo::get(
                    "/document/{doc_id}",
                    HandlerSignature::new("get_document").param(ParamDesc::of::<String>("doc_id")),
                )
                .capability(CapabilityMeta::new("get_document").tag("documents")),
            )
            .with(RouteInfo::get("/internal/stats", HandlerSignature::new("internal_stats")))
    }

    #[test]
    fn test_register_overwrites_and_moves_to_end() {
        let registry = CapabilityRegistry::new();
        registry.register(descriptor("a", "/a"));
        registry.register(descriptor("b", "/b"));
        registry.register(descriptor("a", "/a2"));

        assert_eq!(names(&registry), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(registry.get("a").unwrap().endpoint_path, "/a2");
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_scan_without_route_source_is_configuration_error() {
        let registry = CapabilityRegistry::new();
        registry.register(descriptor("kept", "/kept"));

        let err = registry.scan().unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
        assert_eq!(names(&registry), vec!["kept".to_string()]);
    }

    #[test]
    fn test_scan_skips_unmarked_routes() {
        let registry = CapabilityRegistry::new();
        registry.set_route_source(Arc::new(mixed_routes_table())).unwrap();

        assert_eq!(registry.scan().unwrap(), 2);
        assert_eq!(
            names(&registry),
            vec!["health_check".to_string(), "get_document".to_string()]
        );
        assert!(registry.get("internal_stats").is_none());
    }

    #[test]
    fn test_scan_replaces_manual_entries_and_is_idempotent() {
        let registry = CapabilityRegistry::new();
        registry.register(descriptor("stale", "/stale"));
        registry.set_route_source(Arc::new(mixed_routes_table())).unwrap();

        registry.scan().unwrap();
        let first = registry.list_all();
        registry.scan().unwrap();

        assert!(registry.get("stale").is_none());
        assert_eq!(first, registry.list_all());
    }

    #[test]
    fn test_duplicate_names_last_route_wins() {
        let table = RouteTable::new()
            .with(
                RouteInfo::get("/v1/search", HandlerSignature::new("search_v1"))
                    .capability(CapabilityMeta::new("search")),
            )
            .with(
                RouteInfo::get("/health", HandlerSignature::new("health"))
                    .capability(CapabilityMeta::new("health")),
            )
            .with(
                RouteInfo::get("/v2/search", HandlerSignature::new("search_v2"))
                    .capability(CapabilityMeta::new("search")),
            );
        let registry = CapabilityRegistry::new();
        registry.set_route_source(Arc::new(table)).unwrap();

        assert_eq!(registry.scan().unwrap(), 2);
        assert_eq!(names(&registry), vec!["health".to_string(), "search".to_string()]);
        assert_eq!(registry.get("search").unwrap().endpoint_path, "/v2/search");
    }

    #[test]
    fn test_search_by_tag() {
        let registry = CapabilityRegistry::new();
        registry.set_route_source(Arc::new(mixed_routes_table())).unwrap();
        registry.scan().unwrap();

        let found = registry.search_by_tag("documents");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "get_document");
        assert_eq!(found[0].example_input, Some(json!({ "doc_id": "string" })));
        assert!(registry.search_by_tag("missing").is_empty());
    }

    #[test]
    fn test_route_source_binds_once() {
        let registry = CapabilityRegistry::new();
        assert!(!registry.is_bound());
        registry.set_route_source(Arc::new(RouteTable::new())).unwrap();
        assert!(registry.is_bound());

        let err = registry
            .set_route_source(Arc::new(RouteTable::new()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::RouteSourceAlreadyBound));
    }

    #[test]
    fn test_register_waits_for_running_update() {
        let registry = CapabilityRegistry::new();
        registry.set_route_source(Arc::new(mixed_routes_table())).unwrap();
        registry.scan().unwrap();

        let held = registry.update_lock.lock();
        std::thread::scope(|scope| {
            let writer = scope.spawn(|| registry.register(descriptor("manual", "/manual")));
            std::thread::sleep(Duration::from_millis(50));
            assert!(registry.get("manual").is_none());
            drop(held);
            writer.join().unwrap();
        });

        assert_eq!(registry.get("manual").unwrap().endpoint_path, "/manual");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_concurrent_scans_and_reads_see_whole_catalogs() {
        let registry = CapabilityRegistry::new();
        registry.set_route_source(Arc::new(mixed_routes_table())).unwrap();
        let expected = vec!["health_check".to_string(), "get_document".to_string()];

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        assert_eq!(registry.scan().unwrap(), 2);
                    }
                });
            }
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let seen = names(&registry);
                        assert!(seen.is_empty() || seen == expected, "partial catalog: {:?}", seen);
                    }
                });
            }
        });

        assert_eq!(names(&registry), expected);
    }

    #[test]
    fn test_snapshot_survives_later_scan() {
        let registry = CapabilityRegistry::new();
        registry.register(descriptor("old", "/old"));
        let before = registry.snapshot();

        registry.set_route_source(Arc::new(mixed_routes_table())).unwrap();
        registry.scan().unwrap();

        assert!(before.contains_key("old"));
        assert!(!registry.snapshot().contains_key("old"));
    }
}
