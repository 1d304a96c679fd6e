//! Route tables: the collection of registered routes the scanner reads.

use axum::http::Method;
use axum::routing::MethodRouter;
use axum::Router;

use super::route::RouteInfo;
use crate::capabilities::{CapabilityMeta, CatalogError};

/// Anything that can enumerate its registered routes.
///
/// The catalog only ever reads from a route source.
pub trait RouteSource: Send + Sync {
    fn routes(&self) -> Vec<RouteInfo>;
}

// ---------------------------------------------------------------------------
// RouteTable
// ---------------------------------------------------------------------------

/// An ordered list of route declarations.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteInfo>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, route: RouteInfo) {
        self.routes.push(route);
    }

    pub fn with(mut self, route: RouteInfo) -> Self {
        self.add(route);
        self
    }

    /// Attach capability metadata to an already registered route.
    pub fn define_capability(
        &mut self,
        method: Method,
        path: &str,
        meta: CapabilityMeta,
    ) -> Result<(), CatalogError> {
        let route = self
            .routes
            .iter_mut()
            .find(|route| route.path == path && route.methods.contains(&method))
            .ok_or_else(|| CatalogError::UnknownRoute {
                method: method.to_string(),
                path: path.to_string(),
            })?;
        route.capability = Some(meta);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteInfo> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteSource for RouteTable {
    fn routes(&self) -> Vec<RouteInfo> {
        self.routes.clone()
    }
}

// ---------------------------------------------------------------------------
// CatalogRouter
// ---------------------------------------------------------------------------

/// Builds an axum [`Router`] and its [`RouteTable`] side by side.
///
/// Every route added here is both served and visible to the scanner, so the
/// catalog cannot list a path the server does not answer.
pub struct CatalogRouter<S = ()> {
    router: Router<S>,
    table: RouteTable,
}

impl<S> CatalogRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            table: RouteTable::new(),
        }
    }

    /// Serve `handler` at the route's path and record the declaration.
    pub fn route(mut self, route: RouteInfo, handler: MethodRouter<S>) -> Self {
        self.router = self.router.route(&route.path, handler);
        self.table.add(route);
        self
    }

    /// Merge another catalog router's routes into this one.
    pub fn merge(mut self, other: CatalogRouter<S>) -> Self {
        self.router = self.router.merge(other.router);
        self.table.routes.extend(other.table.routes);
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn into_parts(self) -> (Router<S>, RouteTable) {
        (self.router, self.table)
    }
}

impl<S> Default for CatalogRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
