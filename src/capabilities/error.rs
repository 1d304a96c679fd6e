//! Catalog errors.

use thiserror::Error;

/// Errors reported to callers of the capability registry.
///
/// Per-route derivation problems are not in here: those degrade the affected
/// descriptor and are only logged.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The registry was asked to scan before a route source was bound.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `set_route_source` was called on an already bound registry.
    #[error("Registry is already bound to a route source")]
    RouteSourceAlreadyBound,

    /// Capability metadata was attached to a route that is not registered.
    #[error("No route registered for {method} {path}")]
    UnknownRoute { method: String, path: String },
}
