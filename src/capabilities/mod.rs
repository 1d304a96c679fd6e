//! # Capability Catalog
//!
//! Discovers the routes of a web application that are marked as capabilities
//! and publishes a machine-readable descriptor for each one, so automated
//! agents can find out what the application can do and how to call it.
//!
//! ## Discovery Flow
//!
//! 1. Routes are declared through a [`crate::routing::CatalogRouter`], some of
//!    them carrying a [`CapabilityMeta`]
//! 2. The route table is bound to a [`CapabilityRegistry`]
//! 3. `CapabilityRegistry::scan()` runs the [`RouteScanner`], which derives the
//!    input/output schemas and examples of every capability route
//! 4. The catalog is served from `{prefix}/all`

pub mod capability;
pub mod error;
pub mod registry;
pub mod scanner;

pub use capability::{CapabilityDescriptor, CapabilityMeta};
pub use error::CatalogError;
pub use registry::CapabilityRegistry;
pub use scanner::{RouteScanner, DEFAULT_PREFIX};
