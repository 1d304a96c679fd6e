//! # Tool Catalog
//!
//! Discovers which routes of a web application are marked as capabilities,
//! derives input/output schemas and examples for each of them, and publishes
//! the result as a catalog that automated agents can read.
//!
//! Routes are declared through [`routing::CatalogRouter`], which builds the
//! axum router and the route table the scanner reads in one pass. A
//! [`CapabilityRegistry`] bound to that table rebuilds its catalog on every
//! scan, and [`server`] exposes it over HTTP.

pub mod capabilities;
pub mod routing;
pub mod schema;
pub mod server;
pub mod utilities;

pub use capabilities::{
    CapabilityDescriptor, CapabilityMeta, CapabilityRegistry, CatalogError, RouteScanner,
};
pub use routing::{CatalogRouter, HandlerSignature, ParamDesc, RouteInfo, RouteSource, RouteTable};
pub use schema::{Describe, DerivationError, FieldDesc, ModelDesc, SchemaNode, TypeDesc};
pub use utilities::config::Settings;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
