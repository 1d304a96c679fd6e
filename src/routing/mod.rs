//! Route declarations and route sources.
//!
//! The hosting server declares its routes through [`CatalogRouter`] (or a
//! hand-built [`RouteTable`]); the capability scanner reads them back through
//! the [`RouteSource`] trait and never mutates them.

pub mod route;
pub mod table;

pub use route::{HandlerSignature, ParamDesc, RouteInfo};
pub use table::{CatalogRouter, RouteSource, RouteTable};
