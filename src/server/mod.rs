//! HTTP surface of the capability catalog.
//!
//! Serves the catalog publisher under the configured prefix alongside the
//! demo endpoints it describes.

pub mod demo;
pub mod routes;

pub use demo::demo_router;
pub use routes::{app_router, tools_router, App, AppState};
