//! tool-catalog HTTP server binary.
//!
//! Serves the demo endpoints together with the capability catalog that
//! describes them.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8080)
//! - `HOST`: bind address (default: 0.0.0.0)
//! - `ALLOWED_ORIGINS`: comma-separated CORS origins (default: `*`)
//! - `ENVIRONMENT`: deployment label (default: development)
//! - `TOOL_CATALOG_PREFIX`: catalog mount point (default: /tools)
//! - `RUST_LOG`: tracing filter (default: "info,tool_catalog=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use tool_catalog::server::app_router;
use tool_catalog::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; `log` records from the library are bridged through it.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tool_catalog=debug".into()),
        )
        .init();

    let settings = Settings::from_env().context("Failed to read settings")?;
    tracing::info!("Environment: {}", settings.environment);

    let app = app_router(&settings).context("Failed to build application")?;

    // Startup scan; a failure here leaves the catalog empty until the next scan.
    match app.registry.scan() {
        Ok(count) => tracing::info!("Tool registry initialized with {} tools", count),
        Err(e) => tracing::error!("Startup tool scan failed: {}", e),
    }

    let bind_addr = settings.bind_addr();
    tracing::info!("tool-catalog server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  {}/all     catalog (rescans)", settings.tool_prefix);
    tracing::info!("  GET  {}/scan    rescan, report count", settings.tool_prefix);
    tracing::info!("  GET  {}/list    catalog (no rescan)", settings.tool_prefix);
    tracing::info!("  POST {}/refresh rescan", settings.tool_prefix);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app.router)
        .await
        .context("Server failed")?;
    Ok(())
}
