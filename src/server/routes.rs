//! Axum route handlers for the catalog publisher.
//!
//! # Routes
//!
//! - `GET  {prefix}/all`     scans, then returns every descriptor
//! - `GET  {prefix}/scan`    scans, returns `{"tools_found": n}`
//! - `GET  {prefix}/list`    returns the current descriptors without scanning
//! - `POST {prefix}/refresh` scans, returns `{"success": bool, "tools_count": n}`

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::demo::demo_router;
use crate::capabilities::{
    CapabilityDescriptor, CapabilityMeta, CapabilityRegistry, CatalogError, RouteScanner,
};
use crate::routing::{CatalogRouter, HandlerSignature, RouteInfo};
use crate::utilities::config::{AllowedOrigins, Settings};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CapabilityRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }
}

/// A fully assembled application: the served router and the registry bound
/// to its routes.
pub struct App {
    pub router: Router,
    pub registry: Arc<CapabilityRegistry>,
}

/// The publisher's own routes, mounted under `prefix`.
pub fn tools_router(prefix: &str) -> CatalogRouter<AppState> {
    let prefix = RouteScanner::new(prefix).prefix().to_string();

    CatalogRouter::new()
        .route(
            RouteInfo::get(
                format!("{}/all", prefix),
                HandlerSignature::new("list_all_tools")
                    .doc("Get the complete list of registered tools")
                    .returns::<Vec<CapabilityDescriptor>>(),
            )
            .capability(
                CapabilityMeta::new("list_tools")
                    .description("List every capability this service exposes")
                    .tag("catalog"),
            ),
            get(list_all_tools),
        )
        .route(
            RouteInfo::get(format!("{}/scan", prefix), HandlerSignature::new("scan_tools")),
            get(scan_tools),
        )
        .route(
            RouteInfo::get(
                format!("{}/list", prefix),
                HandlerSignature::new("list_tools").returns::<Vec<CapabilityDescriptor>>(),
            ),
            get(list_tools),
        )
        .route(
            RouteInfo::post(format!("{}/refresh", prefix), HandlerSignature::new("refresh_tools")),
            post(refresh_tools),
        )
}

/// Build the application: demo endpoints plus the publisher, with the
/// registry bound to the combined route table.
///
/// No scan is performed here; the caller decides when the first scan runs.
pub fn app_router(settings: &Settings) -> Result<App, CatalogError> {
    let registry = Arc::new(CapabilityRegistry::with_scanner(RouteScanner::new(
        &settings.tool_prefix,
    )));

    let (router, table) = demo_router::<AppState>()
        .merge(tools_router(&settings.tool_prefix))
        .into_parts();
    log::debug!("Application declares {} routes", table.len());
    registry.set_route_source(Arc::new(table))?;

    let router = router
        .layer(cors_layer(&settings.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(Arc::clone(&registry)));

    Ok(App { router, registry })
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    match origins {
        AllowedOrigins::Any => CorsLayer::permissive(),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        log::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(values))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET {prefix}/all: scan, then list.
async fn list_all_tools(State(state): State<AppState>) -> Json<Vec<CapabilityDescriptor>> {
    if let Err(e) = state.registry.scan() {
        log::warn!("Listing tools without a fresh scan: {}", e);
    }
    Json(state.registry.list_all())
}

/// GET {prefix}/scan: rescan and report the count.
async fn scan_tools(State(state): State<AppState>) -> Json<Value> {
    match state.registry.scan() {
        Ok(count) => Json(json!({ "tools_found": count })),
        Err(e) => Json(json!({
            "tools_found": state.registry.len(),
            "error": e.to_string(),
        })),
    }
}

/// GET {prefix}/list: current catalog, no scan.
async fn list_tools(State(state): State<AppState>) -> Json<Vec<CapabilityDescriptor>> {
    Json(state.registry.list_all())
}

/// POST {prefix}/refresh: force a rescan.
async fn refresh_tools(State(state): State<AppState>) -> Json<Value> {
    log::info!("Manual refresh of tool registry requested");
    let success = match state.registry.scan() {
        Ok(_) => true,
        Err(e) => {
            log::error!("Tool refresh failed: {}", e);
            false
        }
    };
    Json(json!({
        "success": success,
        "tools_count": state.registry.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> App {
        app_router(&Settings::default()).unwrap()
    }

    async fn call(router: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn find<'a>(tools: &'a Value, name: &str) -> &'a Value {
        tools
            .as_array()
            .unwrap()
            .iter()
            .find(|tool| tool["name"] == name)
            .unwrap()
    }

    #[tokio::test]
    async fn test_all_scans_and_lists_in_route_order() {
        let app = test_app();
        let (status, tools) = call(app.router, "GET", "/tools/all").await;
        assert_eq!(status, StatusCode::OK);

        let names: Vec<&str> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["health_check", "text_extractor", "get_document", "list_tools"]);
        assert_eq!(app.registry.len(), 4);
    }

    #[tokio::test]
    async fn test_text_extractor_descriptor() {
        let (_, tools) = call(test_app().router, "GET", "/tools/all").await;
        let tool = find(&tools, "text_extractor");

        assert_eq!(tool["endpoint"], "/extract");
        assert_eq!(tool["method"], "POST");
        assert_eq!(tool["tags"], json!(["extraction", "text"]));
        assert_eq!(tool["input_schema"]["required"], json!(["text"]));
        assert_eq!(tool["input_schema"]["properties"]["max_tokens"]["default"], 100);
        assert_eq!(
            tool["output_schema"]["required"],
            json!(["extracted_text", "token_count"])
        );
        assert_eq!(tool["output_schema"]["properties"]["token_count"]["type"], "integer");
        assert_eq!(
            tool["example_input"],
            json!({
                "text": "Extract important information from this document.",
                "max_tokens": 50
            })
        );
    }

    #[tokio::test]
    async fn test_get_document_descriptor() {
        let (_, tools) = call(test_app().router, "GET", "/tools/all").await;
        let tool = find(&tools, "get_document");

        let properties = &tool["input_schema"]["properties"];
        assert_eq!(properties["doc_id"]["in"], "path");
        assert_eq!(properties["include_metadata"]["in"], "query");
        assert_eq!(properties["include_metadata"]["default"], false);
        assert_eq!(tool["input_schema"]["required"], json!(["doc_id"]));
        assert_eq!(
            tool["example_input"],
            json!({ "doc_id": "string", "include_metadata": false })
        );
    }

    #[tokio::test]
    async fn test_health_check_descriptor_uses_meta() {
        let (_, tools) = call(test_app().router, "GET", "/tools/all").await;
        let tool = find(&tools, "health_check");
        assert_eq!(tool["description"], "Check API health status");
        assert_eq!(tool["method"], "GET");
        assert_eq!(tool["example_output"]["status"], "ok");
        assert!(tools
            .as_array()
            .unwrap()
            .iter()
            .all(|tool| tool["endpoint"] != "/internal/stats"));
    }

    #[tokio::test]
    async fn test_scan_reports_count() {
        let (status, body) = call(test_app().router, "GET", "/tools/scan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "tools_found": 4 }));
    }

    #[tokio::test]
    async fn test_scan_unbound_registry_reports_error() {
        let registry = Arc::new(CapabilityRegistry::new());
        let (router, _) = tools_router("/tools").into_parts();
        let router = router.with_state(AppState::new(registry));

        let (status, body) = call(router, "GET", "/tools/scan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tools_found"], 0);
        assert!(body["error"].as_str().unwrap().contains("Configuration error"));
    }

    #[tokio::test]
    async fn test_list_does_not_scan_and_refresh_does() {
        let app = test_app();

        let (_, listed) = call(app.router.clone(), "GET", "/tools/list").await;
        assert_eq!(listed, json!([]));

        let (status, body) = call(app.router.clone(), "POST", "/tools/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "tools_count": 4 }));

        let (_, listed) = call(app.router, "GET", "/tools/list").await;
        assert_eq!(listed.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_demo_endpoints_still_serve() {
        let app = test_app();
        let (status, body) = call(app.router.clone(), "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (_, body) = call(app.router, "GET", "/document/42?include_metadata=true").await;
        assert_eq!(body["title"], "Document 42");
        assert_eq!(body["metadata"]["created"], "2023-01-01");
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let settings = Settings {
            tool_prefix: "/catalog".to_string(),
            ..Settings::default()
        };
        let app = app_router(&settings).unwrap();
        let (_, tools) = call(app.router, "GET", "/catalog/all").await;
        assert_eq!(find(&tools, "list_tools")["endpoint"], "/catalog/all");
    }
}
