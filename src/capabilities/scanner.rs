//! Route scanner: discovers capability routes and turns them into descriptors.

use serde_json::Value;

use super::capability::{CapabilityDescriptor, CapabilityMeta};
use crate::routing::{RouteInfo, RouteSource};
use crate::schema::{
    derive_body_input, derive_output, derive_param_input, synthesize, DerivationError, Derived,
    SchemaNode,
};
use crate::utilities::string_utils::{is_under_prefix, normalize_prefix};

/// Default mount point of the catalog's own routes.
pub const DEFAULT_PREFIX: &str = "/tools";

/// Walks a route source and produces one descriptor per capability route.
///
/// Routes under the catalog's own prefix are housekeeping and are skipped,
/// except the listing route, which is scanned like any other route so it can
/// describe itself.
#[derive(Debug, Clone)]
pub struct RouteScanner {
    prefix: String,
    listing_path: String,
}

impl Default for RouteScanner {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl RouteScanner {
    pub fn new(prefix: &str) -> Self {
        let prefix = normalize_prefix(prefix);
        let listing_path = format!("{}/all", prefix);
        Self {
            prefix,
            listing_path,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn listing_path(&self) -> &str {
        &self.listing_path
    }

    /// Whether `path` belongs to the catalog's own surface and should be skipped.
    pub fn is_housekeeping(&self, path: &str) -> bool {
        !self.prefix.is_empty() && is_under_prefix(path, &self.prefix) && path != self.listing_path
    }

    /// Scan every route and describe the capabilities among them, in route order.
    pub fn scan(&self, source: &dyn RouteSource) -> Vec<CapabilityDescriptor> {
        log::info!("Starting tool scan");
        let routes = source.routes();
        let mut descriptors = Vec::new();

        for route in &routes {
            if self.is_housekeeping(&route.path) {
                continue;
            }
            log::debug!("Examining route: {} - {}", route.path, route.handler.name);

            let Some(meta) = route.capability_meta() else {
                continue;
            };
            log::info!("Found tool: {} at {}", meta.name, route.path);
            descriptors.push(self.describe(route, meta));
        }

        log::info!(
            "Tool scan complete. Found {} tools out of {} routes.",
            descriptors.len(),
            routes.len()
        );
        descriptors
    }

    /// Build the descriptor for one capability route.
    ///
    /// Derivation failures are contained here: the failing schema becomes an
    /// open object that names the problem, and the descriptor is still produced.
    pub fn describe(&self, route: &RouteInfo, meta: &CapabilityMeta) -> CapabilityDescriptor {
        let input = if route.carries_body() {
            derive_body_input(&route.handler, &route.path)
        } else {
            derive_param_input(&route.handler, &route.path)
        };
        let output = derive_output(&route.handler);

        let (input_schema, example_input) =
            settle(input, meta.example_input.as_ref(), "input", meta, route);
        let (output_schema, example_output) =
            settle(output, meta.example_output.as_ref(), "output", meta, route);

        let description = meta
            .description
            .clone()
            .or_else(|| route.handler.doc.as_ref().map(|doc| doc.trim().to_string()))
            .unwrap_or_default();

        CapabilityDescriptor {
            name: meta.name.clone(),
            description,
            endpoint_path: route.path.clone(),
            method: route.primary_method().to_string(),
            input_schema,
            output_schema,
            tags: meta.tags.clone(),
            example_input,
            example_output,
        }
    }
}

/// Turn a derivation result into a schema and example, degrading on error.
fn settle(
    derived: Result<Derived, DerivationError>,
    capability_example: Option<&Value>,
    side: &str,
    meta: &CapabilityMeta,
    route: &RouteInfo,
) -> (SchemaNode, Option<Value>) {
    match derived {
        Ok(derived) => {
            let example = synthesize(&derived.examples, capability_example);
            (derived.schema, example)
        }
        Err(e) => {
            log::error!(
                "Error extracting {} schema for tool '{}' at {}: {}",
                side,
                meta.name,
                route.path,
                e
            );
            let schema = SchemaNode::open_object(Some(format!(
                "{} schema unavailable for {}: {}",
                side, meta.name, e
            )));
            // An open object still admits an explicit object example.
            let example = capability_example.filter(|value| value.is_object()).cloned();
            (schema, example)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::routing::{HandlerSignature, ParamDesc, RouteTable};
    use crate::schema::{Describe, FieldDesc, ModelDesc, TypeDesc};

    struct Loop;

    impl Describe for Loop {
        fn describe() -> TypeDesc {
            ModelDesc::new("Loop").field(FieldDesc::of::<Loop>("next")).into()
        }
    }

    #[test]
    fn test_housekeeping_skips_prefix_except_listing() {
        let scanner = RouteScanner::default();
        assert!(scanner.is_housekeeping("/tools/scan"));
        assert!(scanner.is_housekeeping("/tools"));
        assert!(!scanner.is_housekeeping("/tools/all"));
        assert!(!scanner.is_housekeeping("/toolshed"));
        assert!(!scanner.is_housekeeping("/extract"));
    }

    #[test]
    fn test_scan_skips_unflagged_and_housekeeping_routes() {
        let table = RouteTable::new()
            .with(RouteInfo::get("/internal/stats", HandlerSignature::new("internal_stats")))
            .with(
                RouteInfo::get("/tools/scan", HandlerSignature::new("scan"))
                    .capability(CapabilityMeta::new("scan_tools")),
            )
            .with(
                RouteInfo::get("/tools/all", HandlerSignature::new("all"))
                    .capability(CapabilityMeta::new("list_tools")),
            )
            .with(
                RouteInfo::get("/", HandlerSignature::new("health_check"))
                    .capability(CapabilityMeta::new("health_check")),
            );

        let names: Vec<String> = RouteScanner::default()
            .scan(&table)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["list_tools".to_string(), "health_check".to_string()]);
    }

    #[test]
    fn test_description_falls_back_to_handler_doc() {
        let route = RouteInfo::get(
            "/",
            HandlerSignature::new("health_check").doc("  Check if the API is running correctly\n"),
        );
        let descriptor = RouteScanner::default().describe(&route, &CapabilityMeta::new("health"));
        assert_eq!(descriptor.description, "Check if the API is running correctly");
        assert_eq!(descriptor.method, "GET");

        let explicit = CapabilityMeta::new("health").description("Check API health status");
        let descriptor = RouteScanner::default().describe(&route, &explicit);
        assert_eq!(descriptor.description, "Check API health status");
    }

    #[test]
    fn test_failed_derivation_degrades_to_open_object() {
        let route = RouteInfo::post(
            "/loop",
            HandlerSignature::new("loop")
                .param(ParamDesc::body::<Loop>("payload"))
                .returns::<String>(),
        );
        let meta = CapabilityMeta::new("loop").example_input(json!({ "next": null }));
        let descriptor = RouteScanner::default().describe(&route, &meta);

        let rendered = descriptor.input_schema.to_json();
        assert_eq!(rendered["type"], "object");
        assert!(rendered.get("properties").is_none());
        assert!(rendered["description"].as_str().unwrap().contains("loop"));
        assert_eq!(descriptor.example_input, Some(json!({ "next": null })));

        // The output side is unaffected.
        assert_eq!(descriptor.output_schema.to_json(), json!({ "type": "string" }));
        assert_eq!(descriptor.example_output, Some(json!("string")));
    }

    #[test]
    fn test_capability_examples_fill_in() {
        let route = RouteInfo::get("/", HandlerSignature::new("health_check"));
        let meta = CapabilityMeta::new("health_check").example_output(json!({ "status": "ok" }));
        let descriptor = RouteScanner::default().describe(&route, &meta);
        assert_eq!(descriptor.example_input, Some(json!({})));
        assert_eq!(descriptor.example_output, Some(json!({ "status": "ok" })));
    }

    #[test]
    fn test_param_example_beats_capability_example() {
        let route = RouteInfo::get(
            "/document/{doc_id}",
            HandlerSignature::new("get_document")
                .param(ParamDesc::of::<String>("doc_id").example(json!("doc-42"))),
        );
        let meta = CapabilityMeta::new("get_document")
            .example_input(json!({ "doc_id": "from-meta" }));
        let descriptor = RouteScanner::default().describe(&route, &meta);
        assert_eq!(descriptor.example_input, Some(json!({ "doc_id": "doc-42" })));
    }

    #[test]
    fn test_custom_prefix() {
        let scanner = RouteScanner::new("api/catalog/");
        assert_eq!(scanner.prefix(), "/api/catalog");
        assert_eq!(scanner.listing_path(), "/api/catalog/all");
        assert!(scanner.is_housekeeping("/api/catalog/scan"));
        assert!(!scanner.is_housekeeping("/tools/scan"));
    }
}
