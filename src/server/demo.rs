//! Demo business endpoints served next to the catalog.
//!
//! Three of them are capabilities; `/internal/stats` is deliberately not.

use axum::{
    extract::{Path, Query},
    routing::{get, post},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::capabilities::CapabilityMeta;
use crate::routing::{CatalogRouter, HandlerSignature, ParamDesc, RouteInfo};
use crate::schema::{Describe, FieldDesc, ModelDesc, TypeDesc};

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

fn default_max_tokens() -> Option<i64> {
    Some(100)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextExtractionRequest {
    pub text: String,
    /// Maximum number of tokens to extract.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<i64>,
}

impl Describe for TextExtractionRequest {
    fn describe() -> TypeDesc {
        ModelDesc::new("TextExtractionRequest")
            .field(FieldDesc::of::<String>("text"))
            .field(
                FieldDesc::of::<Option<i64>>("max_tokens")
                    .default(json!(100))
                    .doc("Maximum number of tokens to extract"),
            )
            .example(json!({
                "text": "Extract important information from this document.",
                "max_tokens": 50
            }))
            .into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub extracted_text: String,
    pub token_count: usize,
}

impl Describe for ExtractionResult {
    fn describe() -> TypeDesc {
        ModelDesc::new("ExtractionResult")
            .field(FieldDesc::of::<String>("extracted_text"))
            .field(FieldDesc::of::<usize>("token_count"))
            .example(json!({
                "extracted_text": "Important information from document",
                "token_count": 5
            }))
            .into()
    }
}

/// Query string of `GET /document/{doc_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentQuery {
    #[serde(default)]
    pub include_metadata: bool,
}

impl Describe for DocumentQuery {
    fn describe() -> TypeDesc {
        ModelDesc::new("DocumentQuery")
            .field(FieldDesc::of::<bool>("include_metadata").default(json!(false)))
            .into()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

async fn extract_text(Json(request): Json<TextExtractionRequest>) -> Json<ExtractionResult> {
    Json(extract(&request))
}

/// Keep the first `max_tokens` words of the text; no limit when unset.
pub fn extract(request: &TextExtractionRequest) -> ExtractionResult {
    let limit = request
        .max_tokens
        .map(|n| usize::try_from(n).unwrap_or(0))
        .unwrap_or(usize::MAX);
    let words: Vec<&str> = request.text.split_whitespace().take(limit).collect();
    ExtractionResult {
        extracted_text: words.join(" "),
        token_count: words.len(),
    }
}

async fn get_document(
    Path(doc_id): Path<String>,
    Query(query): Query<DocumentQuery>,
) -> Json<Value> {
    let metadata = if query.include_metadata {
        json!({ "created": "2023-01-01" })
    } else {
        Value::Null
    };
    Json(json!({
        "id": doc_id,
        "title": format!("Document {}", doc_id),
        "metadata": metadata,
    }))
}

async fn internal_stats() -> Json<Value> {
    Json(json!({ "active_users": 100 }))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// The demo endpoints together with their route declarations.
pub fn demo_router<S>() -> CatalogRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    CatalogRouter::new()
        .route(
            RouteInfo::get(
                "/",
                HandlerSignature::new("health_check")
                    .doc("Check if the API is running correctly")
                    .response_model::<Map<String, Value>>(),
            )
            .capability(
                CapabilityMeta::new("health_check")
                    .description("Check API health status")
                    .tag("system")
                    .example_output(json!({ "status": "ok", "version": crate::VERSION })),
            ),
            get(health_check),
        )
        .route(
            RouteInfo::post(
                "/extract",
                HandlerSignature::new("extract_text")
                    .doc(
                        "Extracts important information from provided text.\n\n\
                         The extractor will analyze the input text and return the most \
                         relevant parts up to the specified max_tokens limit.",
                    )
                    .param(ParamDesc::body::<TextExtractionRequest>("request"))
                    .response_model::<ExtractionResult>(),
            )
            .capability(
                CapabilityMeta::new("text_extractor")
                    .description("Extract important information from text")
                    .tags(["extraction", "text"]),
            ),
            post(extract_text),
        )
        .route(
            RouteInfo::get(
                "/document/{doc_id}",
                HandlerSignature::new("get_document")
                    .doc("Retrieve a document by its ID with optional metadata")
                    .param(ParamDesc::of::<String>("doc_id"))
                    .param(ParamDesc::of::<DocumentQuery>("query"))
                    .returns::<Map<String, Value>>(),
            )
            .capability(
                CapabilityMeta::new("get_document")
                    .description("Retrieve a document by ID")
                    .tag("documents"),
            ),
            get(get_document),
        )
        .route(
            RouteInfo::get(
                "/internal/stats",
                HandlerSignature::new("internal_stats")
                    .doc("Internal endpoint that isn't exposed as a tool"),
            ),
            get(internal_stats),
        )
}
