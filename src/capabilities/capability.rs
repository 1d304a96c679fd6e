//! Capability metadata and catalog descriptors.
//!
//! [`CapabilityMeta`] is what a route author attaches to mark an operation as
//! a capability. [`CapabilityDescriptor`] is what the scanner publishes for it
//! once schemas and examples have been derived.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::schema::{Describe, FieldDesc, ModelDesc, SchemaNode, TypeDesc};

/// Metadata bundle that marks a route as a capability.
///
/// Example (as it would appear in a config file):
/// ```yaml
/// name: "text_extractor"
/// description: "Extract important information from text"
/// tags: ["extraction", "text"]
/// example_input:
///   text: "Extract important information from this document."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityMeta {
    /// Catalog-wide identifier.
    pub name: String,

    /// Human-readable description; the handler's documentation is used when absent.
    #[serde(default)]
    pub description: Option<String>,

    /// Classification labels.
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Explicit example request.
    #[serde(default)]
    pub example_input: Option<Value>,

    /// Explicit example response.
    #[serde(default)]
    pub example_output: Option<Value>,
}

impl CapabilityMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn example_input(mut self, example: Value) -> Self {
        self.example_input = Some(example);
        self
    }

    pub fn example_output(mut self, example: Value) -> Self {
        self.example_output = Some(example);
        self
    }
}

/// One catalog entry.
///
/// Created only by a scan and never mutated afterwards; a changed route
/// yields a new descriptor that replaces the old one by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityDescriptor {
    pub name: String,

    pub description: String,

    /// Path template that reaches the capability.
    #[serde(rename = "endpoint")]
    pub endpoint_path: String,

    /// HTTP verb, upper case.
    pub method: String,

    pub input_schema: SchemaNode,

    pub output_schema: SchemaNode,

    pub tags: BTreeSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_input: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_output: Option<Value>,
}

impl CapabilityDescriptor {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

// The listing route describes its own response with this.
impl Describe for CapabilityDescriptor {
    fn describe() -> TypeDesc {
        ModelDesc::new("CapabilityDescriptor")
            .doc("A capability exposed by this service")
            .field(FieldDesc::of::<String>("name"))
            .field(FieldDesc::of::<String>("description"))
            .field(FieldDesc::of::<String>("endpoint").doc("Path template of the operation"))
            .field(FieldDesc::of::<String>("method"))
            .field(FieldDesc::of::<Value>("input_schema").doc("JSON Schema of the input"))
            .field(FieldDesc::of::<Value>("output_schema").doc("JSON Schema of the output"))
            .field(FieldDesc::of::<BTreeSet<String>>("tags"))
            .field(FieldDesc::of::<Option<Value>>("example_input").default(Value::Null))
            .field(FieldDesc::of::<Option<Value>>("example_output").default(Value::Null))
            .example(json!({
                "name": "health_check",
                "description": "Check API health status",
                "endpoint": "/",
                "method": "GET",
                "input_schema": { "type": "object", "properties": {}, "required": [] },
                "output_schema": { "type": "object" },
                "tags": ["system"]
            }))
            .into()
    }
}
