//! Structural schema tree used for capability inputs and outputs.
//!
//! A `SchemaNode` is the engine's own description of a value's shape. It is
//! rendered to JSON Schema only at the edge (serialization), so derivation
//! code never has to juggle raw `serde_json::Value` maps.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// PrimitiveKind
// ---------------------------------------------------------------------------

/// Scalar kinds understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

impl PrimitiveKind {
    /// The JSON Schema `type` keyword for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Null => "null",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ParamLocation
// ---------------------------------------------------------------------------

/// Where a request parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
            ParamLocation::Body => "body",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// One named entry of an object schema.
///
/// Besides the value schema a property can carry its own documentation, the
/// default value declared on the field/parameter, and (for route inputs) the
/// location the value is read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub schema: SchemaNode,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub location: Option<ParamLocation>,
}

impl Property {
    pub fn new(schema: SchemaNode) -> Self {
        Self {
            schema,
            description: None,
            default: None,
            location: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }

    pub fn with_location(mut self, location: Option<ParamLocation>) -> Self {
        self.location = location;
        self
    }

    fn to_json(&self) -> Value {
        let mut rendered = self.schema.to_json();
        if let Value::Object(obj) = &mut rendered {
            if let Some(description) = &self.description {
                obj.insert("description".to_string(), Value::String(description.clone()));
            }
            if let Some(default) = &self.default {
                obj.insert("default".to_string(), default.clone());
            }
            if let Some(location) = self.location {
                obj.insert("in".to_string(), Value::String(location.as_str().to_string()));
            }
        }
        rendered
    }
}

// ---------------------------------------------------------------------------
// SchemaNode
// ---------------------------------------------------------------------------

/// Recursive description of a value's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A scalar value. `format` refines strings (e.g. `date-time`).
    Primitive {
        kind: PrimitiveKind,
        format: Option<String>,
        description: Option<String>,
    },
    /// A homogeneous list.
    Array {
        items: Box<SchemaNode>,
        description: Option<String>,
    },
    /// A record with named properties. `required` keeps declaration order.
    Object {
        properties: IndexMap<String, Property>,
        required: Vec<String>,
        description: Option<String>,
    },
    /// The inner shape, or null.
    Optional(Box<SchemaNode>),
    /// One of several shapes.
    Union(Vec<SchemaNode>),
    /// A closed set of string members.
    Enum {
        values: Vec<String>,
        description: Option<String>,
    },
    /// An open-ended key → value mapping with homogeneous values.
    Dictionary {
        values: Box<SchemaNode>,
        description: Option<String>,
    },
    /// Any JSON value.
    Any { description: Option<String> },
}

impl SchemaNode {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        SchemaNode::Primitive {
            kind,
            format: None,
            description: None,
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array {
            items: Box::new(items),
            description: None,
        }
    }

    pub fn dictionary(values: SchemaNode) -> Self {
        SchemaNode::Dictionary {
            values: Box::new(values),
            description: None,
        }
    }

    pub fn any() -> Self {
        SchemaNode::Any { description: None }
    }

    /// An object schema with no declared properties.
    ///
    /// This is what derivation degrades to when a shape cannot be worked out.
    pub fn open_object(description: Option<String>) -> Self {
        SchemaNode::Object {
            properties: IndexMap::new(),
            required: Vec::new(),
            description,
        }
    }

    /// Attach documentation text to the node, where the variant has room for it.
    ///
    /// `Optional` forwards to its inner schema; `Union` has no description slot
    /// and is returned unchanged.
    pub fn with_description(self, text: Option<String>) -> Self {
        let Some(text) = text else {
            return self;
        };
        match self {
            SchemaNode::Primitive { kind, format, .. } => SchemaNode::Primitive {
                kind,
                format,
                description: Some(text),
            },
            SchemaNode::Array { items, .. } => SchemaNode::Array {
                items,
                description: Some(text),
            },
            SchemaNode::Object {
                properties,
                required,
                ..
            } => SchemaNode::Object {
                properties,
                required,
                description: Some(text),
            },
            SchemaNode::Optional(inner) => {
                SchemaNode::Optional(Box::new(inner.with_description(Some(text))))
            }
            SchemaNode::Enum { values, .. } => SchemaNode::Enum {
                values,
                description: Some(text),
            },
            SchemaNode::Dictionary { values, .. } => SchemaNode::Dictionary {
                values,
                description: Some(text),
            },
            SchemaNode::Any { .. } => SchemaNode::Any {
                description: Some(text),
            },
            union @ SchemaNode::Union(_) => union,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            SchemaNode::Primitive { description, .. }
            | SchemaNode::Array { description, .. }
            | SchemaNode::Object { description, .. }
            | SchemaNode::Enum { description, .. }
            | SchemaNode::Dictionary { description, .. }
            | SchemaNode::Any { description } => description.as_deref(),
            SchemaNode::Optional(inner) => inner.description(),
            SchemaNode::Union(_) => None,
        }
    }

    /// Property map of an object schema, if this is one.
    pub fn properties(&self) -> Option<&IndexMap<String, Property>> {
        match self {
            SchemaNode::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Required names of an object schema (empty for anything else).
    pub fn required(&self) -> &[String] {
        match self {
            SchemaNode::Object { required, .. } => required,
            _ => &[],
        }
    }

    /// Render as a JSON Schema document.
    pub fn to_json(&self) -> Value {
        match self {
            SchemaNode::Primitive {
                kind,
                format,
                description,
            } => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), Value::String(kind.as_str().to_string()));
                if let Some(format) = format {
                    obj.insert("format".to_string(), Value::String(format.clone()));
                }
                finish(obj, description)
            }
            SchemaNode::Array { items, description } => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), json!("array"));
                obj.insert("items".to_string(), items.to_json());
                finish(obj, description)
            }
            SchemaNode::Object {
                properties,
                required,
                description,
            } => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), json!("object"));
                if !properties.is_empty() {
                    let rendered: Map<String, Value> = properties
                        .iter()
                        .map(|(name, prop)| (name.clone(), prop.to_json()))
                        .collect();
                    obj.insert("properties".to_string(), Value::Object(rendered));
                }
                if !required.is_empty() {
                    obj.insert("required".to_string(), json!(required));
                }
                finish(obj, description)
            }
            SchemaNode::Optional(inner) => nullable(inner.to_json()),
            SchemaNode::Union(alternatives) => {
                let rendered: Vec<Value> = alternatives.iter().map(SchemaNode::to_json).collect();
                json!({ "anyOf": rendered })
            }
            SchemaNode::Enum {
                values,
                description,
            } => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), json!("string"));
                obj.insert("enum".to_string(), json!(values));
                finish(obj, description)
            }
            SchemaNode::Dictionary {
                values,
                description,
            } => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), json!("object"));
                obj.insert("additionalProperties".to_string(), values.to_json());
                finish(obj, description)
            }
            SchemaNode::Any { description } => finish(Map::new(), description),
        }
    }
}

fn finish(mut obj: Map<String, Value>, description: &Option<String>) -> Value {
    if let Some(description) = description {
        obj.insert("description".to_string(), Value::String(description.clone()));
    }
    Value::Object(obj)
}

/// Add `"null"` to a rendered schema's type set.
///
/// A closed `enum` list also gains a `null` member, otherwise it would still
/// reject null after the type widening.
fn nullable(rendered: Value) -> Value {
    let mut obj = match rendered {
        Value::Object(obj) => obj,
        other => return other,
    };
    if let Some(Value::Array(members)) = obj.get_mut("enum") {
        if !members.contains(&Value::Null) {
            members.push(Value::Null);
        }
    }
    match obj.remove("type") {
        Some(Value::String(single)) => {
            let types = if single == "null" {
                json!("null")
            } else {
                json!([single, "null"])
            };
            obj.insert("type".to_string(), types);
            Value::Object(obj)
        }
        Some(Value::Array(mut types)) => {
            if !types.iter().any(|t| t == "null") {
                types.push(json!("null"));
            }
            obj.insert("type".to_string(), Value::Array(types));
            Value::Object(obj)
        }
        Some(other) => {
            obj.insert("type".to_string(), other);
            json!({ "anyOf": [Value::Object(obj), { "type": "null" }] })
        }
        // `{}` already admits null.
        None if obj.keys().all(|k| k == "description") => Value::Object(obj),
        None => json!({ "anyOf": [Value::Object(obj), { "type": "null" }] }),
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Default for SchemaNode {
    fn default() -> Self {
        SchemaNode::open_object(None)
    }
}
