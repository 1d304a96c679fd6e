//! Type description → schema conversion.
//!
//! Every entry of the conversion table returns the schema together with a
//! default example for that shape. The example is `None` where no sensible
//! value exists (null, unions, `Any`) and callers fall back accordingly.

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use super::describe::{EnumDesc, ModelDesc, TypeDesc};
use super::error::DerivationError;
use super::node::{PrimitiveKind, Property, SchemaNode};

/// Deepest nesting of models / deferred types the converter will follow.
pub const MAX_DEPTH: usize = 32;

/// Placeholder used for string examples.
pub const STRING_PLACEHOLDER: &str = "string";

/// Key used for dictionary examples when the key type has no example.
const FALLBACK_KEY: &str = "key";

/// A converted type: its schema plus a default example.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub schema: SchemaNode,
    pub example: Option<Value>,
}

impl Converted {
    fn new(schema: SchemaNode, example: Option<Value>) -> Self {
        Self { schema, example }
    }
}

/// Convert a type description into a schema and a default example.
pub fn convert(ty: &TypeDesc) -> Result<Converted, DerivationError> {
    convert_at(ty, 0)
}

/// Convert a structured model into an object schema.
pub fn convert_model(model: &ModelDesc) -> Result<Converted, DerivationError> {
    model_at(model, 1)
}

fn convert_at(ty: &TypeDesc, depth: usize) -> Result<Converted, DerivationError> {
    if depth > MAX_DEPTH {
        return Err(DerivationError::DepthExceeded {
            type_name: ty.name(),
            limit: MAX_DEPTH,
        });
    }

    let converted = match ty {
        TypeDesc::String => Converted::new(
            SchemaNode::primitive(PrimitiveKind::String),
            Some(json!(STRING_PLACEHOLDER)),
        ),
        TypeDesc::Integer => {
            Converted::new(SchemaNode::primitive(PrimitiveKind::Integer), Some(json!(0)))
        }
        TypeDesc::Number => {
            Converted::new(SchemaNode::primitive(PrimitiveKind::Number), Some(json!(0.0)))
        }
        TypeDesc::Boolean => Converted::new(
            SchemaNode::primitive(PrimitiveKind::Boolean),
            Some(json!(false)),
        ),
        TypeDesc::Null => Converted::new(SchemaNode::primitive(PrimitiveKind::Null), None),
        TypeDesc::Timestamp => Converted::new(
            SchemaNode::Primitive {
                kind: PrimitiveKind::String,
                format: Some("date-time".to_string()),
                description: None,
            },
            Some(json!(Utc::now().to_rfc3339())),
        ),
        TypeDesc::Any => Converted::new(SchemaNode::any(), None),
        TypeDesc::Optional(inner) => optional(convert_at(inner, depth)?),
        TypeDesc::Union(alternatives) => union_at(alternatives, depth)?,
        TypeDesc::Seq(item) => {
            let item = convert_at(item, depth)?;
            let example = Value::Array(item.example.into_iter().collect());
            Converted::new(SchemaNode::array(item.schema), Some(example))
        }
        TypeDesc::Map { key, value } => {
            let key = convert_at(key, depth)?;
            let value = convert_at(value, depth)?;
            let example = match value.example {
                Some(sample) => {
                    let key = key
                        .example
                        .map(key_string)
                        .unwrap_or_else(|| FALLBACK_KEY.to_string());
                    let mut pair = Map::new();
                    pair.insert(key, sample);
                    Value::Object(pair)
                }
                None => json!({}),
            };
            Converted::new(SchemaNode::dictionary(value.schema), Some(example))
        }
        TypeDesc::Enum(desc) => enumeration(desc),
        TypeDesc::Model(model) => model_at(model, depth + 1)?,
        TypeDesc::Opaque(name) => {
            Converted::new(SchemaNode::open_object(Some(name.clone())), Some(json!({})))
        }
        TypeDesc::Deferred(producer) => convert_at(&producer(), depth + 1)?,
    };
    Ok(converted)
}

fn optional(inner: Converted) -> Converted {
    Converted::new(SchemaNode::Optional(Box::new(inner.schema)), inner.example)
}

fn union_at(alternatives: &[TypeDesc], depth: usize) -> Result<Converted, DerivationError> {
    let non_null: Vec<&TypeDesc> = alternatives
        .iter()
        .filter(|alt| !matches!(alt.resolve(), TypeDesc::Null))
        .collect();
    let has_null = non_null.len() < alternatives.len();

    match non_null.as_slice() {
        [] => Ok(Converted::new(SchemaNode::primitive(PrimitiveKind::Null), None)),
        [only] if has_null => Ok(optional(convert_at(only, depth)?)),
        [only] => convert_at(only, depth),
        _ => {
            let schemas = alternatives
                .iter()
                .map(|alt| convert_at(alt, depth).map(|c| c.schema))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Converted::new(SchemaNode::Union(schemas), None))
        }
    }
}

fn enumeration(desc: &EnumDesc) -> Converted {
    let example = desc.variants.first().map(|first| json!(first));
    Converted::new(
        SchemaNode::Enum {
            values: desc.variants.clone(),
            description: desc.doc.clone(),
        },
        example,
    )
}

/// Build the object schema for a model.
///
/// The example is the model's declared example if it has one, otherwise an
/// instance assembled field by field. Assembly fails (yielding `None`) when a
/// required field has no example; optional fields without one are omitted.
fn model_at(model: &ModelDesc, depth: usize) -> Result<Converted, DerivationError> {
    if depth > MAX_DEPTH {
        return Err(DerivationError::DepthExceeded {
            type_name: model.name.clone(),
            limit: MAX_DEPTH,
        });
    }

    let mut properties = IndexMap::new();
    let mut required = Vec::new();
    let mut instance = Map::new();
    let mut complete = true;

    for field in &model.fields {
        let converted = convert_at(&field.ty, depth)?;
        match field.example.clone().or(converted.example) {
            Some(sample) => {
                instance.insert(field.name.clone(), sample);
            }
            None if field.is_required() => complete = false,
            None => {}
        }
        if field.is_required() {
            required.push(field.name.clone());
        }
        properties.insert(
            field.name.clone(),
            Property::new(converted.schema)
                .with_description(field.doc.clone())
                .with_default(field.default.clone()),
        );
    }

    let schema = SchemaNode::Object {
        properties,
        required,
        description: model.doc.clone(),
    };
    let constructed = complete.then(|| Value::Object(instance));
    Ok(Converted::new(schema, model.example.clone().or(constructed)))
}

/// Render an example value as a dictionary key.
fn key_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
