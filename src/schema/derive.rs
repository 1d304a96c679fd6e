//! Input and output schema derivation for a single route handler.
//!
//! Body-carrying routes (POST/PUT/PATCH) take their input shape from the
//! request payload; every other route assembles an object out of its path,
//! query, header and cookie parameters.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::convert::{convert, convert_model};
use super::describe::TypeDesc;
use super::error::DerivationError;
use super::example::ExampleSources;
use super::node::{ParamLocation, Property, SchemaNode};
use crate::routing::{HandlerSignature, ParamDesc};
use crate::utilities::string_utils::path_params;

/// Parameter names that are plumbing rather than caller input.
pub const RESERVED_PARAMS: &[&str] = &["self", "cls", "request", "req", "ctx", "context", "state"];

/// A derived schema plus the example sources that go with it.
#[derive(Debug, Clone)]
pub struct Derived {
    pub schema: SchemaNode,
    pub examples: ExampleSources,
}

fn is_reserved(param: &ParamDesc) -> bool {
    RESERVED_PARAMS.contains(&param.name.as_str())
}

// ---------------------------------------------------------------------------
// Body-carrying routes
// ---------------------------------------------------------------------------

/// Derive the input schema of a body-carrying route.
///
/// The payload is the first parameter declared as `body` or typed as a
/// structured model, whatever its name. A model payload becomes an object
/// schema; any other payload is described as an open-ended dictionary. Handlers with no payload
/// parameter at all are described from their remaining parameters.
pub fn derive_body_input(
    handler: &HandlerSignature,
    path_template: &str,
) -> Result<Derived, DerivationError> {
    let payload = handler.params.iter().find(|param| {
        param.location == Some(ParamLocation::Body) || param.ty.as_model().is_some()
    });

    let Some(payload) = payload else {
        return derive_param_input(handler, path_template);
    };

    match payload.ty.as_model() {
        Some(model) => {
            let converted = convert_model(&model)?;
            let mut examples = ExampleSources::for_type(&payload.ty, converted.example);
            if payload.example.is_some() {
                examples.declared = payload.example.clone();
            }
            let schema = if converted.schema.description().is_none() {
                converted.schema.with_description(payload.doc.clone())
            } else {
                converted.schema
            };
            Ok(Derived { schema, examples })
        }
        None => {
            let converted = convert(&payload.ty)?;
            let description = Some(
                payload
                    .doc
                    .clone()
                    .unwrap_or_else(|| format!("Request body for {}", handler.name)),
            );
            let (values, constructed) = match converted.schema {
                SchemaNode::Dictionary { values, .. } => (values, converted.example),
                _ => (Box::new(SchemaNode::any()), Some(Value::Object(Map::new()))),
            };
            let mut examples = ExampleSources::constructed(constructed);
            examples.declared = payload.example.clone();
            Ok(Derived {
                schema: SchemaNode::Dictionary {
                    values,
                    description,
                },
                examples,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Parameter-carrying routes
// ---------------------------------------------------------------------------

/// Collects properties while walking a handler's parameters.
///
/// `declared` records whether any parameter carried its own example. The
/// assembled instance then counts as a declared example rather than a
/// constructed one.
#[derive(Default)]
struct ParamObject {
    properties: IndexMap<String, Property>,
    required: Vec<String>,
    instance: Map<String, Value>,
    complete: bool,
    declared: bool,
}

struct ParamInput<'a> {
    name: &'a str,
    ty: &'a TypeDesc,
    default: Option<&'a Value>,
    doc: Option<&'a String>,
    example: Option<&'a Value>,
    location: ParamLocation,
}

impl ParamObject {
    fn new() -> Self {
        Self {
            complete: true,
            ..Self::default()
        }
    }

    fn add(&mut self, input: ParamInput<'_>) -> Result<(), DerivationError> {
        let converted = convert(input.ty)?;
        let required = input.default.is_none();
        self.declared |= input.example.is_some();

        match input.example.cloned().or(converted.example) {
            Some(sample) => {
                self.instance.insert(input.name.to_string(), sample);
            }
            None if required => self.complete = false,
            None => {}
        }
        if required && !self.required.iter().any(|name| name == input.name) {
            self.required.push(input.name.to_string());
        }
        self.properties.insert(
            input.name.to_string(),
            Property::new(converted.schema)
                .with_description(input.doc.cloned())
                .with_default(input.default.cloned())
                .with_location(Some(input.location)),
        );
        Ok(())
    }

    fn finish(self) -> Derived {
        let constructed = self.complete.then(|| Value::Object(self.instance));
        let mut examples = ExampleSources::constructed(constructed);
        if self.declared {
            examples.declared = examples.constructed.clone();
        }
        Derived {
            schema: SchemaNode::Object {
                properties: self.properties,
                required: self.required,
                description: None,
            },
            examples,
        }
    }
}

/// Decide where a named parameter is read from.
///
/// Names that appear as `{name}` in the path template are path parameters;
/// everything else is a query parameter unless it explicitly declares a
/// header or cookie location.
pub fn classify_location(
    name: &str,
    declared: Option<ParamLocation>,
    path_names: &[String],
) -> ParamLocation {
    if path_names.iter().any(|path_name| path_name == name) {
        return ParamLocation::Path;
    }
    match declared {
        Some(ParamLocation::Header) => ParamLocation::Header,
        Some(ParamLocation::Cookie) => ParamLocation::Cookie,
        _ => ParamLocation::Query,
    }
}

/// Derive the input schema of a route from its path/query/header/cookie
/// parameters.
///
/// A parameter typed as a structured model is not nested: its fields are
/// hoisted into the route's input object, each classified on its own.
pub fn derive_param_input(
    handler: &HandlerSignature,
    path_template: &str,
) -> Result<Derived, DerivationError> {
    let path_names = path_params(path_template)?;
    let mut object = ParamObject::new();

    for param in handler.params.iter().filter(|param| !is_reserved(param)) {
        if let Some(model) = param.ty.as_model() {
            for field in &model.fields {
                object.add(ParamInput {
                    name: &field.name,
                    ty: &field.ty,
                    default: field.default.as_ref(),
                    doc: field.doc.as_ref(),
                    example: field.example.as_ref(),
                    location: classify_location(&field.name, field.location, &path_names),
                })?;
            }
            continue;
        }

        object.add(ParamInput {
            name: &param.name,
            ty: &param.ty,
            default: param.default.as_ref(),
            doc: param.doc.as_ref(),
            example: param.example.as_ref(),
            location: classify_location(&param.name, param.location, &path_names),
        })?;
    }

    Ok(object.finish())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Derive the output schema from the handler's response type.
///
/// An explicit response model takes precedence over the declared return
/// type. A handler that declares neither gets an open object.
pub fn derive_output(handler: &HandlerSignature) -> Result<Derived, DerivationError> {
    let Some(ty) = handler
        .response_model
        .as_ref()
        .or(handler.returns.as_ref())
    else {
        return Ok(Derived {
            schema: SchemaNode::open_object(None),
            examples: ExampleSources::default(),
        });
    };

    let converted = convert(ty)?;
    Ok(Derived {
        schema: converted.schema,
        examples: ExampleSources::for_type(ty, converted.example),
    })
}
