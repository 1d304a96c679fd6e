//! Example synthesis.
//!
//! Whenever a descriptor needs a concrete example, the candidates below are
//! tried in order and the first one that produces a value wins:
//!
//! 1. an example declared on the type, field, or parameter itself
//! 2. the example attached to the capability metadata
//! 3. an instance constructed from per-field placeholders
//! 4. a fenced `Example:` block in the type's documentation
//! 5. the type's default instance
//!
//! If none produces a value the descriptor carries no example. None of the
//! steps can fail loudly: a malformed documentation block is simply skipped.

use serde_json::Value;

use super::describe::{DefaultInstanceFn, TypeDesc};
use crate::utilities::string_utils::doc_example_block;

/// The example sources available for one schema.
#[derive(Debug, Clone, Default)]
pub struct ExampleSources {
    pub declared: Option<Value>,
    pub constructed: Option<Value>,
    pub doc: Option<String>,
    pub default_instance: Option<DefaultInstanceFn>,
}

impl ExampleSources {
    /// Sources for a described type, with `constructed` taken from conversion.
    pub fn for_type(ty: &TypeDesc, constructed: Option<Value>) -> Self {
        let mut sources = Self {
            constructed,
            ..Self::default()
        };
        match ty.resolve() {
            TypeDesc::Model(model) => {
                sources.declared = model.example;
                sources.doc = model.doc;
                sources.default_instance = model.default_instance;
            }
            TypeDesc::Enum(desc) => sources.doc = desc.doc,
            _ => {}
        }
        sources
    }

    /// Sources for an input assembled from individual parameters.
    pub fn constructed(constructed: Option<Value>) -> Self {
        Self {
            constructed,
            ..Self::default()
        }
    }
}

/// Pick an example following the strategy order.
pub fn synthesize(sources: &ExampleSources, capability_example: Option<&Value>) -> Option<Value> {
    sources
        .declared
        .clone()
        .or_else(|| capability_example.cloned())
        .or_else(|| sources.constructed.clone())
        .or_else(|| sources.doc.as_deref().and_then(parse_doc_example))
        .or_else(|| sources.default_instance.and_then(|produce| produce()))
}

/// Parse the `Example:` block of a documentation string.
///
/// The block is read as YAML, which also accepts JSON. Anything unparseable
/// is treated as no example.
pub fn parse_doc_example(doc: &str) -> Option<Value> {
    let body = doc_example_block(doc)?;
    match serde_yaml::from_str::<Value>(body) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Ignoring malformed documentation example: {}", e);
            None
        }
    }
}
