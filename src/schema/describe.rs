//! Compile-time type descriptions.
//!
//! Request and response types opt into the catalog by implementing
//! [`Describe`]. The returned [`TypeDesc`] is plain data: the schema deriver
//! and example synthesizer work purely on it and never inspect the Rust type.
//!
//! ```ignore
//! impl Describe for TextExtractionRequest {
//!     fn describe() -> TypeDesc {
//!         ModelDesc::new("TextExtractionRequest")
//!             .field(FieldDesc::of::<String>("text"))
//!             .field(
//!                 FieldDesc::of::<Option<i64>>("max_tokens")
//!                     .default(json!(100))
//!                     .doc("Maximum number of tokens to extract"),
//!             )
//!             .into()
//!     }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::DateTime;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::node::ParamLocation;

/// Produces a zero-argument default instance, already serialized.
pub type DefaultInstanceFn = fn() -> Option<Value>;

/// Implemented by every type that appears in a capability's inputs or outputs.
pub trait Describe {
    fn describe() -> TypeDesc;
}

// ---------------------------------------------------------------------------
// TypeDesc
// ---------------------------------------------------------------------------

/// Shape of a Rust type as far as the catalog is concerned.
#[derive(Debug, Clone)]
pub enum TypeDesc {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    /// A point in time, carried as an RFC 3339 string.
    Timestamp,
    /// Any JSON value (`serde_json::Value`).
    Any,
    Optional(Box<TypeDesc>),
    Union(Vec<TypeDesc>),
    Seq(Box<TypeDesc>),
    Map {
        key: Box<TypeDesc>,
        value: Box<TypeDesc>,
    },
    Enum(EnumDesc),
    Model(ModelDesc),
    /// A named type that does not describe its structure.
    Opaque(String),
    /// Resolved on demand; lets models refer to themselves.
    Deferred(fn() -> TypeDesc),
}

impl TypeDesc {
    pub fn of<T: Describe + ?Sized>() -> Self {
        T::describe()
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        TypeDesc::Opaque(name.into())
    }

    /// Strip `Deferred` layers. Each layer is a single function call, so this
    /// terminates unless a describe impl returns a `Deferred` of itself.
    pub fn resolve(&self) -> TypeDesc {
        let mut current = self.clone();
        while let TypeDesc::Deferred(producer) = current {
            current = producer();
        }
        current
    }

    /// The model behind this description, looking through `Deferred`.
    pub fn as_model(&self) -> Option<ModelDesc> {
        match self.resolve() {
            TypeDesc::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Display name for diagnostics and fallback descriptions.
    pub fn name(&self) -> String {
        match self {
            TypeDesc::String => "string".to_string(),
            TypeDesc::Integer => "integer".to_string(),
            TypeDesc::Number => "number".to_string(),
            TypeDesc::Boolean => "boolean".to_string(),
            TypeDesc::Null => "null".to_string(),
            TypeDesc::Timestamp => "timestamp".to_string(),
            TypeDesc::Any => "any".to_string(),
            TypeDesc::Optional(inner) => format!("Optional[{}]", inner.name()),
            TypeDesc::Union(alternatives) => {
                let names: Vec<String> = alternatives.iter().map(TypeDesc::name).collect();
                format!("Union[{}]", names.join(", "))
            }
            TypeDesc::Seq(item) => format!("List[{}]", item.name()),
            TypeDesc::Map { key, value } => format!("Dict[{}, {}]", key.name(), value.name()),
            TypeDesc::Enum(desc) => desc.name.clone(),
            TypeDesc::Model(desc) => desc.name.clone(),
            TypeDesc::Opaque(name) => name.clone(),
            TypeDesc::Deferred(producer) => producer().name(),
        }
    }
}

impl From<ModelDesc> for TypeDesc {
    fn from(model: ModelDesc) -> Self {
        TypeDesc::Model(model)
    }
}

impl From<EnumDesc> for TypeDesc {
    fn from(desc: EnumDesc) -> Self {
        TypeDesc::Enum(desc)
    }
}

// ---------------------------------------------------------------------------
// ModelDesc / FieldDesc
// ---------------------------------------------------------------------------

/// A structured type with named, typed fields.
#[derive(Debug, Clone)]
pub struct ModelDesc {
    pub name: String,
    pub doc: Option<String>,
    pub fields: Vec<FieldDesc>,
    /// Example declared on the type itself.
    pub example: Option<Value>,
    pub default_instance: Option<DefaultInstanceFn>,
}

impl ModelDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            fields: Vec::new(),
            example: None,
            default_instance: None,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn field(mut self, field: FieldDesc) -> Self {
        self.fields.push(field);
        self
    }

    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    /// Use `T::default()` as the last-resort example for this model.
    pub fn default_instance<T: Default + Serialize>(mut self) -> Self {
        self.default_instance = Some(serialized_default::<T>);
        self
    }
}

fn serialized_default<T: Default + Serialize>() -> Option<Value> {
    serde_json::to_value(T::default()).ok()
}

/// One field of a [`ModelDesc`].
#[derive(Debug, Clone)]
pub struct FieldDesc {
    pub name: String,
    pub ty: TypeDesc,
    pub doc: Option<String>,
    /// Declared default; a field without one is required.
    pub default: Option<Value>,
    pub example: Option<Value>,
    /// Location override used when the model's fields are hoisted into
    /// request parameters.
    pub location: Option<ParamLocation>,
}

impl FieldDesc {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
            doc: None,
            default: None,
            example: None,
            location: None,
        }
    }

    /// A field whose type is described lazily by `T`.
    pub fn of<T: Describe>(name: impl Into<String>) -> Self {
        Self::new(name, TypeDesc::Deferred(T::describe))
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn location(mut self, location: ParamLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

// ---------------------------------------------------------------------------
// EnumDesc
// ---------------------------------------------------------------------------

/// An enumerated type, listed by member name.
#[derive(Debug, Clone)]
pub struct EnumDesc {
    pub name: String,
    pub doc: Option<String>,
    pub variants: Vec<String>,
}

impl EnumDesc {
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            doc: None,
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Describe impls for std / ecosystem types
// ---------------------------------------------------------------------------

macro_rules! describe_as {
    ($variant:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDesc {
                    TypeDesc::$variant
                }
            }
        )+
    };
}

describe_as!(String => String, str, char);
describe_as!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_as!(Number => f32, f64);
describe_as!(Boolean => bool);
describe_as!(Null => ());
describe_as!(Any => Value);

impl<T: Describe + ?Sized> Describe for &T {
    fn describe() -> TypeDesc {
        T::describe()
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe() -> TypeDesc {
        T::describe()
    }
}

impl<Tz: chrono::TimeZone> Describe for DateTime<Tz> {
    fn describe() -> TypeDesc {
        TypeDesc::Timestamp
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDesc {
        TypeDesc::Optional(Box::new(T::describe()))
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDesc {
        TypeDesc::Seq(Box::new(T::describe()))
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDesc {
        TypeDesc::Seq(Box::new(T::describe()))
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDesc {
        TypeDesc::Seq(Box::new(T::describe()))
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe() -> TypeDesc {
        TypeDesc::Seq(Box::new(T::describe()))
    }
}

fn map_of<K: Describe, V: Describe>() -> TypeDesc {
    TypeDesc::Map {
        key: Box::new(K::describe()),
        value: Box::new(V::describe()),
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDesc {
        map_of::<K, V>()
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDesc {
        map_of::<K, V>()
    }
}

impl<K: Describe, V: Describe, S> Describe for IndexMap<K, V, S> {
    fn describe() -> TypeDesc {
        map_of::<K, V>()
    }
}

impl Describe for serde_json::Map<String, Value> {
    fn describe() -> TypeDesc {
        map_of::<String, Value>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[derive(Default, Serialize)]
    struct Settings {
        retries: u32,
    }

    #[test]
    fn test_std_types_describe_themselves() {
        assert!(matches!(String::describe(), TypeDesc::String));
        assert!(matches!(u16::describe(), TypeDesc::Integer));
        assert!(matches!(f32::describe(), TypeDesc::Number));
        assert!(matches!(<DateTime<Utc>>::describe(), TypeDesc::Timestamp));
        assert!(matches!(
            Option::<bool>::describe(),
            TypeDesc::Optional(inner) if matches!(*inner, TypeDesc::Boolean)
        ));
        assert!(matches!(
            HashMap::<String, Vec<i64>>::describe(),
            TypeDesc::Map { value, .. } if matches!(*value, TypeDesc::Seq(_))
        ));
    }

    #[test]
    fn test_field_of_is_deferred_until_resolved() {
        let field = FieldDesc::of::<Vec<String>>("labels");
        assert!(matches!(field.ty, TypeDesc::Deferred(_)));
        assert!(matches!(field.ty.resolve(), TypeDesc::Seq(_)));
        assert!(field.is_required());
        assert!(!field.default(json!([])).is_required());
    }

    #[test]
    fn test_default_instance_serializes_default() {
        let model = ModelDesc::new("Settings").default_instance::<Settings>();
        let produce = model.default_instance.unwrap();
        assert_eq!(produce(), Some(json!({ "retries": 0 })));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Option::<Vec<i32>>::describe().name(), "Optional[List[integer]]");
        assert_eq!(TypeDesc::opaque("UploadFile").name(), "UploadFile");
    }
}
