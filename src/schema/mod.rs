//! Schema derivation and example synthesis.
//!
//! Leaves of the catalog: everything here is a pure function over type
//! descriptions.
//!
//! - [`describe`]: the `Describe` trait and the `TypeDesc` tree it produces
//! - [`convert`]: type description → `SchemaNode` + default example
//! - [`derive`]: handler inputs and outputs → schemas
//! - [`example`]: example strategy chain

pub mod convert;
pub mod derive;
pub mod describe;
pub mod error;
pub mod example;
pub mod node;

pub use convert::{convert, Converted};
pub use derive::{derive_body_input, derive_output, derive_param_input, Derived};
pub use describe::{Describe, EnumDesc, FieldDesc, ModelDesc, TypeDesc};
pub use error::DerivationError;
pub use example::{synthesize, ExampleSources};
pub use node::{ParamLocation, PrimitiveKind, Property, SchemaNode};
