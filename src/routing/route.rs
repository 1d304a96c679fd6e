//! Route and handler declarations consumed by the scanner.
//!
//! Rust handlers cannot be introspected at runtime, so each route is declared
//! next to its axum handler with a [`HandlerSignature`] describing the
//! parameters and response type, and optionally tagged as a capability.

use axum::http::Method;
use serde_json::Value;

use crate::capabilities::CapabilityMeta;
use crate::schema::{Describe, ParamLocation, TypeDesc};

// ---------------------------------------------------------------------------
// ParamDesc
// ---------------------------------------------------------------------------

/// One declared handler parameter.
#[derive(Debug, Clone)]
pub struct ParamDesc {
    pub name: String,
    pub ty: TypeDesc,
    /// Declared default; a parameter without one is required.
    pub default: Option<Value>,
    /// Explicit location hint. Path placement is decided by the route template.
    pub location: Option<ParamLocation>,
    pub doc: Option<String>,
    pub example: Option<Value>,
}

impl ParamDesc {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            location: None,
            doc: None,
            example: None,
        }
    }

    pub fn of<T: Describe>(name: impl Into<String>) -> Self {
        Self::new(name, T::describe())
    }

    /// The request payload of a body-carrying route.
    pub fn body<T: Describe>(name: impl Into<String>) -> Self {
        Self::of::<T>(name).location(ParamLocation::Body)
    }

    pub fn default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn location(mut self, location: ParamLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

// ---------------------------------------------------------------------------
// HandlerSignature
// ---------------------------------------------------------------------------

/// What the scanner may know about a handler function.
#[derive(Debug, Clone)]
pub struct HandlerSignature {
    pub name: String,
    pub doc: Option<String>,
    pub params: Vec<ParamDesc>,
    /// The function's declared return type.
    pub returns: Option<TypeDesc>,
    /// An explicit response-type hint; wins over `returns`.
    pub response_model: Option<TypeDesc>,
    /// Capability metadata attached to the handler itself.
    pub capability: Option<CapabilityMeta>,
}

impl HandlerSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
            returns: None,
            response_model: None,
            capability: None,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn param(mut self, param: ParamDesc) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns<T: Describe>(mut self) -> Self {
        self.returns = Some(T::describe());
        self
    }

    pub fn response_model<T: Describe>(mut self) -> Self {
        self.response_model = Some(T::describe());
        self
    }

    pub fn capability(mut self, meta: CapabilityMeta) -> Self {
        self.capability = Some(meta);
        self
    }
}

// ---------------------------------------------------------------------------
// RouteInfo
// ---------------------------------------------------------------------------

/// A registered route as seen by the scanner.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    /// Path template with `{name}` placeholders.
    pub path: String,
    pub methods: Vec<Method>,
    pub handler: HandlerSignature,
    /// Capability metadata attached at route definition time.
    pub capability: Option<CapabilityMeta>,
}

impl RouteInfo {
    pub fn new(method: Method, path: impl Into<String>, handler: HandlerSignature) -> Self {
        Self {
            path: path.into(),
            methods: vec![method],
            handler,
            capability: None,
        }
    }

    pub fn get(path: impl Into<String>, handler: HandlerSignature) -> Self {
        Self::new(Method::GET, path, handler)
    }

    pub fn post(path: impl Into<String>, handler: HandlerSignature) -> Self {
        Self::new(Method::POST, path, handler)
    }

    pub fn put(path: impl Into<String>, handler: HandlerSignature) -> Self {
        Self::new(Method::PUT, path, handler)
    }

    pub fn patch(path: impl Into<String>, handler: HandlerSignature) -> Self {
        Self::new(Method::PATCH, path, handler)
    }

    pub fn delete(path: impl Into<String>, handler: HandlerSignature) -> Self {
        Self::new(Method::DELETE, path, handler)
    }

    /// Also answer on `method`.
    pub fn method(mut self, method: Method) -> Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    /// Mark this route as a capability.
    pub fn capability(mut self, meta: CapabilityMeta) -> Self {
        self.capability = Some(meta);
        self
    }

    /// The first declared verb, `GET` when none is declared.
    pub fn primary_method(&self) -> Method {
        self.methods.first().cloned().unwrap_or(Method::GET)
    }

    /// Whether the primary verb conventionally carries a request body.
    pub fn carries_body(&self) -> bool {
        matches!(
            self.primary_method(),
            Method::POST | Method::PUT | Method::PATCH
        )
    }

    /// Capability metadata for this route, route-level attachment first.
    pub fn capability_meta(&self) -> Option<&CapabilityMeta> {
        self.capability
            .as_ref()
            .or(self.handler.capability.as_ref())
    }
}
