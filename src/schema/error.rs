//! Schema derivation errors.

use thiserror::Error;

/// Errors raised while deriving a single route's schemas or examples.
///
/// These never escape a scan: the scanner catches them per route and degrades
/// the affected schema to an open object.
#[derive(Debug, Error)]
pub enum DerivationError {
    /// Type nesting went deeper than the deriver allows (usually a
    /// self-referential model).
    #[error("type nesting exceeds depth {limit} while describing '{type_name}'")]
    DepthExceeded { type_name: String, limit: usize },

    /// The route's path template has unbalanced braces or an empty placeholder.
    #[error("invalid path template '{0}'")]
    InvalidPathTemplate(String),
}
