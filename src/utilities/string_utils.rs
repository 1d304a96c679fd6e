//! String helpers shared by the route scanner and schema deriver.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::DerivationError;

static PATH_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\*?([A-Za-z_][A-Za-z0-9_\-]*)\}").unwrap());
static DOC_EXAMPLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Example:\s*```[A-Za-z0-9_\-]*[ \t]*\r?\n(.*?)```").unwrap()
});

/// Names of the `{name}` placeholders in a route path template, in order.
///
/// Wildcard captures (`{*rest}`) are reported without the `*`. Any brace that
/// is not part of a well-formed placeholder makes the template invalid.
pub fn path_params(template: &str) -> Result<Vec<String>, DerivationError> {
    let names: Vec<String> = PATH_PLACEHOLDER
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect();

    let stripped = PATH_PLACEHOLDER.replace_all(template, "");
    if stripped.contains('{') || stripped.contains('}') {
        return Err(DerivationError::InvalidPathTemplate(template.to_string()));
    }
    Ok(names)
}

/// Whether `path` is `prefix` itself or lies beneath it.
///
/// Matching is per segment, so `/toolshed` is not under `/tools`.
pub fn is_under_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() || prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Normalize a route prefix to `/segment[/segment…]` form.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Body of the first fenced block introduced by an `Example:` line.
pub fn doc_example_block(doc: &str) -> Option<&str> {
    DOC_EXAMPLE_BLOCK
        .captures(doc)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|body| !body.is_empty())
}
