//! Server settings loaded from the environment.
//!
//! Values come from process environment variables first, then from a `.env`
//! file in the working directory. The file holds `KEY=VALUE` lines; blank
//! lines, `#` comments and an `export ` prefix are accepted, and values may be
//! wrapped in single or double quotes.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::capabilities::DEFAULT_PREFIX;
use crate::utilities::string_utils::normalize_prefix;

/// Errors raised while reading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// CORS origin policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// `*`: any origin.
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parse a comma-separated origin list; `*` anywhere in it means any origin.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            Self::Any
        } else {
            Self::List(origins)
        }
    }
}

/// Runtime settings of the catalog server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: AllowedOrigins,
    pub environment: String,
    /// Mount point of the catalog routes, normalized.
    pub tool_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: AllowedOrigins::Any,
            environment: "development".to_string(),
            tool_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from process environment variables, falling back to
    /// `./.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_file(Path::new(DOTENV_FILE))
    }

    /// Read settings from process environment variables, falling back to the
    /// given env file. A missing file is not an error.
    pub fn from_env_with_file(path: &Path) -> Result<Self, ConfigError> {
        let file_vars = load_env_file(path);
        Self::from_lookup(|name| {
            std::env::var(name)
                .ok()
                .or_else(|| file_vars.get(name).cloned())
        })
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                name: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|raw| AllowedOrigins::parse(&raw))
                .unwrap_or(defaults.allowed_origins),
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            tool_prefix: lookup("TOOL_CATALOG_PREFIX")
                .map(|raw| normalize_prefix(&raw))
                .unwrap_or(defaults.tool_prefix),
        })
    }

    /// Address string to bind the listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// .env files
// ---------------------------------------------------------------------------

/// Env file read by [`Settings::from_env`].
pub const DOTENV_FILE: &str = ".env";

fn load_env_file(path: &Path) -> HashMap<String, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let vars = parse_env_file(&contents);
            log::debug!("Loaded {} variables from {}", vars.len(), path.display());
            vars
        }
        Err(e) => {
            log::debug!("No env file at {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

/// Parse `KEY=VALUE` lines. Malformed lines are skipped; a later key wins.
pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    // Unquoted values end at an inline comment.
    match value.find(" #") {
        Some(at) => value[..at].trim_end(),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("HOST", "127.0.0.1"),
            ("ALLOWED_ORIGINS", "http://a.test, http://b.test"),
            ("ENVIRONMENT", "production"),
            ("TOOL_CATALOG_PREFIX", "catalog/"),
        ]))
        .unwrap();

        assert_eq!(settings.bind_addr(), "127.0.0.1:9000");
        assert_eq!(
            settings.allowed_origins,
            AllowedOrigins::List(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
        assert_eq!(settings.environment, "production");
        assert_eq!(settings.tool_prefix, "/catalog");
    }

    #[test]
    fn test_invalid_port() {
        let err = Settings::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_wildcard_origin_wins() {
        assert_eq!(AllowedOrigins::parse("http://a.test,*"), AllowedOrigins::Any);
        assert_eq!(AllowedOrigins::parse(""), AllowedOrigins::Any);
    }

    #[test]
    fn test_parse_env_file() {
        let vars = parse_env_file(
            "# local overrides\n\
             \n\
             PORT=9100\n\
             export ENVIRONMENT=staging\n\
             ALLOWED_ORIGINS=\"http://a.test,http://b.test\"\n\
             HOST='127.0.0.1'\n\
             TOOL_CATALOG_PREFIX=/catalog # mount point\n\
             not a pair\n\
             =orphan\n",
        );
        assert_eq!(vars.len(), 5);
        assert_eq!(vars["PORT"], "9100");
        assert_eq!(vars["ENVIRONMENT"], "staging");
        assert_eq!(vars["ALLOWED_ORIGINS"], "http://a.test,http://b.test");
        assert_eq!(vars["HOST"], "127.0.0.1");
        assert_eq!(vars["TOOL_CATALOG_PREFIX"], "/catalog");
    }

    #[test]
    fn test_env_file_fills_unset_variables() {
        let path = std::env::temp_dir().join(format!("tool-catalog-{}.env", std::process::id()));
        std::fs::write(&path, "TOOL_CATALOG_PREFIX=from-dotenv\nENVIRONMENT=staging\n").unwrap();

        let settings = Settings::from_env_with_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        // Process variables take precedence over the file.
        if std::env::var("TOOL_CATALOG_PREFIX").is_err() {
            assert_eq!(settings.tool_prefix, "/from-dotenv");
        }
        assert_eq!(
            settings.environment,
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "staging".to_string())
        );
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let path = std::env::temp_dir().join("tool-catalog-missing.env");
        assert!(Settings::from_env_with_file(&path).is_ok());
    }
}
