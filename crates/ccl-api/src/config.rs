//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8080` |
//! | `PUBLIC_DIR` | `public` |
//! | `MATTERS_API_BASE` | `http://127.0.0.1:{PORT}` |
//! | `MATTERS_TIMEOUT_SECS` | unset (transport default) |
//! | `STAFF_DIRECTORY_PATH` | `data/team.json` |
//! | `CCL_TEMPLATE_PATH` | unset (built-in letter) |
//! | `ALLOWED_ORIGINS` | localhost origins |
//! | `MAX_BODY_BYTES` | 1 MiB |
//!
//! Unparseable numeric values fall back to their defaults with a warning.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;
use tracing::warn;

use ccl_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Resolved server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
    pub matters_api_base: String,
    pub matters_timeout: Option<Duration>,
    pub staff_directory_path: PathBuf,
    pub template_path: Option<PathBuf>,
    pub allowed_origins: String,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            public_dir: PathBuf::from(defaults::PUBLIC_DIR),
            matters_api_base: format!("http://127.0.0.1:{}", defaults::PORT),
            matters_timeout: None,
            staff_directory_path: PathBuf::from(defaults::STAFF_DIRECTORY_PATH),
            template_path: None,
            allowed_origins: defaults::ALLOWED_ORIGINS.to_string(),
            max_body_bytes: defaults::MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = Self::default();
        let port = parse_or("PORT", lookup("PORT"), base.port);

        Self {
            host: lookup("HOST").unwrap_or(base.host),
            port,
            public_dir: lookup("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(base.public_dir),
            matters_api_base: lookup("MATTERS_API_BASE")
                .unwrap_or_else(|| format!("http://127.0.0.1:{}", port)),
            matters_timeout: lookup("MATTERS_TIMEOUT_SECS")
                .and_then(|v| match v.parse::<u64>() {
                    Ok(secs) if secs > 0 => Some(secs),
                    _ => {
                        warn!(value = %v, "Ignoring invalid MATTERS_TIMEOUT_SECS");
                        None
                    }
                })
                .map(Duration::from_secs),
            staff_directory_path: lookup("STAFF_DIRECTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or(base.staff_directory_path),
            template_path: lookup("CCL_TEMPLATE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            allowed_origins: lookup("ALLOWED_ORIGINS").unwrap_or(base.allowed_origins),
            max_body_bytes: parse_or("MAX_BODY_BYTES", lookup("MAX_BODY_BYTES"), base.max_body_bytes),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.matters_api_base.starts_with("http://")
            && !self.matters_api_base.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "MATTERS_API_BASE must start with http:// or https://, got: {}",
                self.matters_api_base
            )));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Validation(
                "MAX_BODY_BYTES must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed CORS origin whitelist; blank input yields the defaults.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        parse_allowed_origins(&self.allowed_origins)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
    }
}

/// Parse a comma-separated origin list into header values, skipping invalid entries.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    let source = if raw.trim().is_empty() {
        defaults::ALLOWED_ORIGINS
    } else {
        raw
    };

    source
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.public_dir, PathBuf::from("public"));
        assert_eq!(cfg.matters_api_base, "http://127.0.0.1:8080");
        assert!(cfg.matters_timeout.is_none());
        assert!(cfg.template_path.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_matters_base_follows_port() {
        let cfg = config(&[("PORT", "9000")]);
        assert_eq!(cfg.matters_api_base, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PUBLIC_DIR", "/srv/public"),
            ("MATTERS_API_BASE", "https://matters.internal"),
            ("MATTERS_TIMEOUT_SECS", "15"),
            ("CCL_TEMPLATE_PATH", "/etc/ccl/letter.txt"),
            ("MAX_BODY_BYTES", "2048"),
        ]);
        assert_eq!(cfg.public_dir, PathBuf::from("/srv/public"));
        assert_eq!(cfg.matters_api_base, "https://matters.internal");
        assert_eq!(cfg.matters_timeout, Some(Duration::from_secs(15)));
        assert_eq!(cfg.template_path, Some(PathBuf::from("/etc/ccl/letter.txt")));
        assert_eq!(cfg.max_body_bytes, 2048);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let cfg = config(&[("PORT", "eighty"), ("MATTERS_TIMEOUT_SECS", "0")]);
        assert_eq!(cfg.port, 8080);
        assert!(cfg.matters_timeout.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_matters_base() {
        let cfg = config(&[("MATTERS_API_BASE", "matters.internal")]);
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_parse_allowed_origins() {
        let origins = parse_allowed_origins("https://hub.helix-law.com, http://localhost:3000 ,");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0].to_str().unwrap(), "https://hub.helix-law.com");

        assert!(!parse_allowed_origins("").is_empty());
        assert_eq!(parse_allowed_origins("https://ok.com,bad\norigin").len(), 1);
    }
}
