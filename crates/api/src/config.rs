//! Startup configuration, read once from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use shopfloor_auth::{StaticTokenValidator, TokenError};
use shopfloor_observability::{LogFormat, UnknownLogFormat};

pub const BIND_VAR: &str = "SHOPFLOOR_BIND";
pub const TOKENS_VAR: &str = "SHOPFLOOR_API_TOKENS";
pub const LOG_FORMAT_VAR: &str = "SHOPFLOOR_LOG_FORMAT";

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SHOPFLOOR_BIND: invalid socket address '{value}': {source}")]
    InvalidBind {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("SHOPFLOOR_API_TOKENS: {0}")]
    Tokens(#[from] TokenError),

    #[error("SHOPFLOOR_LOG_FORMAT: {0}")]
    LogFormat(#[from] UnknownLogFormat),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    pub log_format: LogFormat,
    pub tokens: StaticTokenValidator,
    /// No tokens were configured and the insecure dev token is in use.
    pub dev_token: bool,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and blank values take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind_raw.clone(),
                source,
            })?;

        let log_format = match get(LOG_FORMAT_VAR) {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };

        let parsed = match get(TOKENS_VAR) {
            Some(v) => StaticTokenValidator::parse(&v)?,
            None => StaticTokenValidator::new(),
        };
        let (tokens, dev_token) = if parsed.is_empty() {
            (StaticTokenValidator::dev(), true)
        } else {
            (parsed, false)
        };

        Ok(Self {
            bind,
            log_format,
            tokens,
            dev_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use shopfloor_auth::TokenValidator;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(cfg.dev_token);
        assert!(cfg.tokens.validate("dev-token").is_ok());
    }

    #[test]
    fn explicit_values() {
        let cfg = ApiConfig::from_lookup(lookup(&[
            (BIND_VAR, "127.0.0.1:9000"),
            (LOG_FORMAT_VAR, "pretty"),
            (TOKENS_VAR, "s3cret:alice:planner"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind.port(), 9000);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(!cfg.dev_token);
        assert_eq!(cfg.tokens.validate("s3cret").unwrap().name, "alice");
        assert!(cfg.tokens.validate("dev-token").is_err());
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(BIND_VAR, "nowhere")])),
            Err(ConfigError::InvalidBind { .. })
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(LOG_FORMAT_VAR, "xml")])),
            Err(ConfigError::LogFormat(_))
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(TOKENS_VAR, "no-name")])),
            Err(ConfigError::Tokens(_))
        ));
    }
}
