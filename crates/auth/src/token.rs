use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::{Principal, Role};

/// Token used when no tokens are configured. Development only.
pub const DEV_TOKEN: &str = "dev-token";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("missing bearer token")]
    Missing,

    #[error("unknown or revoked token")]
    Unknown,

    /// A token table entry could not be parsed.
    #[error("invalid token entry '{0}': expected token:user-name:role")]
    MalformedEntry(String),

    #[error("duplicate token for user '{0}'")]
    Duplicate(String),
}

/// Resolve a bearer token to the principal it was issued to.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> Result<Principal, TokenError>;
}

impl<V> TokenValidator for Arc<V>
where
    V: TokenValidator + ?Sized,
{
    fn validate(&self, token: &str) -> Result<Principal, TokenError> {
        (**self).validate(token)
    }
}

/// Fixed token table, loaded once at startup.
///
/// Each token gets its principal (and user id) when it is registered, so the
/// same token maps to the same user for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single `dev-token` → `dev` / `admin`.
    pub fn dev() -> Self {
        let mut v = Self::new();
        v.tokens
            .insert(DEV_TOKEN.to_string(), Principal::new("dev", Role::ADMIN));
        v
    }

    /// Parse `token:user-name:role` entries separated by commas.
    ///
    /// Blank entries are skipped. An empty role defaults to `admin`.
    pub fn parse(table: &str) -> Result<Self, TokenError> {
        let mut v = Self::new();
        for raw in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = raw.splitn(3, ':').map(str::trim);
            let (Some(token), Some(name)) = (parts.next(), parts.next()) else {
                return Err(TokenError::MalformedEntry(raw.to_string()));
            };
            if token.is_empty() || name.is_empty() {
                return Err(TokenError::MalformedEntry(raw.to_string()));
            }
            let role = match parts.next() {
                Some(r) if !r.is_empty() => Role::new(r.to_string()),
                _ => Role::ADMIN,
            };
            v.register(token, Principal::new(name, role))?;
        }
        Ok(v)
    }

    pub fn register(&mut self, token: impl Into<String>, principal: Principal) -> Result<(), TokenError> {
        let token = token.into();
        if self.tokens.contains_key(&token) {
            return Err(TokenError::Duplicate(principal.name));
        }
        self.tokens.insert(token, principal);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate(&self, token: &str) -> Result<Principal, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Missing);
        }
        self.tokens.get(token).cloned().ok_or(TokenError::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_table_accepts_dev_token() {
        let v = StaticTokenValidator::dev();
        let p = v.validate(DEV_TOKEN).unwrap();
        assert_eq!(p.name, "dev");
        assert_eq!(p.role, Role::ADMIN);
    }

    #[test]
    fn same_token_same_user() {
        let v = StaticTokenValidator::parse("abc:alice:planner").unwrap();
        let a = v.validate("abc").unwrap();
        let b = v.validate("abc").unwrap();
        assert_eq!(a.user_id, b.user_id);
        assert_eq!(a.role.as_str(), "planner");
    }

    #[test]
    fn parses_multiple_entries_and_defaults_role() {
        let v = StaticTokenValidator::parse(" t1:alice:operator , t2:bob ,").unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v.validate("t2").unwrap().role, Role::ADMIN);
        assert_ne!(v.validate("t1").unwrap().user_id, v.validate("t2").unwrap().user_id);
    }

    #[test]
    fn rejects_malformed_and_duplicate_entries() {
        assert!(matches!(
            StaticTokenValidator::parse("lonely"),
            Err(TokenError::MalformedEntry(_))
        ));
        assert!(matches!(
            StaticTokenValidator::parse(":alice:admin"),
            Err(TokenError::MalformedEntry(_))
        ));
        assert!(matches!(
            StaticTokenValidator::parse("t:a,t:b"),
            Err(TokenError::Duplicate(_))
        ));
    }

    #[test]
    fn unknown_and_missing_tokens() {
        let v = StaticTokenValidator::dev();
        assert_eq!(v.validate("nope"), Err(TokenError::Unknown));
        assert_eq!(v.validate("  "), Err(TokenError::Missing));
    }

    #[test]
    fn validator_behind_arc() {
        let v: Arc<dyn TokenValidator> = Arc::new(StaticTokenValidator::dev());
        assert!(v.validate(DEV_TOKEN).is_ok());
    }
}
