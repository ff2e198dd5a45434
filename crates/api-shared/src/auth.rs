//! Role and identity types plus bearer-token resolution.
//!
//! The HMS core never implements authentication: credentials are exchanged
//! for a token by an external identity provider. What the API consumes is a
//! resolved, request-scoped [`Identity`] (role + user id). `TokenSet` is the
//! deployment-side table that maps opaque bearer tokens to identities,
//! loaded once from the environment at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

/// The role an authenticated caller holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

impl std::str::FromStr for Role {
    type Err = TokenSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Doctor" => Ok(Role::Doctor),
            "Patient" => Ok(Role::Patient),
            other => Err(TokenSetError::UnknownRole(other.to_owned())),
        }
    }
}

/// A request-scoped authenticated identity.
///
/// Handlers receive this explicitly and pass it into core calls; there is no
/// process-global "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub role: Role,
    pub user_id: i64,
}

/// Errors raised while parsing the token table.
#[derive(Debug, thiserror::Error)]
pub enum TokenSetError {
    #[error("malformed token entry (expected token=Role:id): {0}")]
    MalformedEntry(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}

/// An in-memory bearer-token table.
///
/// Stand-in for the external identity provider: each entry maps an opaque
/// token to a role and user id. The wire format of `HMS_API_TOKENS` is a
/// comma-separated list of `token=Role:id` entries, e.g.
/// `s3cret=Admin:1,d0ctor=Doctor:4`.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    tokens: HashMap<String, Identity>,
}

impl TokenSet {
    /// Builds an empty token table (every lookup fails).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a token table from the `token=Role:id` wire format.
    pub fn parse(spec: &str) -> Result<Self, TokenSetError> {
        let mut tokens = HashMap::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, identity) = entry
                .split_once('=')
                .ok_or_else(|| TokenSetError::MalformedEntry(entry.to_owned()))?;
            let (role, user_id) = identity
                .split_once(':')
                .ok_or_else(|| TokenSetError::MalformedEntry(entry.to_owned()))?;
            let role: Role = role.trim().parse()?;
            let user_id: i64 = user_id
                .trim()
                .parse()
                .map_err(|_| TokenSetError::InvalidUserId(user_id.to_owned()))?;
            tokens.insert(token.trim().to_owned(), Identity { role, user_id });
        }
        Ok(Self { tokens })
    }

    /// Loads the token table from the `HMS_API_TOKENS` environment variable.
    ///
    /// A missing variable yields an empty table, which locks out every
    /// authenticated route rather than failing open.
    pub fn from_env() -> Result<Self, TokenSetError> {
        match env::var("HMS_API_TOKENS") {
            Ok(spec) => Self::parse(&spec),
            Err(_) => Ok(Self::new()),
        }
    }

    /// Inserts a token mapping. Useful for tests and embedded setups.
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    /// Resolves a bearer token to an identity.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_entries() {
        let set = TokenSet::parse("admintok=Admin:1, doctok=Doctor:7").unwrap();
        assert_eq!(
            set.resolve("admintok"),
            Some(Identity {
                role: Role::Admin,
                user_id: 1
            })
        );
        assert_eq!(
            set.resolve("doctok"),
            Some(Identity {
                role: Role::Doctor,
                user_id: 7
            })
        );
        assert_eq!(set.resolve("unknown"), None);
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(TokenSet::parse("no-equals-sign").is_err());
        assert!(TokenSet::parse("tok=Wizard:1").is_err());
        assert!(TokenSet::parse("tok=Admin:notanumber").is_err());
    }

    #[test]
    fn empty_spec_resolves_nothing() {
        let set = TokenSet::parse("").unwrap();
        assert_eq!(set.resolve("anything"), None);
    }
}
