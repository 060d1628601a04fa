//! Scope catalog entries.

use serde::{Deserialize, Serialize};

/// Kind of a registered scope.
///
/// Identity scopes map to claims about the user and end up in identity
/// tokens; resource scopes grant access to APIs and end up in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Claims about the authenticated user (e.g. `openid`, `profile`).
    Identity,
    /// Access to a protected resource (e.g. `api1`).
    Resource,
}

/// A scope registered in the provider's catalog.
///
/// Disabled scopes are never valid, regardless of client restrictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    /// Unique scope name as it appears in requests.
    pub name: String,

    /// Whether this is an identity or resource scope.
    pub kind: ScopeKind,

    /// Whether the scope can currently be requested.
    pub enabled: bool,

    /// SHA-256 digests of introspection secrets for this scope
    /// (resource servers authenticate with these when introspecting
    /// reference tokens). Usually empty.
    #[serde(default)]
    pub secrets: Vec<String>,
}

impl Scope {
    /// Creates an enabled identity scope.
    #[must_use]
    pub fn identity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ScopeKind::Identity,
            enabled: true,
            secrets: Vec::new(),
        }
    }

    /// Creates an enabled resource scope.
    #[must_use]
    pub fn resource(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ScopeKind::Resource,
            enabled: true,
            secrets: Vec::new(),
        }
    }

    /// Disables the scope.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
