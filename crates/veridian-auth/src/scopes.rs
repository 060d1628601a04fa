//! Scope parsing and validation.
//!
//! Scope strings are space-separated lists of names. Parsing normalizes
//! them (deduplicated, sorted ascending) so downstream logging and storage
//! are deterministic. Validation checks every requested name against the
//! provider's catalog and against the requesting client's restriction list.

use crate::types::{Client, Scope, ScopeKind};

/// Parses a raw scope string into a sorted, deduplicated list of names.
///
/// Returns `None` if the input is empty or whitespace only. Parsing is
/// idempotent: re-parsing the joined output yields the same list.
#[must_use]
pub fn parse_scopes(raw: &str) -> Option<Vec<String>> {
    let mut names: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    if names.is_empty() {
        return None;
    }
    names.sort_unstable();
    names.dedup();
    Some(names)
}

/// Validates requested scopes against the catalog and client restrictions.
///
/// `are_scopes_valid` records whether the requested set contained identity
/// and/or resource scopes; the authorize validator uses those flags to
/// decide whether the request is an OIDC request and whether an access
/// token is called for.
#[derive(Debug)]
pub struct ScopeValidator {
    catalog: Vec<Scope>,

    /// Set by `are_scopes_valid` when the request names an identity scope.
    pub contains_identity_scopes: bool,

    /// Set by `are_scopes_valid` when the request names a resource scope.
    pub contains_resource_scopes: bool,
}

impl ScopeValidator {
    /// Creates a validator over the given scope catalog.
    #[must_use]
    pub fn new(catalog: Vec<Scope>) -> Self {
        Self {
            catalog,
            contains_identity_scopes: false,
            contains_resource_scopes: false,
        }
    }

    /// Returns `true` only if every requested name maps to an enabled
    /// catalog scope. Records the identity/resource flags as a side effect.
    pub fn are_scopes_valid(&mut self, requested: &[String]) -> bool {
        self.contains_identity_scopes = false;
        self.contains_resource_scopes = false;

        for name in requested {
            let Some(scope) = self
                .catalog
                .iter()
                .find(|s| s.enabled && s.name == *name)
            else {
                tracing::warn!(scope = %name, "requested scope is unknown or disabled");
                return false;
            };

            match scope.kind {
                ScopeKind::Identity => self.contains_identity_scopes = true,
                ScopeKind::Resource => self.contains_resource_scopes = true,
            }
        }

        true
    }

    /// Returns `true` if the client may request every one of the given
    /// scopes: either its restriction list is empty, or each requested name
    /// appears in the list.
    ///
    /// Identity scopes are exempt from the restriction list; it governs
    /// resource access (a client restricted to `[profile]` can still make
    /// an `openid profile` request).
    #[must_use]
    pub fn are_scopes_allowed(&self, client: &Client, requested: &[String]) -> bool {
        if client.scope_restrictions.is_empty() {
            return true;
        }

        for name in requested {
            let is_identity = self
                .catalog
                .iter()
                .any(|s| s.name == *name && s.kind == ScopeKind::Identity);
            if is_identity {
                continue;
            }

            if !client.scope_restrictions.iter().any(|r| r == name) {
                tracing::warn!(
                    client_id = %client.client_id,
                    scope = %name,
                    "requested scope is not allowed for this client"
                );
                return false;
            }
        }

        true
    }

    /// Materializes the catalog entries for the requested names.
    /// Names without an enabled catalog entry are skipped; call
    /// `are_scopes_valid` first to reject those.
    #[must_use]
    pub fn resolve(&self, requested: &[String]) -> Vec<Scope> {
        requested
            .iter()
            .filter_map(|name| {
                self.catalog
                    .iter()
                    .find(|s| s.enabled && s.name == *name)
                    .cloned()
            })
            .collect()
    }
}
