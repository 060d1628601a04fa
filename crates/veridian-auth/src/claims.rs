//! External claims contribution.
//!
//! The claims provider is the seam through which a deployment enriches
//! tokens with profile data (name, email, roles, ...). The core calls it
//! with the subject and the granted scopes and merges whatever comes back
//! into the token's custom claims.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::AuthResult;
use crate::types::{Scope, ScopeKind, Subject};

/// Contributes custom claims to identity and access tokens.
#[async_trait]
pub trait ClaimsProvider: Send + Sync {
    /// Claims for an identity token: assertions about the user, filtered by
    /// the granted identity scopes.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying profile source fails.
    async fn identity_claims(
        &self,
        subject: &Subject,
        scopes: &[Scope],
    ) -> AuthResult<Map<String, Value>>;

    /// Claims for an access token. Usually empty; deployments can add
    /// authorization data here.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying profile source fails.
    async fn access_claims(
        &self,
        subject: &Subject,
        scopes: &[Scope],
    ) -> AuthResult<Map<String, Value>>;
}

/// Default provider: passes through the subject's own profile claims for
/// identity tokens when an identity scope beyond `openid` was granted, and
/// contributes nothing to access tokens.
#[derive(Debug, Default)]
pub struct DefaultClaimsProvider;

#[async_trait]
impl ClaimsProvider for DefaultClaimsProvider {
    async fn identity_claims(
        &self,
        subject: &Subject,
        scopes: &[Scope],
    ) -> AuthResult<Map<String, Value>> {
        let wants_profile = scopes
            .iter()
            .any(|s| s.kind == ScopeKind::Identity && s.name != "openid");

        if wants_profile {
            Ok(subject.claims.clone())
        } else {
            Ok(Map::new())
        }
    }

    async fn access_claims(
        &self,
        _subject: &Subject,
        _scopes: &[Scope],
    ) -> AuthResult<Map<String, Value>> {
        Ok(Map::new())
    }
}
