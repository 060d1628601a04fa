//! Consent decisions.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{Client, Scope, Subject};

/// Decides whether a request needs the user's consent before tokens are
/// issued.
#[async_trait]
pub trait ConsentService: Send + Sync {
    /// Returns `true` when the hosting layer must show a consent page for
    /// this client/subject/scope combination.
    ///
    /// # Errors
    ///
    /// Returns an error if a backing consent store fails.
    async fn requires_consent(
        &self,
        client: &Client,
        subject: &Subject,
        scopes: &[Scope],
    ) -> AuthResult<bool>;
}

/// Default policy: consent is required exactly when the client is
/// registered as requiring it. No per-user memory of prior grants.
#[derive(Debug, Default)]
pub struct DefaultConsentService;

#[async_trait]
impl ConsentService for DefaultConsentService {
    async fn requires_consent(
        &self,
        client: &Client,
        _subject: &Subject,
        _scopes: &[Scope],
    ) -> AuthResult<bool> {
        Ok(client.require_consent)
    }
}
