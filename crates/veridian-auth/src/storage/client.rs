//! Client repository trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Repository of OAuth 2.0 client registrations.
///
/// Clients are immutable once loaded; the core only reads them.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Finds a client by its OAuth `client_id`.
    ///
    /// Returns `None` for unknown ids. Disabled clients are returned so the
    /// caller can distinguish "unknown" from "disabled" in its logs; both
    /// are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Verifies a client secret against the stored digests.
    ///
    /// Returns `false` for unknown clients, public clients, and wrong
    /// secrets alike.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool>;
}
