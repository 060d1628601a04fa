//! Grant storage traits: authorization codes, token handles, refresh grants.
//!
//! All three are keyed by opaque handles generated server-side. Lookups for
//! unknown or expired handles return `Ok(None)`; callers translate that into
//! an `invalid_grant`-class protocol error. Storage failures proper are
//! `Err(AuthError::Storage)`.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{AuthorizationCode, RefreshGrant, Token};

/// Single-use storage for authorization codes.
#[async_trait]
pub trait AuthorizationCodeStore: Send + Sync {
    /// Stores the code and returns the opaque handle handed to the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn store(&self, code: AuthorizationCode) -> AuthResult<String>;

    /// Retrieves and deletes the code in one atomic operation.
    ///
    /// Under concurrent redemption of the same handle, exactly one caller
    /// receives the code; every other caller gets `None`. Expired codes are
    /// reported as `None`, indistinguishable from unknown handles.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get_and_delete(&self, handle: &str) -> AuthResult<Option<AuthorizationCode>>;
}

/// Storage for reference access tokens.
///
/// A reference token is an opaque handle mapping to a server-side `Token`;
/// resource servers resolve it via introspection and it can be revoked by
/// deleting the entry.
#[async_trait]
pub trait TokenHandleStore: Send + Sync {
    /// Stores the token and returns its opaque handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn store(&self, token: Token) -> AuthResult<String>;

    /// Looks up a token by handle without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find(&self, handle: &str) -> AuthResult<Option<Token>>;

    /// Revokes a token by deleting its entry. Deleting an unknown handle is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, handle: &str) -> AuthResult<()>;
}

/// Storage for refresh grants, keyed by the digest of the refresh token.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Stores a refresh grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn store(&self, grant: RefreshGrant) -> AuthResult<()>;

    /// Looks up a grant by the digest of the presented token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshGrant>>;

    /// Replaces a stored grant, keyed by its token hash. Used to persist
    /// the updated access-token blueprint when rotation is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn update(&self, grant: RefreshGrant) -> AuthResult<()>;

    /// Marks a grant as revoked. Revoking an unknown hash is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke(&self, token_hash: &str) -> AuthResult<()>;
}
