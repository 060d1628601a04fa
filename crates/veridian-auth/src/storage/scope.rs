//! Scope catalog trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Scope;

/// The provider's scope catalog.
#[async_trait]
pub trait ScopeStore: Send + Sync {
    /// Returns the catalog entries for the given names.
    ///
    /// Unknown names are simply absent from the result; the scope validator
    /// treats them as invalid. Disabled scopes ARE returned so the
    /// validator can reject them explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_names(&self, names: &[String]) -> AuthResult<Vec<Scope>>;

    /// Returns every registered scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn all(&self) -> AuthResult<Vec<Scope>>;
}
