//! Resource-owner credential validation.
//!
//! Only the legacy `password` grant touches user credentials; everything
//! else receives an already-authenticated `Subject` from the hosting layer.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Subject;

/// Validates resource-owner credentials for the password grant.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Checks the username/password pair and returns the authenticated
    /// subject, or `None` if the credentials are wrong.
    ///
    /// Implementations must not reveal whether the username exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying credential store fails.
    async fn validate_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<Option<Subject>>;
}
