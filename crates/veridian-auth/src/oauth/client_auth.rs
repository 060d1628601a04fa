//! Client authentication for the token endpoint.
//!
//! Supported methods, tried in priority order:
//!
//! 1. `client_secret_basic` - HTTP Basic Auth header
//! 2. `client_secret_post` - client_id and client_secret in the body
//! 3. `none` - public clients (client_id only)
//!
//! Secrets are verified through `ClientStore::verify_secret` against the
//! stored SHA-256 digests; plaintext secrets never live in the store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::token::TokenRequest;
use crate::storage::ClientStore;
use crate::types::Client;

/// Result of successful client authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// The authenticated client.
    pub client: Client,

    /// The authentication method used.
    pub auth_method: TokenEndpointAuthMethod,
}

/// Token endpoint authentication methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// No client authentication (public clients).
    None,

    /// Client secret via HTTP Basic Auth.
    ClientSecretBasic,

    /// Client secret in request body.
    ClientSecretPost,
}

impl TokenEndpointAuthMethod {
    /// Returns the string representation of the auth method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
        }
    }
}

impl fmt::Display for TokenEndpointAuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticates a client from a token request.
///
/// # Errors
///
/// Returns `AuthError::InvalidClient` if no credentials are provided, the
/// client is unknown or disabled, the secret is wrong, or the credentials
/// do not fit the client's registration (public vs confidential).
pub async fn authenticate_client(
    request: &TokenRequest,
    basic_auth: Option<(&str, &str)>,
    client_store: &dyn ClientStore,
) -> AuthResult<AuthenticatedClient> {
    // 1. HTTP Basic Auth wins when present.
    if let Some((client_id, client_secret)) = basic_auth {
        return authenticate_with_secret(
            client_id,
            client_secret,
            TokenEndpointAuthMethod::ClientSecretBasic,
            client_store,
        )
        .await;
    }

    // 2. client_secret_post.
    if let (Some(client_id), Some(client_secret)) = (&request.client_id, &request.client_secret) {
        return authenticate_with_secret(
            client_id,
            client_secret,
            TokenEndpointAuthMethod::ClientSecretPost,
            client_store,
        )
        .await;
    }

    // 3. Public client: client_id only.
    if let Some(client_id) = &request.client_id {
        return authenticate_public(client_id, client_store).await;
    }

    Err(AuthError::invalid_client("No client credentials provided"))
}

async fn authenticate_with_secret(
    client_id: &str,
    client_secret: &str,
    auth_method: TokenEndpointAuthMethod,
    client_store: &dyn ClientStore,
) -> AuthResult<AuthenticatedClient> {
    let client = find_enabled_client(client_id, client_store).await?;

    if !client.is_confidential() {
        tracing::warn!(client_id = %client_id, "public client presented a secret");
        return Err(AuthError::invalid_client(format!(
            "Public clients cannot use {auth_method} authentication"
        )));
    }

    if !client_store.verify_secret(client_id, client_secret).await? {
        tracing::warn!(client_id = %client_id, "client secret verification failed");
        return Err(AuthError::invalid_client("Invalid client secret"));
    }

    Ok(AuthenticatedClient {
        client,
        auth_method,
    })
}

async fn authenticate_public(
    client_id: &str,
    client_store: &dyn ClientStore,
) -> AuthResult<AuthenticatedClient> {
    let client = find_enabled_client(client_id, client_store).await?;

    if client.is_confidential() {
        return Err(AuthError::invalid_client(
            "Confidential clients must provide client credentials",
        ));
    }

    Ok(AuthenticatedClient {
        client,
        auth_method: TokenEndpointAuthMethod::None,
    })
}

async fn find_enabled_client(
    client_id: &str,
    client_store: &dyn ClientStore,
) -> AuthResult<Client> {
    let client = client_store
        .find_by_client_id(client_id)
        .await?
        .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

    if !client.enabled {
        return Err(AuthError::invalid_client("Client is disabled"));
    }

    Ok(client)
}

/// Parses an HTTP Basic Auth header value into `(client_id, client_secret)`.
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let header_value = header_value.trim();
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    // Split on the first colon; the secret may contain colons.
    let (client_id, client_secret) = credentials.split_once(':')?;
    Some((client_id.to_string(), client_secret.to_string()))
}
