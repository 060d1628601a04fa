//! OAuth 2.0 client registrations.
//!
//! A `Client` is immutable once loaded; validators look it up by id on every
//! request and never mutate it.

use serde::{Deserialize, Serialize};

// =============================================================================
// Flow
// =============================================================================

/// OAuth 2.0 / OIDC flow a client is permitted to use.
///
/// Each client is registered for exactly one flow; the authorize endpoint
/// maps the requested `response_type` onto a flow and rejects the request if
/// it doesn't match the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// Authorization Code flow.
    Code,
    /// Implicit flow (tokens delivered directly via the front channel).
    Implicit,
    /// Hybrid flow (code plus front-channel tokens).
    Hybrid,
    /// Client Credentials flow (machine-to-machine, no user).
    ClientCredentials,
    /// Resource Owner Password Credentials flow.
    /// Legacy; only for trusted first-party applications.
    ResourceOwnerPassword,
}

impl Flow {
    /// Returns the canonical name of the flow.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Implicit => "implicit",
            Self::Hybrid => "hybrid",
            Self::ClientCredentials => "client_credentials",
            Self::ResourceOwnerPassword => "resource_owner_password",
        }
    }

    /// Returns `true` if the flow goes through the authorize endpoint.
    #[must_use]
    pub fn uses_authorize_endpoint(&self) -> bool {
        matches!(self, Self::Code | Self::Implicit | Self::Hybrid)
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Signing key selection
// =============================================================================

/// How tokens for a client are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningKeyType {
    /// Symmetric signature (HS256) keyed with the client secret.
    ClientSecret,
    /// Asymmetric signature (RS256) with the provider's certificate key.
    Certificate,
}

// =============================================================================
// Client
// =============================================================================

/// OAuth 2.0 client registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// SHA-256 digests of the client's secrets (hex-encoded). Empty for
    /// public clients. Multiple entries support secret rollover.
    #[serde(default)]
    pub client_secrets: Vec<String>,

    /// Human-readable display name.
    pub name: String,

    /// The one flow this client is registered for.
    pub flow: Flow,

    /// Allowed redirect URIs; a redirect URI used in any response must
    /// exactly match one of these.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Scopes this client may request. Empty means unrestricted.
    #[serde(default)]
    pub scope_restrictions: Vec<String>,

    /// Identity token lifetime override in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_token_lifetime: Option<i64>,

    /// Access token lifetime override in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<i64>,

    /// Whether the consent screen is required for this client.
    #[serde(default)]
    pub require_consent: bool,

    /// Whether this client is currently enabled.
    pub enabled: bool,

    /// Signing mode for tokens issued to this client.
    pub signing_key_type: SigningKeyType,
}

impl Client {
    /// Checks if the given redirect URI exactly matches a registered one.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Checks if the given flow matches the client's registration.
    #[must_use]
    pub fn is_flow_allowed(&self, flow: Flow) -> bool {
        self.flow == flow
    }

    /// Returns `true` if this client has at least one secret registered.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        !self.client_secrets.is_empty()
    }
}
