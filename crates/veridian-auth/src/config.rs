//! Identity provider configuration.
//!
//! Configuration is organized into logical subsections: protocol defaults
//! for the OAuth 2.0 endpoints and token signing settings. All durations
//! deserialize from humantime strings.
//!
//! # Example (TOML)
//!
//! ```toml
//! issuer = "https://idp.example.com"
//!
//! [oauth]
//! authorization_code_lifetime = "5m"
//! access_token_lifetime = "1h"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root identity provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdpConfig {
    /// Issuer URL (used in the token `iss` claim and as the base for the
    /// access-token audience `{issuer}/resources`).
    pub issuer: String,

    /// OAuth 2.0 protocol configuration.
    pub oauth: OAuthConfig,

    /// Token signing configuration.
    pub signing: SigningConfig,
}

impl Default for IdpConfig {
    fn default() -> Self {
        Self {
            issuer: "https://localhost".to_string(),
            oauth: OAuthConfig::default(),
            signing: SigningConfig::default(),
        }
    }
}

impl IdpConfig {
    /// Creates a configuration for the given issuer with default settings.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ..Self::default()
        }
    }

    /// Returns the audience for access tokens: `{issuer}/resources`.
    #[must_use]
    pub fn access_token_audience(&self) -> String {
        format!("{}/resources", self.issuer.trim_end_matches('/'))
    }
}

/// OAuth 2.0 protocol configuration.
///
/// Controls grant lifetimes and refresh token behavior. Token lifetimes can
/// be overridden per client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime. Codes are short-lived; an expired code
    /// behaves exactly like an unknown one.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Default identity token lifetime.
    #[serde(with = "humantime_serde")]
    pub identity_token_lifetime: Duration,

    /// Default access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Rotate refresh tokens on use. When enabled, each refresh revokes the
    /// presented token and issues a new one.
    pub refresh_token_rotation: bool,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(300), // 5 minutes
            identity_token_lifetime: Duration::from_secs(360),     // 6 minutes
            access_token_lifetime: Duration::from_secs(3600),      // 1 hour
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 3600), // 30 days
            refresh_token_rotation: true,
        }
    }
}

impl OAuthConfig {
    /// Sets the authorization code lifetime.
    #[must_use]
    pub fn with_authorization_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.authorization_code_lifetime = lifetime;
        self
    }

    /// Sets the default access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the default identity token lifetime.
    #[must_use]
    pub fn with_identity_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.identity_token_lifetime = lifetime;
        self
    }

    /// Sets whether refresh tokens rotate on use.
    #[must_use]
    pub fn with_refresh_token_rotation(mut self, rotate: bool) -> Self {
        self.refresh_token_rotation = rotate;
        self
    }
}

/// Token signing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Key identifier placed in the JWT header for certificate-signed
    /// tokens, so resource servers can select the right verification key.
    pub key_id: Option<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self { key_id: None }
    }
}
