//! Token endpoint types.
//!
//! Wire-level request and response shapes for the token endpoint. The
//! request arrives as form parameters; the response is JSON per RFC 6749.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Grant types accepted at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// `authorization_code`
    AuthorizationCode,
    /// `refresh_token`
    RefreshToken,
    /// `client_credentials`
    ClientCredentials,
    /// `password` (resource owner password credentials, legacy)
    Password,
}

impl GrantType {
    /// Parses a `grant_type` parameter value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "authorization_code" => Some(Self::AuthorizationCode),
            "refresh_token" => Some(Self::RefreshToken),
            "client_credentials" => Some(Self::ClientCredentials),
            "password" => Some(Self::Password),
            _ => None,
        }
    }

    /// Canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
            Self::ClientCredentials => "client_credentials",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw token request form parameters. Nothing here is trusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// Requested grant type.
    #[serde(default)]
    pub grant_type: Option<String>,

    /// Authorization code handle (`authorization_code` grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI; must match the one from the authorize request.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Refresh token handle (`refresh_token` grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Requested scopes (`client_credentials` and `password` grants).
    #[serde(default)]
    pub scope: Option<String>,

    /// Resource owner username (`password` grant).
    #[serde(default)]
    pub username: Option<String>,

    /// Resource owner password (`password` grant).
    #[serde(default)]
    pub password: Option<String>,

    /// Client id when authenticating via POST body.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret when authenticating via POST body.
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// A successful token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Opaque reference access token handle.
    pub access_token: String,

    /// Always `Bearer`.
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: i64,

    /// Signed identity token, for OIDC grants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Refresh token handle, for code-flow grants with `offline_access`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// OAuth 2.0 token endpoint error codes (RFC 6749 section 5.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// Malformed request.
    InvalidRequest,
    /// Client authentication failed.
    InvalidClient,
    /// Invalid, expired, revoked, or mismatched grant.
    InvalidGrant,
    /// The client may not use this grant type.
    UnauthorizedClient,
    /// The grant type is not supported.
    UnsupportedGrantType,
    /// Invalid or disallowed scope.
    InvalidScope,
    /// Internal failure.
    ServerError,
}

impl TokenErrorCode {
    /// Canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A token endpoint error response.
#[derive(Debug, Clone, Serialize)]
pub struct TokenError {
    /// Error code.
    pub error: TokenErrorCode,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Creates a new token error.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error,
            error_description: None,
        }
    }

    /// Creates a new token error with a description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
        }
    }

    /// HTTP status for this error: 401 for failed client authentication,
    /// 400 otherwise.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self.error {
            TokenErrorCode::InvalidClient => 401,
            _ => 400,
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_description {
            Some(ref description) => write!(f, "{}: {}", self.error, description),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<AuthError> for TokenError {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::InvalidRequest { .. } => TokenErrorCode::InvalidRequest,
            AuthError::InvalidClient { .. } => TokenErrorCode::InvalidClient,
            AuthError::InvalidGrant { .. } => TokenErrorCode::InvalidGrant,
            AuthError::InvalidScope { .. } => TokenErrorCode::InvalidScope,
            AuthError::Unauthorized { .. } | AuthError::AccessDenied { .. } => {
                TokenErrorCode::UnauthorizedClient
            }
            AuthError::UnsupportedGrantType { .. } => TokenErrorCode::UnsupportedGrantType,
            AuthError::UnsupportedResponseType { .. } => TokenErrorCode::InvalidRequest,
            AuthError::Storage { .. }
            | AuthError::Configuration { .. }
            | AuthError::Internal { .. } => TokenErrorCode::ServerError,
        };

        // Server-side details stay out of the wire response.
        let description = if err.is_server_error() {
            None
        } else {
            Some(err.to_string())
        };

        Self {
            error: code,
            error_description: description,
        }
    }
}
