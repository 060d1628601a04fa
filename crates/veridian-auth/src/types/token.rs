//! Internal token representation.
//!
//! A `Token` is the pre-serialization form of an identity or access token:
//! issuer, audience, lifetime, and claims. It is turned into either a signed
//! compact JWT or an opaque reference handle stored server-side; the `Token`
//! itself is never sent over the wire.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Kind of an internal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// OIDC identity token (audience is the client).
    Identity,
    /// OAuth 2.0 access token (audience is `{issuer}/resources`).
    Access,
}

/// Claims carried by a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject identifier. For client-credentials tokens this is the
    /// client id itself.
    pub subject: String,

    /// Granted scope names.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Issuance time; token lifetime counts from here, not from when the
    /// originating request arrived.
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,

    /// OIDC nonce, echoed into identity tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Custom claims contributed by the claims provider.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, Value>,
}

/// Internal, pre-serialization token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Identity or access token.
    pub kind: TokenKind,

    /// Issuer URL (`iss`).
    pub issuer: String,

    /// Audience (`aud`).
    pub audience: String,

    /// Lifetime in seconds, measured from `claims.issued_at`.
    pub lifetime: i64,

    /// The client this token was issued to.
    pub client_id: String,

    /// Token claims.
    pub claims: TokenClaims,
}

impl Token {
    /// Returns the expiry as a unix timestamp: `iat + lifetime`.
    #[must_use]
    pub fn expiry_unix(&self) -> i64 {
        self.claims.issued_at.unix_timestamp() + self.lifetime
    }

    /// Returns `true` if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc().unix_timestamp() >= self.expiry_unix()
    }

    /// Returns the scopes joined into a space-separated string.
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.claims.scopes.join(" ")
    }
}
