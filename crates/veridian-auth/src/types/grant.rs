//! Stored grants: authorization codes and refresh grants.
//!
//! Both are keyed by an opaque, cryptographically random handle. The handle
//! is the only value that ever leaves the server; the record stays behind
//! and is looked up (and, for codes, atomically deleted) on redemption.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::types::token::Token;

/// Generates an opaque handle: 128 bits from the OS CSPRNG, hex-encoded.
#[must_use]
pub fn generate_handle() -> String {
    let mut bytes = [0u8; 16];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    hex::encode(bytes)
}

/// Hashes a secret for storage/comparison (SHA-256, hex-encoded).
///
/// Client and scope secrets are stored as digests so a leaked store dump
/// does not yield usable credentials.
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// A stored authorization code.
///
/// The identity and access tokens are built at authorize time and embedded
/// here; redeeming the code hands them out as-is. The code record is the
/// single source of truth for what was granted, so the token endpoint never
/// re-runs claims resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// The client the code was issued to.
    pub client_id: String,

    /// Redirect URI of the originating authorize request; the token request
    /// must present the same value.
    pub redirect_uri: String,

    /// Scope names granted by this code.
    pub requested_scopes: Vec<String>,

    /// Creation time; codes expire a fixed, short interval after this.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Pre-built identity token.
    pub identity_token: Token,

    /// Pre-built access token.
    pub access_token: Token,
}

impl AuthorizationCode {
    /// Returns `true` if the code is older than `lifetime`.
    #[must_use]
    pub fn is_expired(&self, lifetime: time::Duration) -> bool {
        OffsetDateTime::now_utc() > self.created_at + lifetime
    }
}

/// A stored refresh grant.
///
/// Carries the access-token blueprint so refreshes reproduce the original
/// grant's subject and scopes. The blueprint's own expiry is never touched:
/// refreshing mints a new token with a new issuance time and must not
/// retroactively extend tokens already in the wild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshGrant {
    /// SHA-256 digest of the refresh token handle presented by the client.
    pub token_hash: String,

    /// The client the grant was issued to.
    pub client_id: String,

    /// Access token issued alongside this grant, kept as the blueprint for
    /// refreshed tokens.
    pub access_token: Token,

    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Absolute expiry of the grant itself.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Revocation time, if the grant has been revoked or rotated away.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshGrant {
    /// Hashes a refresh token handle for storage lookup.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        hash_secret(token)
    }

    /// Generates a new refresh token handle (256 bits, base64url).
    #[must_use]
    pub fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the grant has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the grant has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if the grant can still be redeemed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::token::{TokenClaims, TokenKind};
    use serde_json::Map;
    use time::Duration;

    fn access_token() -> Token {
        Token {
            kind: TokenKind::Access,
            issuer: "https://idp.example.com".to_string(),
            audience: "https://idp.example.com/resources".to_string(),
            lifetime: 3600,
            client_id: "client".to_string(),
            claims: TokenClaims {
                subject: "bob".to_string(),
                scopes: vec!["profile".to_string()],
                issued_at: OffsetDateTime::now_utc(),
                nonce: None,
                custom: Map::new(),
            },
        }
    }

    #[test]
    fn handles_are_random_hex() {
        let a = generate_handle();
        let b = generate_handle();
        assert_eq!(a.len(), 32); // 16 bytes, hex
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn secret_hashing_is_deterministic() {
        assert_eq!(hash_secret("secret"), hash_secret("secret"));
        assert_ne!(hash_secret("secret"), hash_secret("Secret"));
    }

    #[test]
    fn code_expiry() {
        let code = AuthorizationCode {
            client_id: "client".to_string(),
            redirect_uri: "https://localhost/cb".to_string(),
            requested_scopes: vec!["openid".to_string()],
            created_at: OffsetDateTime::now_utc() - Duration::minutes(10),
            identity_token: access_token(),
            access_token: access_token(),
        };

        assert!(code.is_expired(Duration::minutes(5)));
        assert!(!code.is_expired(Duration::minutes(15)));
    }

    #[test]
    fn refresh_grant_validity() {
        let now = OffsetDateTime::now_utc();
        let mut grant = RefreshGrant {
            token_hash: RefreshGrant::hash_token("handle"),
            client_id: "client".to_string(),
            access_token: access_token(),
            created_at: now,
            expires_at: now + Duration::days(30),
            revoked_at: None,
        };

        assert!(grant.is_valid());
        grant.revoked_at = Some(now);
        assert!(!grant.is_valid());
    }

    #[test]
    fn refresh_token_generation() {
        let token = RefreshGrant::generate_token();
        assert_eq!(token.len(), 43); // 32 bytes base64url, no padding
        assert_ne!(token, RefreshGrant::generate_token());
    }
}
