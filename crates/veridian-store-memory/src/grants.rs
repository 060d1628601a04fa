//! In-memory grant stores: authorization codes, token handles, refresh
//! grants.
//!
//! The code store leans on `DashMap::remove` for atomic single-use
//! redemption: under concurrent redemption of the same handle exactly one
//! caller gets the code back.

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use veridian_auth::AuthResult;
use veridian_auth::storage::{AuthorizationCodeStore, RefreshTokenStore, TokenHandleStore};
use veridian_auth::types::{AuthorizationCode, RefreshGrant, Token, generate_handle};

/// An `AuthorizationCodeStore` backed by a concurrent hash map.
#[derive(Debug)]
pub struct InMemoryCodeStore {
    codes: DashMap<String, AuthorizationCode>,
    code_lifetime: time::Duration,
}

impl InMemoryCodeStore {
    /// Creates a code store that treats codes older than `code_lifetime`
    /// as gone.
    #[must_use]
    pub fn new(code_lifetime: std::time::Duration) -> Self {
        Self {
            codes: DashMap::new(),
            code_lifetime: time::Duration::try_from(code_lifetime)
                .unwrap_or(time::Duration::ZERO),
        }
    }
}

#[async_trait]
impl AuthorizationCodeStore for InMemoryCodeStore {
    async fn store(&self, code: AuthorizationCode) -> AuthResult<String> {
        let handle = generate_handle();
        self.codes.insert(handle.clone(), code);
        Ok(handle)
    }

    async fn get_and_delete(&self, handle: &str) -> AuthResult<Option<AuthorizationCode>> {
        // remove() is the atomicity point: one winner per handle.
        let Some((_, code)) = self.codes.remove(handle) else {
            return Ok(None);
        };

        // Expired codes look exactly like unknown handles.
        if code.is_expired(self.code_lifetime) {
            return Ok(None);
        }

        Ok(Some(code))
    }
}

/// A `TokenHandleStore` backed by a concurrent hash map.
#[derive(Debug, Default)]
pub struct InMemoryTokenHandleStore {
    tokens: DashMap<String, Token>,
}

impl InMemoryTokenHandleStore {
    /// Creates an empty token handle store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenHandleStore for InMemoryTokenHandleStore {
    async fn store(&self, token: Token) -> AuthResult<String> {
        let handle = generate_handle();
        self.tokens.insert(handle.clone(), token);
        Ok(handle)
    }

    async fn find(&self, handle: &str) -> AuthResult<Option<Token>> {
        Ok(self.tokens.get(handle).map(|entry| entry.clone()))
    }

    async fn delete(&self, handle: &str) -> AuthResult<()> {
        self.tokens.remove(handle);
        Ok(())
    }
}

/// A `RefreshTokenStore` backed by a concurrent hash map, keyed by token
/// digest.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    grants: DashMap<String, RefreshGrant>,
}

impl InMemoryRefreshTokenStore {
    /// Creates an empty refresh grant store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn store(&self, grant: RefreshGrant) -> AuthResult<()> {
        self.grants.insert(grant.token_hash.clone(), grant);
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshGrant>> {
        Ok(self.grants.get(token_hash).map(|entry| entry.clone()))
    }

    async fn update(&self, grant: RefreshGrant) -> AuthResult<()> {
        self.grants.insert(grant.token_hash.clone(), grant);
        Ok(())
    }

    async fn revoke(&self, token_hash: &str) -> AuthResult<()> {
        if let Some(mut entry) = self.grants.get_mut(token_hash) {
            entry.revoked_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }
}
