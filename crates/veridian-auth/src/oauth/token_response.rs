//! Token response generation.
//!
//! Every validated token request funnels through `process`, which signs
//! the identity token, stores the access token as a reference handle, and
//! manages refresh grants. Code-flow redemptions hand out the tokens that
//! were minted at authorize time; claims resolution is never re-run here.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::AuthResult;
use crate::config::IdpConfig;
use crate::error::AuthError;
use crate::events::{AuthEvent, EventSink};
use crate::oauth::token::{GrantType, TokenResponse};
use crate::oauth::token_validator::ValidatedTokenRequest;
use crate::storage::{RefreshTokenStore, TokenHandleStore};
use crate::token::jwt::SigningKeyProvider;
use crate::token::service::{TokenCreationRequest, TokenService};
use crate::types::{RefreshGrant, Token};

/// Generates token endpoint responses.
pub struct TokenResponseGenerator {
    token_service: Arc<TokenService>,
    handle_store: Arc<dyn TokenHandleStore>,
    refresh_store: Arc<dyn RefreshTokenStore>,
    key_provider: Arc<dyn SigningKeyProvider>,
    events: Arc<dyn EventSink>,
    config: IdpConfig,
}

impl TokenResponseGenerator {
    /// Creates a new response generator.
    #[must_use]
    pub fn new(
        token_service: Arc<TokenService>,
        handle_store: Arc<dyn TokenHandleStore>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        key_provider: Arc<dyn SigningKeyProvider>,
        events: Arc<dyn EventSink>,
        config: IdpConfig,
    ) -> Self {
        Self {
            token_service,
            handle_store,
            refresh_store,
            key_provider,
            events,
            config,
        }
    }

    /// Produces the response for a validated token request.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or storage fails, or if the validated
    /// request is internally inconsistent.
    pub async fn process(&self, request: &ValidatedTokenRequest) -> AuthResult<TokenResponse> {
        let response = match request.grant_type {
            GrantType::AuthorizationCode => self.process_authorization_code(request).await?,
            GrantType::RefreshToken => self.process_refresh_token(request).await?,
            GrantType::ClientCredentials | GrantType::Password => {
                self.process_direct_grant(request).await?
            }
        };

        self.events.on_event(&AuthEvent::TokensIssued {
            client_id: request.client.client_id.clone(),
            subject: request.subject.id.clone(),
            flow: request.client.flow,
        });

        Ok(response)
    }

    /// Code redemption: hand out the tokens embedded in the code.
    async fn process_authorization_code(
        &self,
        request: &ValidatedTokenRequest,
    ) -> AuthResult<TokenResponse> {
        let code = request
            .authorization_code
            .as_ref()
            .ok_or_else(|| AuthError::internal("validated code grant without a code"))?;

        let id_token = if code.requested_scopes.iter().any(|s| s == "openid") {
            let jwt = self
                .token_service
                .create_json_web_token(&code.identity_token, &request.client, &*self.key_provider)
                .await?;
            Some(jwt)
        } else {
            None
        };

        let refresh_token = if code.requested_scopes.iter().any(|s| s == "offline_access") {
            Some(self.issue_refresh_grant(request, &code.access_token).await?)
        } else {
            None
        };

        let expires_in = code.access_token.lifetime;
        let access_handle = self.handle_store.store(code.access_token.clone()).await?;

        Ok(TokenResponse {
            access_token: access_handle,
            token_type: "Bearer".to_string(),
            expires_in,
            id_token,
            refresh_token,
        })
    }

    /// Refresh: mint a fresh access token from the stored blueprint.
    ///
    /// The new token gets a new issuance time, so its expiry lands strictly
    /// after the one it replaces. Tokens already in the wild keep the
    /// expiry they were issued with.
    async fn process_refresh_token(
        &self,
        request: &ValidatedTokenRequest,
    ) -> AuthResult<TokenResponse> {
        let grant = request
            .refresh_grant
            .as_ref()
            .ok_or_else(|| AuthError::internal("validated refresh grant without a grant"))?;

        let mut access_token = grant.access_token.clone();
        access_token.claims.issued_at = OffsetDateTime::now_utc();

        let refresh_token = if self.config.oauth.refresh_token_rotation {
            let new_token = RefreshGrant::generate_token();
            let rotated = RefreshGrant {
                token_hash: RefreshGrant::hash_token(&new_token),
                client_id: grant.client_id.clone(),
                access_token: access_token.clone(),
                created_at: OffsetDateTime::now_utc(),
                // Rotation renews the handle, not the grant's lifetime.
                expires_at: grant.expires_at,
                revoked_at: None,
            };
            self.refresh_store.store(rotated).await?;
            self.refresh_store.revoke(&grant.token_hash).await?;
            Some(new_token)
        } else {
            let mut updated = grant.clone();
            updated.access_token = access_token.clone();
            self.refresh_store.update(updated).await?;
            // The client keeps using the token it already holds.
            None
        };

        let expires_in = access_token.lifetime;
        let access_handle = self.handle_store.store(access_token).await?;

        Ok(TokenResponse {
            access_token: access_handle,
            token_type: "Bearer".to_string(),
            expires_in,
            id_token: None,
            refresh_token,
        })
    }

    /// Client credentials and password grants: mint tokens directly.
    async fn process_direct_grant(
        &self,
        request: &ValidatedTokenRequest,
    ) -> AuthResult<TokenResponse> {
        let creation = TokenCreationRequest::from(request);
        let access_token = self.token_service.create_access_token(&creation).await?;

        let id_token = if request.grant_type == GrantType::Password
            && request.scopes.iter().any(|s| s.name == "openid")
        {
            let identity_token = self.token_service.create_identity_token(&creation).await?;
            let jwt = self
                .token_service
                .create_json_web_token(&identity_token, &request.client, &*self.key_provider)
                .await?;
            Some(jwt)
        } else {
            None
        };

        let expires_in = access_token.lifetime;
        let access_handle = self.handle_store.store(access_token).await?;

        Ok(TokenResponse {
            access_token: access_handle,
            token_type: "Bearer".to_string(),
            expires_in,
            id_token,
            refresh_token: None,
        })
    }

    async fn issue_refresh_grant(
        &self,
        request: &ValidatedTokenRequest,
        access_token: &Token,
    ) -> AuthResult<String> {
        let token = RefreshGrant::generate_token();
        let now = OffsetDateTime::now_utc();
        let lifetime = time::Duration::try_from(self.config.oauth.refresh_token_lifetime)
            .unwrap_or(time::Duration::ZERO);

        self.refresh_store
            .store(RefreshGrant {
                token_hash: RefreshGrant::hash_token(&token),
                client_id: request.client.client_id.clone(),
                access_token: access_token.clone(),
                created_at: now,
                expires_at: now + lifetime,
                revoked_at: None,
            })
            .await?;

        Ok(token)
    }
}
