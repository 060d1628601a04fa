//! Token creation.
//!
//! The token service builds server-side `Token` values for identity and
//! access tokens and serializes them into signed JWTs. It has no
//! persistence side effects; storing reference handles and refresh grants
//! is the response generators' job.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::AuthResult;
use crate::claims::ClaimsProvider;
use crate::config::IdpConfig;
use crate::oauth::token_validator::ValidatedTokenRequest;
use crate::oauth::validator::ValidatedAuthorizeRequest;
use crate::token::jwt::{JwtService, SigningKeyProvider};
use crate::types::{Client, Scope, ScopeKind, Subject, Token, TokenClaims, TokenKind};

/// Everything needed to mint a pair of tokens, regardless of which
/// endpoint the request arrived through.
#[derive(Debug, Clone)]
pub struct TokenCreationRequest {
    /// The client the tokens are issued to.
    pub client: Client,

    /// The authenticated subject (the client itself for client
    /// credentials).
    pub subject: Subject,

    /// The granted scopes, resolved against the catalog.
    pub scopes: Vec<Scope>,

    /// Nonce from the authorization request, echoed into identity tokens.
    pub nonce: Option<String>,
}

impl TokenCreationRequest {
    /// Creates a request with no nonce.
    #[must_use]
    pub fn new(client: Client, subject: Subject, scopes: Vec<Scope>) -> Self {
        Self {
            client,
            subject,
            scopes,
            nonce: None,
        }
    }

    /// Sets the nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: Option<String>) -> Self {
        self.nonce = nonce;
        self
    }
}

impl From<&ValidatedAuthorizeRequest> for TokenCreationRequest {
    fn from(request: &ValidatedAuthorizeRequest) -> Self {
        Self {
            client: request.client.clone(),
            subject: request.subject.clone(),
            scopes: request.scopes.clone(),
            nonce: request.nonce.clone(),
        }
    }
}

impl From<&ValidatedTokenRequest> for TokenCreationRequest {
    fn from(request: &ValidatedTokenRequest) -> Self {
        Self {
            client: request.client.clone(),
            subject: request.subject.clone(),
            scopes: request.scopes.clone(),
            nonce: None,
        }
    }
}

/// Creates identity and access tokens and signs them into JWTs.
pub struct TokenService {
    claims_provider: Arc<dyn ClaimsProvider>,
    jwt: JwtService,
    config: IdpConfig,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(claims_provider: Arc<dyn ClaimsProvider>, config: IdpConfig) -> Self {
        Self {
            claims_provider,
            jwt: JwtService::new(),
            config,
        }
    }

    /// Creates an identity token for the request's subject.
    ///
    /// The audience is the client id; the scope claims carry only the
    /// granted identity scopes. Custom claims come from the claims
    /// provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims provider fails.
    pub async fn create_identity_token(
        &self,
        request: &TokenCreationRequest,
    ) -> AuthResult<Token> {
        let identity_scopes: Vec<Scope> = request
            .scopes
            .iter()
            .filter(|s| s.kind == ScopeKind::Identity)
            .cloned()
            .collect();

        let custom = self
            .claims_provider
            .identity_claims(&request.subject, &identity_scopes)
            .await?;

        let lifetime = request.client.identity_token_lifetime.unwrap_or_else(|| {
            i64::try_from(self.config.oauth.identity_token_lifetime.as_secs()).unwrap_or(i64::MAX)
        });

        Ok(Token {
            kind: TokenKind::Identity,
            issuer: self.config.issuer.clone(),
            audience: request.client.client_id.clone(),
            lifetime,
            client_id: request.client.client_id.clone(),
            claims: TokenClaims {
                subject: request.subject.id.clone(),
                scopes: identity_scopes.into_iter().map(|s| s.name).collect(),
                issued_at: OffsetDateTime::now_utc(),
                nonce: request.nonce.clone(),
                custom,
            },
        })
    }

    /// Creates an access token for the request's subject.
    ///
    /// The audience is `{issuer}/resources`; the scope claims carry every
    /// granted scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims provider fails.
    pub async fn create_access_token(&self, request: &TokenCreationRequest) -> AuthResult<Token> {
        let custom = self
            .claims_provider
            .access_claims(&request.subject, &request.scopes)
            .await?;

        let lifetime = request.client.access_token_lifetime.unwrap_or_else(|| {
            i64::try_from(self.config.oauth.access_token_lifetime.as_secs()).unwrap_or(i64::MAX)
        });

        Ok(Token {
            kind: TokenKind::Access,
            issuer: self.config.issuer.clone(),
            audience: self.config.access_token_audience(),
            lifetime,
            client_id: request.client.client_id.clone(),
            claims: TokenClaims {
                subject: request.subject.id.clone(),
                scopes: request.scopes.iter().map(|s| s.name.clone()).collect(),
                issued_at: OffsetDateTime::now_utc(),
                nonce: None,
                custom,
            },
        })
    }

    /// Signs a token into its JWT wire form using the client's key
    /// material.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` when the key provider has no
    /// material for the client, or an internal error if signing fails.
    pub async fn create_json_web_token(
        &self,
        token: &Token,
        client: &Client,
        key_provider: &dyn SigningKeyProvider,
    ) -> AuthResult<String> {
        let material = key_provider.material_for(client).await?;
        Ok(self.jwt.sign(token, &material)?)
    }
}
