//! Token request validation.
//!
//! One state machine per grant type, all converging on a
//! `ValidatedTokenRequest` the response generator can act on without
//! re-checking anything.
//!
//! Grant rejections collapse into a single opaque `invalid_grant`: the
//! client learns nothing about whether a code was unknown, expired, already
//! redeemed, or issued to someone else. The specifics go to the log.

use std::sync::Arc;

use crate::AuthResult;
use crate::config::IdpConfig;
use crate::error::AuthError;
use crate::events::{AuthEvent, EventSink};
use crate::oauth::client_auth::{AuthenticatedClient, TokenEndpointAuthMethod, authenticate_client};
use crate::oauth::token::{GrantType, TokenRequest};
use crate::scopes::{ScopeValidator, parse_scopes};
use crate::storage::{AuthorizationCodeStore, ClientStore, RefreshTokenStore, ScopeStore};
use crate::types::{
    AuthorizationCode, Client, Flow, RefreshGrant, Scope, ScopeKind, Subject, Token,
};
use crate::users::UserService;

/// A fully validated token request. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct ValidatedTokenRequest {
    /// The authenticated client.
    pub client: Client,

    /// The validated grant type.
    pub grant_type: GrantType,

    /// The subject tokens will be issued for (the client itself for
    /// client credentials).
    pub subject: Subject,

    /// Granted scopes, resolved against the catalog.
    pub scopes: Vec<Scope>,

    /// The redeemed code (`authorization_code` grant only).
    pub authorization_code: Option<AuthorizationCode>,

    /// The presented grant (`refresh_token` grant only).
    pub refresh_grant: Option<RefreshGrant>,
}

/// Validates token endpoint requests.
pub struct TokenRequestValidator {
    client_store: Arc<dyn ClientStore>,
    scope_store: Arc<dyn ScopeStore>,
    code_store: Arc<dyn AuthorizationCodeStore>,
    refresh_store: Arc<dyn RefreshTokenStore>,
    user_service: Option<Arc<dyn UserService>>,
    events: Arc<dyn EventSink>,
    config: IdpConfig,
}

impl TokenRequestValidator {
    /// Creates a new validator. `user_service` is only needed when the
    /// password grant is in use; without one that grant is reported as
    /// unsupported.
    #[must_use]
    pub fn new(
        client_store: Arc<dyn ClientStore>,
        scope_store: Arc<dyn ScopeStore>,
        code_store: Arc<dyn AuthorizationCodeStore>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        user_service: Option<Arc<dyn UserService>>,
        events: Arc<dyn EventSink>,
        config: IdpConfig,
    ) -> Self {
        Self {
            client_store,
            scope_store,
            code_store,
            refresh_store,
            user_service,
            events,
            config,
        }
    }

    /// Validates a raw token request.
    ///
    /// # Errors
    ///
    /// `InvalidClient` for authentication failures, `InvalidGrant` for
    /// rejected grants, `InvalidScope` / `InvalidRequest` /
    /// `UnsupportedGrantType` for the rest.
    pub async fn validate(
        &self,
        request: &TokenRequest,
        basic_auth: Option<(&str, &str)>,
    ) -> AuthResult<ValidatedTokenRequest> {
        let result = self.validate_inner(request, basic_auth).await;

        if let Err(ref err) = result {
            if err.is_client_error() {
                let client_id = basic_auth
                    .map(|(id, _)| id.to_string())
                    .or_else(|| request.client_id.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                self.events.on_event(&AuthEvent::GrantRejected {
                    client_id,
                    error: err.oauth_error_code(),
                });
            }
        }

        result
    }

    async fn validate_inner(
        &self,
        request: &TokenRequest,
        basic_auth: Option<(&str, &str)>,
    ) -> AuthResult<ValidatedTokenRequest> {
        // 1. Client authentication.
        let authenticated =
            authenticate_client(request, basic_auth, &*self.client_store).await?;

        // 2. Grant type.
        let raw_grant = request
            .grant_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("grant_type is missing"))?;
        let grant_type = GrantType::parse(raw_grant)
            .ok_or_else(|| AuthError::unsupported_grant_type(raw_grant))?;

        // 3. Per-grant validation.
        match grant_type {
            GrantType::AuthorizationCode => {
                self.validate_authorization_code(request, authenticated).await
            }
            GrantType::RefreshToken => self.validate_refresh_token(request, authenticated).await,
            GrantType::ClientCredentials => {
                self.validate_client_credentials(request, authenticated).await
            }
            GrantType::Password => self.validate_password(request, authenticated).await,
        }
    }

    async fn validate_authorization_code(
        &self,
        request: &TokenRequest,
        authenticated: AuthenticatedClient,
    ) -> AuthResult<ValidatedTokenRequest> {
        let client = authenticated.client;
        if !matches!(client.flow, Flow::Code | Flow::Hybrid) {
            return Err(AuthError::unauthorized(
                "client is not registered for the code flow",
            ));
        }

        let handle = request
            .code
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("code is missing"))?;
        let redirect_uri = request
            .redirect_uri
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("redirect_uri is missing"))?;

        // Single-use: the code is gone after this call no matter how the
        // remaining checks turn out.
        let Some(code) = self.code_store.get_and_delete(handle).await? else {
            tracing::warn!(client_id = %client.client_id, "authorization code not found");
            return Err(AuthError::invalid_grant("authorization code is invalid"));
        };

        let lifetime = self.config.oauth.authorization_code_lifetime;
        if code.is_expired(time::Duration::try_from(lifetime).unwrap_or(time::Duration::ZERO)) {
            tracing::warn!(client_id = %client.client_id, "authorization code expired");
            return Err(AuthError::invalid_grant("authorization code is invalid"));
        }

        if code.client_id != client.client_id {
            tracing::warn!(
                client_id = %client.client_id,
                code_client_id = %code.client_id,
                "authorization code was issued to a different client"
            );
            return Err(AuthError::invalid_grant("authorization code is invalid"));
        }

        if code.redirect_uri != redirect_uri {
            tracing::warn!(client_id = %client.client_id, "redirect_uri mismatch on redemption");
            return Err(AuthError::invalid_grant("authorization code is invalid"));
        }

        let subject = subject_from_token(&code.access_token);
        let scopes = self.scope_store.find_by_names(&code.requested_scopes).await?;

        Ok(ValidatedTokenRequest {
            client,
            grant_type: GrantType::AuthorizationCode,
            subject,
            scopes,
            authorization_code: Some(code),
            refresh_grant: None,
        })
    }

    async fn validate_refresh_token(
        &self,
        request: &TokenRequest,
        authenticated: AuthenticatedClient,
    ) -> AuthResult<ValidatedTokenRequest> {
        let client = authenticated.client;
        if !matches!(client.flow, Flow::Code | Flow::Hybrid) {
            return Err(AuthError::unauthorized(
                "client is not registered for a flow that issues refresh tokens",
            ));
        }

        let token = request
            .refresh_token
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("refresh_token is missing"))?;

        let hash = RefreshGrant::hash_token(token);
        let Some(grant) = self.refresh_store.find_by_hash(&hash).await? else {
            tracing::warn!(client_id = %client.client_id, "refresh token not found");
            return Err(AuthError::invalid_grant("refresh token is invalid"));
        };

        if !grant.is_valid() {
            tracing::warn!(
                client_id = %client.client_id,
                expired = grant.is_expired(),
                revoked = grant.is_revoked(),
                "refresh token no longer valid"
            );
            return Err(AuthError::invalid_grant("refresh token is invalid"));
        }

        if grant.client_id != client.client_id {
            tracing::warn!(
                client_id = %client.client_id,
                grant_client_id = %grant.client_id,
                "refresh token was issued to a different client"
            );
            return Err(AuthError::invalid_grant("refresh token is invalid"));
        }

        let subject = subject_from_token(&grant.access_token);
        let scopes = self
            .scope_store
            .find_by_names(&grant.access_token.claims.scopes)
            .await?;

        Ok(ValidatedTokenRequest {
            client,
            grant_type: GrantType::RefreshToken,
            subject,
            scopes,
            authorization_code: None,
            refresh_grant: Some(grant),
        })
    }

    async fn validate_client_credentials(
        &self,
        request: &TokenRequest,
        authenticated: AuthenticatedClient,
    ) -> AuthResult<ValidatedTokenRequest> {
        let client = authenticated.client;
        if client.flow != Flow::ClientCredentials {
            return Err(AuthError::unauthorized(
                "client is not registered for the client credentials flow",
            ));
        }
        if authenticated.auth_method == TokenEndpointAuthMethod::None {
            return Err(AuthError::invalid_client(
                "client credentials grant requires client authentication",
            ));
        }

        let requested = self.validated_scope_names(request, &client).await?;
        let scopes = self.resolve_scopes(&requested).await?;

        // No user is involved; identity scopes make no sense here.
        if scopes.iter().any(|s| s.kind == ScopeKind::Identity) {
            return Err(AuthError::invalid_scope(
                "identity scopes cannot be requested with client credentials",
            ));
        }

        // The client is its own subject.
        let subject = Subject::new(&client.client_id);

        Ok(ValidatedTokenRequest {
            client,
            grant_type: GrantType::ClientCredentials,
            subject,
            scopes,
            authorization_code: None,
            refresh_grant: None,
        })
    }

    async fn validate_password(
        &self,
        request: &TokenRequest,
        authenticated: AuthenticatedClient,
    ) -> AuthResult<ValidatedTokenRequest> {
        let client = authenticated.client;
        if client.flow != Flow::ResourceOwnerPassword {
            return Err(AuthError::unauthorized(
                "client is not registered for the resource owner password flow",
            ));
        }

        let Some(ref user_service) = self.user_service else {
            return Err(AuthError::unsupported_grant_type("password"));
        };

        let username = request
            .username
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("username is missing"))?;
        let password = request
            .password
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("password is missing"))?;

        let requested = self.validated_scope_names(request, &client).await?;
        let scopes = self.resolve_scopes(&requested).await?;

        let Some(subject) = user_service.validate_credentials(username, password).await? else {
            tracing::warn!(client_id = %client.client_id, "resource owner credentials rejected");
            return Err(AuthError::invalid_grant("invalid username or password"));
        };

        Ok(ValidatedTokenRequest {
            client,
            grant_type: GrantType::Password,
            subject,
            scopes,
            authorization_code: None,
            refresh_grant: None,
        })
    }

    async fn validated_scope_names(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<Vec<String>> {
        let raw = request
            .scope
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_scope("scope is required"))?;
        let requested =
            parse_scopes(raw).ok_or_else(|| AuthError::invalid_scope("scope is malformed"))?;

        let catalog = self.scope_store.all().await?;
        let mut validator = ScopeValidator::new(catalog);
        if !validator.are_scopes_valid(&requested) {
            return Err(AuthError::invalid_scope("one or more scopes are invalid"));
        }
        if !validator.are_scopes_allowed(client, &requested) {
            return Err(AuthError::invalid_scope(
                "one or more scopes are not allowed for this client",
            ));
        }

        Ok(requested)
    }

    async fn resolve_scopes(&self, requested: &[String]) -> AuthResult<Vec<Scope>> {
        let catalog = self.scope_store.all().await?;
        Ok(ScopeValidator::new(catalog).resolve(requested))
    }
}

fn subject_from_token(token: &Token) -> Subject {
    Subject {
        id: token.claims.subject.clone(),
        auth_time: token.claims.issued_at,
        claims: token.claims.custom.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TracingEventSink;
    use crate::types::{SigningKeyType, TokenClaims, TokenKind, generate_handle, hash_secret};
    use async_trait::async_trait;
    use serde_json::Map;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use time::OffsetDateTime;

    struct MockClientStore {
        clients: HashMap<String, Client>,
    }

    #[async_trait]
    impl ClientStore for MockClientStore {
        async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
            Ok(self.clients.get(client_id).cloned())
        }

        async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
            Ok(self
                .clients
                .get(client_id)
                .is_some_and(|c| c.client_secrets.contains(&hash_secret(secret))))
        }
    }

    struct MockScopeStore {
        scopes: Vec<Scope>,
    }

    #[async_trait]
    impl ScopeStore for MockScopeStore {
        async fn find_by_names(&self, names: &[String]) -> AuthResult<Vec<Scope>> {
            Ok(self
                .scopes
                .iter()
                .filter(|s| names.contains(&s.name))
                .cloned()
                .collect())
        }

        async fn all(&self) -> AuthResult<Vec<Scope>> {
            Ok(self.scopes.clone())
        }
    }

    struct MockCodeStore {
        codes: Mutex<HashMap<String, AuthorizationCode>>,
    }

    #[async_trait]
    impl AuthorizationCodeStore for MockCodeStore {
        async fn store(&self, code: AuthorizationCode) -> AuthResult<String> {
            let handle = generate_handle();
            self.codes.lock().unwrap().insert(handle.clone(), code);
            Ok(handle)
        }

        async fn get_and_delete(&self, handle: &str) -> AuthResult<Option<AuthorizationCode>> {
            Ok(self.codes.lock().unwrap().remove(handle))
        }
    }

    struct MockRefreshStore {
        grants: Mutex<HashMap<String, RefreshGrant>>,
    }

    #[async_trait]
    impl RefreshTokenStore for MockRefreshStore {
        async fn store(&self, grant: RefreshGrant) -> AuthResult<()> {
            self.grants
                .lock()
                .unwrap()
                .insert(grant.token_hash.clone(), grant);
            Ok(())
        }

        async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshGrant>> {
            Ok(self.grants.lock().unwrap().get(token_hash).cloned())
        }

        async fn update(&self, grant: RefreshGrant) -> AuthResult<()> {
            self.grants
                .lock()
                .unwrap()
                .insert(grant.token_hash.clone(), grant);
            Ok(())
        }

        async fn revoke(&self, token_hash: &str) -> AuthResult<()> {
            if let Some(grant) = self.grants.lock().unwrap().get_mut(token_hash) {
                grant.revoked_at = Some(OffsetDateTime::now_utc());
            }
            Ok(())
        }
    }

    struct StaticUserService;

    #[async_trait]
    impl UserService for StaticUserService {
        async fn validate_credentials(
            &self,
            username: &str,
            password: &str,
        ) -> AuthResult<Option<Subject>> {
            if username == "bob" && password == "bob" {
                Ok(Some(Subject::new("bob")))
            } else {
                Ok(None)
            }
        }
    }

    fn client(id: &str, flow: Flow) -> Client {
        Client {
            client_id: id.to_string(),
            client_secrets: vec![hash_secret("secret")],
            name: id.to_string(),
            flow,
            redirect_uris: vec!["https://client.example.com/cb".to_string()],
            scope_restrictions: vec![],
            identity_token_lifetime: None,
            access_token_lifetime: None,
            require_consent: false,
            enabled: true,
            signing_key_type: SigningKeyType::Certificate,
        }
    }

    fn token(kind: TokenKind, scopes: &[&str]) -> Token {
        Token {
            kind,
            issuer: "https://idp.example.com".to_string(),
            audience: "https://idp.example.com/resources".to_string(),
            lifetime: 3600,
            client_id: "codeclient".to_string(),
            claims: TokenClaims {
                subject: "bob".to_string(),
                scopes: scopes.iter().map(|s| (*s).to_string()).collect(),
                issued_at: OffsetDateTime::now_utc(),
                nonce: None,
                custom: Map::new(),
            },
        }
    }

    fn stored_code() -> AuthorizationCode {
        AuthorizationCode {
            client_id: "codeclient".to_string(),
            redirect_uri: "https://client.example.com/cb".to_string(),
            requested_scopes: vec!["openid".to_string(), "read".to_string()],
            created_at: OffsetDateTime::now_utc(),
            identity_token: token(TokenKind::Identity, &["openid"]),
            access_token: token(TokenKind::Access, &["openid", "read"]),
        }
    }

    struct Harness {
        validator: TokenRequestValidator,
        code_store: Arc<MockCodeStore>,
        refresh_store: Arc<MockRefreshStore>,
    }

    fn harness(clients: Vec<Client>) -> Harness {
        let code_store = Arc::new(MockCodeStore {
            codes: Mutex::new(HashMap::new()),
        });
        let refresh_store = Arc::new(MockRefreshStore {
            grants: Mutex::new(HashMap::new()),
        });
        let validator = TokenRequestValidator::new(
            Arc::new(MockClientStore {
                clients: clients
                    .into_iter()
                    .map(|c| (c.client_id.clone(), c))
                    .collect(),
            }),
            Arc::new(MockScopeStore {
                scopes: vec![
                    Scope::identity("openid"),
                    Scope::identity("offline_access"),
                    Scope::resource("read"),
                    Scope::resource("write").disabled(),
                ],
            }),
            code_store.clone(),
            refresh_store.clone(),
            Some(Arc::new(StaticUserService)),
            Arc::new(TracingEventSink),
            IdpConfig::new("https://idp.example.com"),
        );
        Harness {
            validator,
            code_store,
            refresh_store,
        }
    }

    fn code_request(handle: &str) -> TokenRequest {
        TokenRequest {
            grant_type: Some("authorization_code".to_string()),
            code: Some(handle.to_string()),
            redirect_uri: Some("https://client.example.com/cb".to_string()),
            ..TokenRequest::default()
        }
    }

    const BASIC: Option<(&str, &str)> = Some(("codeclient", "secret"));

    #[tokio::test]
    async fn code_grant_redeems_the_stored_code() {
        let h = harness(vec![client("codeclient", Flow::Code)]);
        let handle = h.code_store.store(stored_code()).await.unwrap();

        let validated = h
            .validator
            .validate(&code_request(&handle), BASIC)
            .await
            .unwrap();

        assert_eq!(validated.grant_type, GrantType::AuthorizationCode);
        assert_eq!(validated.subject.id, "bob");
        let code = validated.authorization_code.unwrap();
        assert_eq!(code.access_token.claims.scopes, vec!["openid", "read"]);
    }

    #[tokio::test]
    async fn code_grant_is_single_use() {
        let h = harness(vec![client("codeclient", Flow::Code)]);
        let handle = h.code_store.store(stored_code()).await.unwrap();

        assert!(h.validator.validate(&code_request(&handle), BASIC).await.is_ok());
        let err = h
            .validator
            .validate(&code_request(&handle), BASIC)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn expired_code_is_invalid_grant() {
        let h = harness(vec![client("codeclient", Flow::Code)]);
        let mut code = stored_code();
        code.created_at = OffsetDateTime::now_utc() - time::Duration::minutes(10);
        let handle = h.code_store.store(code).await.unwrap();

        let err = h
            .validator
            .validate(&code_request(&handle), BASIC)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn code_issued_to_another_client_is_invalid_grant() {
        let h = harness(vec![
            client("codeclient", Flow::Code),
            client("otherclient", Flow::Code),
        ]);
        let handle = h.code_store.store(stored_code()).await.unwrap();

        let err = h
            .validator
            .validate(&code_request(&handle), Some(("otherclient", "secret")))
            .await
            .unwrap_err();
        // Same opaque error as an unknown code.
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn redirect_uri_mismatch_is_invalid_grant() {
        let h = harness(vec![client("codeclient", Flow::Code)]);
        let handle = h.code_store.store(stored_code()).await.unwrap();

        let mut request = code_request(&handle);
        request.redirect_uri = Some("https://client.example.com/other".to_string());
        let err = h.validator.validate(&request, BASIC).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn unknown_grant_type_is_unsupported() {
        let h = harness(vec![client("codeclient", Flow::Code)]);
        let request = TokenRequest {
            grant_type: Some("saml2-bearer".to_string()),
            ..TokenRequest::default()
        };

        let err = h.validator.validate(&request, BASIC).await.unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedGrantType { .. }));
    }

    #[tokio::test]
    async fn refresh_grant_round_trip() {
        let h = harness(vec![client("codeclient", Flow::Code)]);
        let refresh_token = RefreshGrant::generate_token();
        let now = OffsetDateTime::now_utc();
        h.refresh_store
            .store(RefreshGrant {
                token_hash: RefreshGrant::hash_token(&refresh_token),
                client_id: "codeclient".to_string(),
                access_token: token(TokenKind::Access, &["openid", "read"]),
                created_at: now,
                expires_at: now + time::Duration::days(30),
                revoked_at: None,
            })
            .await
            .unwrap();

        let request = TokenRequest {
            grant_type: Some("refresh_token".to_string()),
            refresh_token: Some(refresh_token),
            ..TokenRequest::default()
        };

        let validated = h.validator.validate(&request, BASIC).await.unwrap();
        assert_eq!(validated.grant_type, GrantType::RefreshToken);
        assert_eq!(validated.subject.id, "bob");
        assert!(validated.refresh_grant.is_some());
    }

    #[tokio::test]
    async fn revoked_refresh_token_is_invalid_grant() {
        let h = harness(vec![client("codeclient", Flow::Code)]);
        let refresh_token = RefreshGrant::generate_token();
        let hash = RefreshGrant::hash_token(&refresh_token);
        let now = OffsetDateTime::now_utc();
        h.refresh_store
            .store(RefreshGrant {
                token_hash: hash.clone(),
                client_id: "codeclient".to_string(),
                access_token: token(TokenKind::Access, &["read"]),
                created_at: now,
                expires_at: now + time::Duration::days(30),
                revoked_at: None,
            })
            .await
            .unwrap();
        h.refresh_store.revoke(&hash).await.unwrap();

        let request = TokenRequest {
            grant_type: Some("refresh_token".to_string()),
            refresh_token: Some(refresh_token),
            ..TokenRequest::default()
        };

        let err = h.validator.validate(&request, BASIC).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn client_credentials_issues_for_the_client_itself() {
        let h = harness(vec![client("machine", Flow::ClientCredentials)]);
        let request = TokenRequest {
            grant_type: Some("client_credentials".to_string()),
            scope: Some("read".to_string()),
            ..TokenRequest::default()
        };

        let validated = h
            .validator
            .validate(&request, Some(("machine", "secret")))
            .await
            .unwrap();
        assert_eq!(validated.subject.id, "machine");
        assert_eq!(validated.scopes.len(), 1);
        assert_eq!(validated.scopes[0].kind, ScopeKind::Resource);
    }

    #[tokio::test]
    async fn client_credentials_rejects_identity_scopes() {
        let h = harness(vec![client("machine", Flow::ClientCredentials)]);
        let request = TokenRequest {
            grant_type: Some("client_credentials".to_string()),
            scope: Some("openid read".to_string()),
            ..TokenRequest::default()
        };

        let err = h
            .validator
            .validate(&request, Some(("machine", "secret")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidScope { .. }));
    }

    #[tokio::test]
    async fn client_credentials_rejects_disabled_scopes() {
        let h = harness(vec![client("machine", Flow::ClientCredentials)]);
        let request = TokenRequest {
            grant_type: Some("client_credentials".to_string()),
            scope: Some("write".to_string()),
            ..TokenRequest::default()
        };

        let err = h
            .validator
            .validate(&request, Some(("machine", "secret")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidScope { .. }));
    }

    #[tokio::test]
    async fn wrong_flow_for_grant_is_rejected() {
        let h = harness(vec![client("codeclient", Flow::Code)]);
        let request = TokenRequest {
            grant_type: Some("client_credentials".to_string()),
            scope: Some("read".to_string()),
            ..TokenRequest::default()
        };

        let err = h.validator.validate(&request, BASIC).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn password_grant_validates_credentials() {
        let h = harness(vec![client("legacy", Flow::ResourceOwnerPassword)]);
        let mut request = TokenRequest {
            grant_type: Some("password".to_string()),
            username: Some("bob".to_string()),
            password: Some("bob".to_string()),
            scope: Some("openid read".to_string()),
            ..TokenRequest::default()
        };

        let validated = h
            .validator
            .validate(&request, Some(("legacy", "secret")))
            .await
            .unwrap();
        assert_eq!(validated.subject.id, "bob");
        assert_eq!(validated.grant_type, GrantType::Password);

        request.password = Some("wrong".to_string());
        let err = h
            .validator
            .validate(&request, Some(("legacy", "secret")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }
}
