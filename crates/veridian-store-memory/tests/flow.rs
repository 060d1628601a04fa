//! End-to-end protocol flows against the in-memory stores.

use std::sync::Arc;

use url::Url;

use veridian_auth::claims::DefaultClaimsProvider;
use veridian_auth::config::IdpConfig;
use veridian_auth::error::AuthError;
use veridian_auth::events::TracingEventSink;
use veridian_auth::oauth::{
    AuthorizeOutcome, AuthorizeRequest, AuthorizeRequestValidator, AuthorizeResponseGenerator,
    DefaultConsentService, TokenRequest, TokenRequestValidator, TokenResponse,
    TokenResponseGenerator,
};
use veridian_auth::storage::TokenHandleStore;
use veridian_auth::token::{StaticKeyProvider, TokenService};
use veridian_auth::types::{
    Client, Flow, RequestContext, Scope, SigningKeyType, Subject, hash_secret,
};
use veridian_store_memory::{
    InMemoryClientStore, InMemoryCodeStore, InMemoryRefreshTokenStore, InMemoryScopeStore,
    InMemoryTokenHandleStore,
};

const CLIENT_SECRET: &str = "secret";
const BASIC: Option<(&str, &str)> = Some(("codeclient", CLIENT_SECRET));

fn code_client() -> Client {
    Client {
        client_id: "codeclient".to_string(),
        client_secrets: vec![hash_secret(CLIENT_SECRET)],
        name: "Code Client".to_string(),
        flow: Flow::Code,
        redirect_uris: vec!["https://client.example.com/cb".to_string()],
        scope_restrictions: vec!["profile".to_string(), "read".to_string()],
        identity_token_lifetime: None,
        access_token_lifetime: None,
        require_consent: false,
        enabled: true,
        signing_key_type: SigningKeyType::Certificate,
    }
}

fn service_client() -> Client {
    Client {
        client_id: "serviceclient".to_string(),
        name: "Service Client".to_string(),
        flow: Flow::ClientCredentials,
        redirect_uris: vec![],
        ..code_client()
    }
}

fn catalog() -> Vec<Scope> {
    vec![
        Scope::identity("openid"),
        Scope::identity("profile"),
        Scope::identity("offline_access"),
        Scope::resource("read"),
        Scope::resource("legacy").disabled(),
    ]
}

struct Idp {
    authorize_validator: AuthorizeRequestValidator,
    authorize_generator: AuthorizeResponseGenerator,
    token_validator: Arc<TokenRequestValidator>,
    token_generator: TokenResponseGenerator,
    handle_store: Arc<InMemoryTokenHandleStore>,
}

impl Idp {
    fn new() -> Self {
        let config = IdpConfig::new("https://idp.example.com");

        let client_store = Arc::new(InMemoryClientStore::with_clients(vec![
            code_client(),
            service_client(),
        ]));
        let scope_store = Arc::new(InMemoryScopeStore::with_scopes(catalog()));
        let code_store = Arc::new(InMemoryCodeStore::new(
            config.oauth.authorization_code_lifetime,
        ));
        let handle_store = Arc::new(InMemoryTokenHandleStore::new());
        let refresh_store = Arc::new(InMemoryRefreshTokenStore::new());

        let token_service = Arc::new(TokenService::new(
            Arc::new(DefaultClaimsProvider),
            config.clone(),
        ));
        let key_provider = Arc::new(StaticKeyProvider::generate(None).expect("rsa keygen"));
        let events = Arc::new(TracingEventSink);

        Self {
            authorize_validator: AuthorizeRequestValidator::new(
                client_store.clone(),
                scope_store.clone(),
                Arc::new(DefaultConsentService),
            ),
            authorize_generator: AuthorizeResponseGenerator::new(
                token_service.clone(),
                code_store.clone(),
                handle_store.clone(),
                key_provider.clone(),
                events.clone(),
            ),
            token_validator: Arc::new(TokenRequestValidator::new(
                client_store,
                scope_store,
                code_store,
                refresh_store.clone(),
                None,
                events.clone(),
                config.clone(),
            )),
            token_generator: TokenResponseGenerator::new(
                token_service,
                handle_store.clone(),
                refresh_store,
                key_provider,
                events,
                config,
            ),
            handle_store,
        }
    }

    /// Runs the authorization endpoint for `bob` and returns the code.
    async fn authorize(&self, scope: &str) -> String {
        let request = AuthorizeRequest {
            response_type: Some("code".to_string()),
            client_id: Some("codeclient".to_string()),
            redirect_uri: Some("https://client.example.com/cb".to_string()),
            scope: Some(scope.to_string()),
            state: Some("af0ifjsldkj".to_string()),
            nonce: Some("n-0S6_WzA2Mj".to_string()),
            ..AuthorizeRequest::default()
        };
        let context = RequestContext::authenticated(Subject::new("bob"));

        let outcome = self
            .authorize_validator
            .validate(&request, &context)
            .await
            .expect("authorize request should validate");
        let AuthorizeOutcome::Proceed(validated) = outcome else {
            panic!("expected Proceed, got {outcome:?}");
        };

        let response = self
            .authorize_generator
            .process(&validated)
            .await
            .expect("authorize response");
        let redirect = response.to_redirect_url().expect("redirect url");

        let url = Url::parse(&redirect).expect("valid redirect url");
        assert!(redirect.starts_with("https://client.example.com/cb?"));
        assert_eq!(
            url.query_pairs()
                .find(|(k, _)| k == "state")
                .map(|(_, v)| v.into_owned())
                .as_deref(),
            Some("af0ifjsldkj")
        );

        url.query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .expect("code parameter")
    }

    async fn redeem(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let request = TokenRequest {
            grant_type: Some("authorization_code".to_string()),
            code: Some(code.to_string()),
            redirect_uri: Some("https://client.example.com/cb".to_string()),
            ..TokenRequest::default()
        };

        let validated = self.token_validator.validate(&request, BASIC).await?;
        self.token_generator.process(&validated).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let request = TokenRequest {
            grant_type: Some("refresh_token".to_string()),
            refresh_token: Some(refresh_token.to_string()),
            ..TokenRequest::default()
        };

        let validated = self.token_validator.validate(&request, BASIC).await?;
        self.token_generator.process(&validated).await
    }
}

#[tokio::test]
async fn code_flow_end_to_end() {
    let idp = Idp::new();
    let code = idp.authorize("openid profile read").await;
    let response = idp.redeem(&code).await.expect("redemption");

    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.expires_in, 3600);

    // Identity token is a signed JWT.
    let id_token = response.id_token.expect("id_token");
    assert_eq!(id_token.split('.').count(), 3);

    // Access token is an opaque reference handle resolving server-side.
    assert!(!response.access_token.contains('.'));
    let stored = idp
        .handle_store
        .find(&response.access_token)
        .await
        .unwrap()
        .expect("stored access token");
    assert_eq!(stored.claims.subject, "bob");
    assert!(stored.claims.scopes.contains(&"read".to_string()));

    // No offline_access requested, so no refresh token.
    assert!(response.refresh_token.is_none());
}

#[tokio::test]
async fn codes_cannot_be_redeemed_twice() {
    let idp = Idp::new();
    let code = idp.authorize("openid").await;

    idp.redeem(&code).await.expect("first redemption");
    let second = idp.redeem(&code).await;
    assert!(matches!(second, Err(AuthError::InvalidGrant { .. })));
}

#[tokio::test]
async fn concurrent_redemption_has_exactly_one_winner() {
    let idp = Arc::new(Idp::new());
    let code = idp.authorize("openid").await;

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let idp = idp.clone();
        let code = code.clone();
        tasks.push(tokio::spawn(
            async move { idp.redeem(&code).await.is_ok() },
        ));
    }

    let mut winners = 0;
    for task in tasks {
        if task.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn refresh_mints_a_later_expiring_token_and_rotates() {
    let idp = Idp::new();
    let code = idp.authorize("openid offline_access read").await;
    let initial = idp.redeem(&code).await.expect("redemption");
    let first_refresh_token = initial.refresh_token.clone().expect("refresh token");

    let original = idp
        .handle_store
        .find(&initial.access_token)
        .await
        .unwrap()
        .expect("original access token");
    let original_expiry = original.expiry_unix();

    // A second later the refreshed token must expire strictly later.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let refreshed = idp.refresh(&first_refresh_token).await.expect("refresh");

    let renewed = idp
        .handle_store
        .find(&refreshed.access_token)
        .await
        .unwrap()
        .expect("renewed access token");
    assert!(renewed.expiry_unix() > original_expiry);

    // The token already in the wild keeps its expiry.
    let original_again = idp
        .handle_store
        .find(&initial.access_token)
        .await
        .unwrap()
        .expect("original still resolvable");
    assert_eq!(original_again.expiry_unix(), original_expiry);

    // Rotation: a new refresh token came back and the old one is dead.
    let second_refresh_token = refreshed.refresh_token.expect("rotated refresh token");
    assert_ne!(second_refresh_token, first_refresh_token);
    let replay = idp.refresh(&first_refresh_token).await;
    assert!(matches!(replay, Err(AuthError::InvalidGrant { .. })));

    // The rotated token works.
    idp.refresh(&second_refresh_token)
        .await
        .expect("rotated token refresh");
}

#[tokio::test]
async fn unknown_scopes_are_rejected_at_the_authorize_endpoint() {
    let idp = Idp::new();
    let request = AuthorizeRequest {
        response_type: Some("code".to_string()),
        client_id: Some("codeclient".to_string()),
        redirect_uri: Some("https://client.example.com/cb".to_string()),
        scope: Some("openid ghost".to_string()),
        ..AuthorizeRequest::default()
    };
    let context = RequestContext::authenticated(Subject::new("bob"));

    let err = idp
        .authorize_validator
        .validate(&request, &context)
        .await
        .expect_err("unknown scope");
    assert_eq!(err.error, "invalid_scope");
    // Client and redirect URI were verified, so the error may redirect.
    assert!(err.is_redirectable());
}

#[tokio::test]
async fn client_credentials_cannot_use_disabled_scopes() {
    let idp = Idp::new();
    let request = TokenRequest {
        grant_type: Some("client_credentials".to_string()),
        scope: Some("legacy".to_string()),
        ..TokenRequest::default()
    };

    let err = idp
        .token_validator
        .validate(&request, Some(("serviceclient", CLIENT_SECRET)))
        .await
        .expect_err("disabled scope");
    assert!(matches!(err, AuthError::InvalidScope { .. }));
}

#[tokio::test]
async fn client_credentials_issues_a_service_token() {
    let idp = Idp::new();
    let request = TokenRequest {
        grant_type: Some("client_credentials".to_string()),
        scope: Some("read".to_string()),
        ..TokenRequest::default()
    };

    let validated = idp
        .token_validator
        .validate(&request, Some(("serviceclient", CLIENT_SECRET)))
        .await
        .expect("validation");
    let response = idp
        .token_generator
        .process(&validated)
        .await
        .expect("response");

    assert!(response.id_token.is_none());
    assert!(response.refresh_token.is_none());
    let stored = idp
        .handle_store
        .find(&response.access_token)
        .await
        .unwrap()
        .expect("stored token");
    assert_eq!(stored.claims.subject, "serviceclient");
}
