//! Authorization request validation.
//!
//! The validator walks the raw query parameters through a fixed sequence
//! of checks. The ordering is load-bearing: nothing is ever delivered to a
//! redirect URI before the client and that URI have been verified, which
//! is the open-redirect rule every later step relies on.

use std::sync::Arc;

use crate::oauth::authorize::{AuthorizeError, AuthorizeRequest, ResponseMode, ResponseType};
use crate::oauth::consent::ConsentService;
use crate::scopes::{ScopeValidator, parse_scopes};
use crate::storage::{ClientStore, ScopeStore};
use crate::types::{Client, Flow, RequestContext, Scope, Subject};

/// The outcome of validating an authorization request.
#[derive(Debug)]
pub enum AuthorizeOutcome {
    /// Fully validated; hand to the response generator.
    Proceed(ValidatedAuthorizeRequest),
    /// The user must authenticate first. Not an error.
    LoginRequired,
    /// The user must grant consent first.
    ConsentRequired(ValidatedAuthorizeRequest),
}

/// A fully validated authorization request. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct ValidatedAuthorizeRequest {
    /// The resolved, enabled client.
    pub client: Client,

    /// The authenticated user.
    pub subject: Subject,

    /// Verified redirect URI.
    pub redirect_uri: String,

    /// Parsed response type.
    pub response_type: ResponseType,

    /// The flow the response type maps to.
    pub flow: Flow,

    /// Normalized requested scope names.
    pub requested_scopes: Vec<String>,

    /// Catalog entries for the requested scopes.
    pub scopes: Vec<Scope>,

    /// Echoed client state.
    pub state: Option<String>,

    /// OpenID Connect nonce.
    pub nonce: Option<String>,

    /// Resolved response delivery mode.
    pub response_mode: ResponseMode,

    /// Whether identity scopes were requested (OIDC request).
    pub is_open_id_request: bool,

    /// Whether resource scopes were requested (an access token is due).
    pub includes_resource_scopes: bool,
}

/// Validates authorization endpoint requests.
pub struct AuthorizeRequestValidator {
    client_store: Arc<dyn ClientStore>,
    scope_store: Arc<dyn ScopeStore>,
    consent: Arc<dyn ConsentService>,
}

impl AuthorizeRequestValidator {
    /// Creates a new validator.
    #[must_use]
    pub fn new(
        client_store: Arc<dyn ClientStore>,
        scope_store: Arc<dyn ScopeStore>,
        consent: Arc<dyn ConsentService>,
    ) -> Self {
        Self {
            client_store,
            scope_store,
            consent,
        }
    }

    /// Validates a raw authorization request against the client and scope
    /// registries and the request context.
    ///
    /// # Errors
    ///
    /// Returns an `AuthorizeError` whose kind tells the hosting layer
    /// whether it may be redirected to the client (`Client`) or must be
    /// rendered in-page (`User`).
    pub async fn validate(
        &self,
        request: &AuthorizeRequest,
        context: &RequestContext,
    ) -> Result<AuthorizeOutcome, AuthorizeError> {
        // 1. Required parameters. No client is verified yet, so every
        //    failure here renders in-page.
        let Some(client_id) = request.client_id.as_deref().filter(|s| !s.is_empty()) else {
            return Err(AuthorizeError::user(
                "invalid_request",
                "client_id is missing",
            ));
        };
        let Some(raw_response_type) = request.response_type.as_deref().filter(|s| !s.is_empty())
        else {
            return Err(AuthorizeError::user(
                "invalid_request",
                "response_type is missing",
            ));
        };
        let Some(raw_scope) = request.scope.as_deref().filter(|s| !s.is_empty()) else {
            return Err(AuthorizeError::user("invalid_request", "scope is missing"));
        };

        // 2. Client and redirect URI. Still in-page on failure.
        let client = self
            .client_store
            .find_by_client_id(client_id)
            .await
            .map_err(|_| AuthorizeError::user("server_error", "client lookup failed"))?;
        let Some(client) = client.filter(|c| c.enabled) else {
            tracing::warn!(client_id = %client_id, "unknown or disabled client");
            return Err(AuthorizeError::user(
                "unauthorized_client",
                "unknown or disabled client",
            ));
        };

        let Some(redirect_uri) = request.redirect_uri.as_deref().filter(|s| !s.is_empty())
        else {
            return Err(AuthorizeError::user(
                "invalid_request",
                "redirect_uri is missing",
            ));
        };
        if !client.is_redirect_uri_allowed(redirect_uri) {
            tracing::warn!(
                client_id = %client.client_id,
                redirect_uri = %redirect_uri,
                "redirect_uri is not registered for this client"
            );
            return Err(AuthorizeError::user(
                "invalid_request",
                "redirect_uri is not registered for this client",
            ));
        }

        // From here on the client and redirect URI are verified, so errors
        // may be delivered by redirect.
        let state = request.state.clone();

        // 3. Response type and flow.
        let Some(response_type) = ResponseType::parse(raw_response_type) else {
            return Err(AuthorizeError::client(
                "unsupported_response_type",
                format!("response_type '{raw_response_type}' is not supported"),
                redirect_uri,
                ResponseMode::Query,
                state,
            ));
        };

        let response_mode = match request.response_mode.as_deref() {
            Some(raw_mode) => match ResponseMode::parse(raw_mode) {
                Some(mode) => mode,
                None => {
                    return Err(AuthorizeError::client(
                        "invalid_request",
                        format!("response_mode '{raw_mode}' is not supported"),
                        redirect_uri,
                        ResponseMode::default_for(response_type),
                        state,
                    ));
                }
            },
            None => ResponseMode::default_for(response_type),
        };

        let flow = response_type.flow();
        if !client.is_flow_allowed(flow) {
            tracing::warn!(
                client_id = %client.client_id,
                flow = %flow,
                "client is not permitted to use this flow"
            );
            return Err(AuthorizeError::client(
                "unauthorized_client",
                "client is not authorized for this response type",
                redirect_uri,
                response_mode,
                state,
            ));
        }

        // 4. Scopes.
        let Some(requested_scopes) = parse_scopes(raw_scope) else {
            return Err(AuthorizeError::client(
                "invalid_scope",
                "scope is malformed",
                redirect_uri,
                response_mode,
                state,
            ));
        };

        let catalog = self
            .scope_store
            .all()
            .await
            .map_err(|_| AuthorizeError::user("server_error", "scope lookup failed"))?;
        let mut scope_validator = ScopeValidator::new(catalog);

        if !scope_validator.are_scopes_valid(&requested_scopes) {
            return Err(AuthorizeError::client(
                "invalid_scope",
                "one or more scopes are invalid",
                redirect_uri,
                response_mode,
                state,
            ));
        }
        if !scope_validator.are_scopes_allowed(&client, &requested_scopes) {
            return Err(AuthorizeError::client(
                "invalid_scope",
                "one or more scopes are not allowed for this client",
                redirect_uri,
                response_mode,
                state,
            ));
        }

        let is_open_id_request = scope_validator.contains_identity_scopes;
        let includes_resource_scopes = scope_validator.contains_resource_scopes;

        if is_open_id_request && !requested_scopes.iter().any(|s| s == "openid") {
            return Err(AuthorizeError::client(
                "invalid_scope",
                "identity scopes require the openid scope",
                redirect_uri,
                response_mode,
                state,
            ));
        }
        if response_type.includes_id_token() && !is_open_id_request {
            return Err(AuthorizeError::client(
                "invalid_scope",
                "an identity token requires the openid scope",
                redirect_uri,
                response_mode,
                state,
            ));
        }

        let scopes = scope_validator.resolve(&requested_scopes);

        // 5. Authentication.
        let prompt = request.prompt.as_deref();
        let Some(subject) = context.subject.clone() else {
            if prompt == Some("none") {
                return Err(AuthorizeError::client(
                    "interaction_required",
                    "the user must authenticate",
                    redirect_uri,
                    response_mode,
                    state,
                ));
            }
            return Ok(AuthorizeOutcome::LoginRequired);
        };
        if prompt == Some("login") {
            return Ok(AuthorizeOutcome::LoginRequired);
        }

        // 6. Authentication freshness.
        if let Some(max_age) = request.max_age {
            let age = subject.auth_age_seconds();
            if age < 0 || u64::try_from(age).is_ok_and(|age| age > max_age) {
                return Ok(AuthorizeOutcome::LoginRequired);
            }
        }

        let validated = ValidatedAuthorizeRequest {
            client,
            subject,
            redirect_uri: redirect_uri.to_string(),
            response_type,
            flow,
            requested_scopes,
            scopes,
            state,
            nonce: request.nonce.clone(),
            response_mode,
            is_open_id_request,
            includes_resource_scopes,
        };

        // 7. Consent.
        let needs_consent = prompt == Some("consent")
            || self
                .consent
                .requires_consent(&validated.client, &validated.subject, &validated.scopes)
                .await
                .map_err(|_| AuthorizeError::user("server_error", "consent lookup failed"))?;
        if needs_consent {
            return Ok(AuthorizeOutcome::ConsentRequired(validated));
        }

        // 8. Done.
        Ok(AuthorizeOutcome::Proceed(validated))
    }
}
