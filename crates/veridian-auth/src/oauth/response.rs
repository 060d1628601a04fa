//! Authorization response generation.
//!
//! Turns a validated authorize request into the artifacts the client gets
//! back: an authorization code, a signed identity token, a reference access
//! token handle, or a combination, depending on the response type.
//!
//! Tokens delivered through the front channel are kept small and safe: the
//! identity token travels as a signed JWT, the access token only ever as an
//! opaque reference handle.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::AuthResult;
use crate::events::{AuthEvent, EventSink};
use crate::oauth::authorize::AuthorizeResponse;
use crate::oauth::validator::ValidatedAuthorizeRequest;
use crate::storage::{AuthorizationCodeStore, TokenHandleStore};
use crate::token::jwt::SigningKeyProvider;
use crate::token::service::{TokenCreationRequest, TokenService};
use crate::types::AuthorizationCode;

/// Generates authorization endpoint responses.
pub struct AuthorizeResponseGenerator {
    token_service: Arc<TokenService>,
    code_store: Arc<dyn AuthorizationCodeStore>,
    handle_store: Arc<dyn TokenHandleStore>,
    key_provider: Arc<dyn SigningKeyProvider>,
    events: Arc<dyn EventSink>,
}

impl AuthorizeResponseGenerator {
    /// Creates a new response generator.
    #[must_use]
    pub fn new(
        token_service: Arc<TokenService>,
        code_store: Arc<dyn AuthorizationCodeStore>,
        handle_store: Arc<dyn TokenHandleStore>,
        key_provider: Arc<dyn SigningKeyProvider>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            token_service,
            code_store,
            handle_store,
            key_provider,
            events,
        }
    }

    /// Produces the response for a validated request.
    ///
    /// Code and hybrid flows mint both tokens up front and embed them in
    /// the stored code; the token endpoint later hands them out without
    /// re-running claims resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if token creation, signing, or storage fails.
    pub async fn process(
        &self,
        request: &ValidatedAuthorizeRequest,
    ) -> AuthResult<AuthorizeResponse> {
        let creation = TokenCreationRequest::from(request);
        let identity_token = self.token_service.create_identity_token(&creation).await?;
        let access_token = self.token_service.create_access_token(&creation).await?;

        let mut response = AuthorizeResponse {
            redirect_uri: request.redirect_uri.clone(),
            response_mode: request.response_mode,
            code: None,
            id_token: None,
            access_token: None,
            expires_in: None,
            state: request.state.clone(),
        };

        if request.response_type.includes_code() {
            let code = AuthorizationCode {
                client_id: request.client.client_id.clone(),
                redirect_uri: request.redirect_uri.clone(),
                requested_scopes: request.requested_scopes.clone(),
                created_at: OffsetDateTime::now_utc(),
                identity_token: identity_token.clone(),
                access_token: access_token.clone(),
            };
            let handle = self.code_store.store(code).await?;
            response.code = Some(handle);

            self.events.on_event(&AuthEvent::AuthorizationCodeIssued {
                client_id: request.client.client_id.clone(),
                subject: request.subject.id.clone(),
            });
        }

        if request.response_type.includes_id_token() {
            let jwt = self
                .token_service
                .create_json_web_token(&identity_token, &request.client, &*self.key_provider)
                .await?;
            response.id_token = Some(jwt);
        }

        if request.response_type.includes_token() {
            let expires_in = access_token.lifetime;
            let handle = self.handle_store.store(access_token).await?;
            response.access_token = Some(handle);
            response.expires_in = Some(expires_in);
        }

        if response.id_token.is_some() || response.access_token.is_some() {
            self.events.on_event(&AuthEvent::TokensIssued {
                client_id: request.client.client_id.clone(),
                subject: request.subject.id.clone(),
                flow: request.flow,
            });
        }

        Ok(response)
    }
}
