//! Authorization endpoint types.
//!
//! Raw request parameters as they arrive on the query string, the
//! validated response artifacts, and the error type. Delivery is
//! data-only: the hosting layer performs the actual 302 redirect or
//! renders the form-post page from the values produced here.
//!
//! Error handling follows the open-redirect rule: an error may only be
//! delivered to the client's redirect URI once the client and the
//! redirect URI have been verified. Until then errors render in-page.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Flow;

/// Raw authorization request parameters, straight off the query string.
///
/// Nothing here is trusted; the validator turns this into a
/// `ValidatedAuthorizeRequest` or an `AuthorizeError`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeRequest {
    /// Requested response type (`code`, `token`, `id_token`, or a
    /// space-separated combination).
    #[serde(default)]
    pub response_type: Option<String>,

    /// Client identifier.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Redirect URI; must exactly match a registered URI.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Requested scopes (space-separated).
    #[serde(default)]
    pub scope: Option<String>,

    /// Opaque client state, echoed back unmodified.
    #[serde(default)]
    pub state: Option<String>,

    /// OpenID Connect nonce, echoed into the identity token.
    #[serde(default)]
    pub nonce: Option<String>,

    /// Requested response delivery mechanism.
    #[serde(default)]
    pub response_mode: Option<String>,

    /// OpenID Connect prompt parameter (`none`, `login`, `consent`).
    #[serde(default)]
    pub prompt: Option<String>,

    /// Maximum acceptable authentication age in seconds.
    #[serde(default)]
    pub max_age: Option<u64>,

    /// Display hint for the login UI.
    #[serde(default)]
    pub display: Option<String>,

    /// Preferred UI locales.
    #[serde(default)]
    pub ui_locales: Option<String>,
}

/// Parsed `response_type` values and their combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// `code`
    Code,
    /// `token`
    Token,
    /// `id_token`
    IdToken,
    /// `id_token token`
    IdTokenToken,
    /// `code id_token`
    CodeIdToken,
    /// `code token`
    CodeToken,
    /// `code id_token token`
    CodeIdTokenToken,
}

impl ResponseType {
    /// Parses a space-separated `response_type` value. Token order is not
    /// significant.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut code = false;
        let mut token = false;
        let mut id_token = false;
        let mut count = 0usize;

        for part in raw.split_whitespace() {
            count += 1;
            match part {
                "code" if !code => code = true,
                "token" if !token => token = true,
                "id_token" if !id_token => id_token = true,
                _ => return None,
            }
        }

        if count == 0 {
            return None;
        }

        match (code, id_token, token) {
            (true, false, false) => Some(Self::Code),
            (false, false, true) => Some(Self::Token),
            (false, true, false) => Some(Self::IdToken),
            (false, true, true) => Some(Self::IdTokenToken),
            (true, true, false) => Some(Self::CodeIdToken),
            (true, false, true) => Some(Self::CodeToken),
            (true, true, true) => Some(Self::CodeIdTokenToken),
            (false, false, false) => None,
        }
    }

    /// The flow this response type belongs to.
    #[must_use]
    pub fn flow(&self) -> Flow {
        match self {
            Self::Code => Flow::Code,
            Self::Token | Self::IdToken | Self::IdTokenToken => Flow::Implicit,
            Self::CodeIdToken | Self::CodeToken | Self::CodeIdTokenToken => Flow::Hybrid,
        }
    }

    /// Whether an authorization code is part of the response.
    #[must_use]
    pub fn includes_code(&self) -> bool {
        matches!(
            self,
            Self::Code | Self::CodeIdToken | Self::CodeToken | Self::CodeIdTokenToken
        )
    }

    /// Whether an access token is part of the response.
    #[must_use]
    pub fn includes_token(&self) -> bool {
        matches!(
            self,
            Self::Token | Self::IdTokenToken | Self::CodeToken | Self::CodeIdTokenToken
        )
    }

    /// Whether an identity token is part of the response.
    #[must_use]
    pub fn includes_id_token(&self) -> bool {
        matches!(
            self,
            Self::IdToken | Self::IdTokenToken | Self::CodeIdToken | Self::CodeIdTokenToken
        )
    }

    /// Canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
            Self::IdToken => "id_token",
            Self::IdTokenToken => "id_token token",
            Self::CodeIdToken => "code id_token",
            Self::CodeToken => "code token",
            Self::CodeIdTokenToken => "code id_token token",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response delivery mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Parameters in the redirect URI query string.
    Query,
    /// Parameters in the redirect URI fragment.
    Fragment,
    /// Parameters POSTed by an auto-submitting form.
    FormPost,
}

impl ResponseMode {
    /// Parses a `response_mode` parameter value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "query" => Some(Self::Query),
            "fragment" => Some(Self::Fragment),
            "form_post" => Some(Self::FormPost),
            _ => None,
        }
    }

    /// The default mode for a response type: query for the pure code flow,
    /// fragment whenever tokens travel in the front channel.
    #[must_use]
    pub fn default_for(response_type: ResponseType) -> Self {
        match response_type {
            ResponseType::Code => Self::Query,
            _ => Self::Fragment,
        }
    }

    /// Canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Fragment => "fragment",
            Self::FormPost => "form_post",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A successful authorization response.
///
/// Access tokens are always opaque reference handles here; a JWT never
/// travels in a front-channel URI.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeResponse {
    /// Verified client redirect URI.
    pub redirect_uri: String,

    /// How the parameters are delivered.
    pub response_mode: ResponseMode,

    /// Authorization code (code and hybrid flows).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Signed identity token (implicit and hybrid flows).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Reference access token handle (implicit and hybrid flows).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Access token lifetime in seconds, present alongside `access_token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Echoed client state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthorizeResponse {
    /// The name/value pairs of the response, in emission order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(ref code) = self.code {
            fields.push(("code", code.clone()));
        }
        if let Some(ref id_token) = self.id_token {
            fields.push(("id_token", id_token.clone()));
        }
        if let Some(ref access_token) = self.access_token {
            fields.push(("access_token", access_token.clone()));
            fields.push(("token_type", "Bearer".to_string()));
        }
        if let Some(expires_in) = self.expires_in {
            fields.push(("expires_in", expires_in.to_string()));
        }
        if let Some(ref state) = self.state {
            fields.push(("state", state.clone()));
        }
        fields
    }

    /// Builds the redirect URL, placing parameters in the query string or
    /// the fragment according to the response mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URI does not parse. The validator
    /// guarantees registered URIs parse, so this indicates misregistration.
    pub fn to_redirect_url(&self) -> Result<String, url::ParseError> {
        build_redirect_url(&self.redirect_uri, self.response_mode, &self.fields())
    }

    /// The name/value pairs for an auto-submitting `form_post` page.
    #[must_use]
    pub fn form_post_fields(&self) -> Vec<(&'static str, String)> {
        self.fields()
    }
}

/// Whether an authorization error may be delivered by redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizeErrorKind {
    /// The client or redirect URI could not be verified: render in-page,
    /// never redirect.
    User,
    /// The client and redirect URI are verified: deliver by redirect.
    Client,
}

/// An authorization endpoint error.
#[derive(Debug, Clone)]
pub struct AuthorizeError {
    /// Redirect-safe or not.
    pub kind: AuthorizeErrorKind,

    /// OAuth 2.0 error code.
    pub error: &'static str,

    /// Human-readable description.
    pub description: Option<String>,

    /// Verified redirect URI (`Client` kind only).
    pub redirect_uri: Option<String>,

    /// Delivery mode for redirectable errors.
    pub response_mode: ResponseMode,

    /// Echoed client state.
    pub state: Option<String>,
}

impl AuthorizeError {
    /// An error that must render in-page because the client or redirect
    /// URI is unverified.
    #[must_use]
    pub fn user(error: &'static str, description: impl Into<String>) -> Self {
        Self {
            kind: AuthorizeErrorKind::User,
            error,
            description: Some(description.into()),
            redirect_uri: None,
            response_mode: ResponseMode::Query,
            state: None,
        }
    }

    /// An error deliverable to the verified redirect URI.
    #[must_use]
    pub fn client(
        error: &'static str,
        description: impl Into<String>,
        redirect_uri: impl Into<String>,
        response_mode: ResponseMode,
        state: Option<String>,
    ) -> Self {
        Self {
            kind: AuthorizeErrorKind::Client,
            error,
            description: Some(description.into()),
            redirect_uri: Some(redirect_uri.into()),
            response_mode,
            state,
        }
    }

    /// Whether the hosting layer may redirect this error to the client.
    #[must_use]
    pub fn is_redirectable(&self) -> bool {
        self.kind == AuthorizeErrorKind::Client && self.redirect_uri.is_some()
    }

    /// Builds the error redirect URL. Returns `None` for in-page errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the verified redirect URI does not parse.
    pub fn to_redirect_url(&self) -> Result<Option<String>, url::ParseError> {
        let Some(ref redirect_uri) = self.redirect_uri else {
            return Ok(None);
        };
        if self.kind != AuthorizeErrorKind::Client {
            return Ok(None);
        }

        let mut fields: Vec<(&'static str, String)> = vec![("error", self.error.to_string())];
        if let Some(ref description) = self.description {
            fields.push(("error_description", description.clone()));
        }
        if let Some(ref state) = self.state {
            fields.push(("state", state.clone()));
        }

        build_redirect_url(redirect_uri, self.response_mode, &fields).map(Some)
    }
}

impl fmt::Display for AuthorizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description {
            Some(ref description) => write!(f, "{}: {}", self.error, description),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for AuthorizeError {}

fn build_redirect_url(
    redirect_uri: &str,
    mode: ResponseMode,
    fields: &[(&'static str, String)],
) -> Result<String, url::ParseError> {
    let mut url = url::Url::parse(redirect_uri)?;
    match mode {
        ResponseMode::Query => {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in fields {
                pairs.append_pair(name, value);
            }
            drop(pairs);
        }
        // form_post falls back to fragment if the hosting layer asks for a
        // URL anyway; the token never lands in a server log this way.
        ResponseMode::Fragment | ResponseMode::FormPost => {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            for (name, value) in fields {
                serializer.append_pair(name, value);
            }
            url.set_fragment(Some(&serializer.finish()));
        }
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_response_types() {
        assert_eq!(ResponseType::parse("code"), Some(ResponseType::Code));
        assert_eq!(ResponseType::parse("token"), Some(ResponseType::Token));
        assert_eq!(ResponseType::parse("id_token"), Some(ResponseType::IdToken));
        assert_eq!(
            ResponseType::parse("id_token token"),
            Some(ResponseType::IdTokenToken)
        );
        assert_eq!(
            ResponseType::parse("code id_token"),
            Some(ResponseType::CodeIdToken)
        );
        assert_eq!(
            ResponseType::parse("code id_token token"),
            Some(ResponseType::CodeIdTokenToken)
        );
        // Order is not significant.
        assert_eq!(
            ResponseType::parse("token id_token code"),
            Some(ResponseType::CodeIdTokenToken)
        );

        assert_eq!(ResponseType::parse(""), None);
        assert_eq!(ResponseType::parse("code code"), None);
        assert_eq!(ResponseType::parse("nonsense"), None);
    }

    #[test]
    fn response_type_maps_to_flow() {
        assert_eq!(ResponseType::Code.flow(), Flow::Code);
        assert_eq!(ResponseType::Token.flow(), Flow::Implicit);
        assert_eq!(ResponseType::IdTokenToken.flow(), Flow::Implicit);
        assert_eq!(ResponseType::CodeIdToken.flow(), Flow::Hybrid);
    }

    #[test]
    fn default_response_mode() {
        assert_eq!(
            ResponseMode::default_for(ResponseType::Code),
            ResponseMode::Query
        );
        assert_eq!(
            ResponseMode::default_for(ResponseType::IdTokenToken),
            ResponseMode::Fragment
        );
        assert_eq!(
            ResponseMode::default_for(ResponseType::CodeIdToken),
            ResponseMode::Fragment
        );
    }

    #[test]
    fn code_response_uses_query() {
        let response = AuthorizeResponse {
            redirect_uri: "https://client.example.com/cb".to_string(),
            response_mode: ResponseMode::Query,
            code: Some("abc123".to_string()),
            id_token: None,
            access_token: None,
            expires_in: None,
            state: Some("xyz".to_string()),
        };

        let url = response.to_redirect_url().unwrap();
        assert_eq!(url, "https://client.example.com/cb?code=abc123&state=xyz");
    }

    #[test]
    fn implicit_response_uses_fragment() {
        let response = AuthorizeResponse {
            redirect_uri: "https://client.example.com/cb".to_string(),
            response_mode: ResponseMode::Fragment,
            code: None,
            id_token: Some("jwt".to_string()),
            access_token: Some("handle".to_string()),
            expires_in: Some(3600),
            state: Some("xyz".to_string()),
        };

        let url = response.to_redirect_url().unwrap();
        assert_eq!(
            url,
            "https://client.example.com/cb#id_token=jwt&access_token=handle&token_type=Bearer&expires_in=3600&state=xyz"
        );
    }

    #[test]
    fn form_post_fields_cover_all_artifacts() {
        let response = AuthorizeResponse {
            redirect_uri: "https://client.example.com/cb".to_string(),
            response_mode: ResponseMode::FormPost,
            code: Some("abc".to_string()),
            id_token: Some("jwt".to_string()),
            access_token: None,
            expires_in: None,
            state: None,
        };

        let fields = response.form_post_fields();
        assert_eq!(
            fields,
            vec![
                ("code", "abc".to_string()),
                ("id_token", "jwt".to_string())
            ]
        );
    }

    #[test]
    fn user_errors_never_redirect() {
        let error = AuthorizeError::user("invalid_request", "client_id is missing");
        assert!(!error.is_redirectable());
        assert_eq!(error.to_redirect_url().unwrap(), None);
    }

    #[test]
    fn client_errors_redirect_with_state() {
        let error = AuthorizeError::client(
            "interaction_required",
            "user must authenticate",
            "https://client.example.com/cb",
            ResponseMode::Query,
            Some("xyz".to_string()),
        );

        assert!(error.is_redirectable());
        let url = error.to_redirect_url().unwrap().unwrap();
        assert!(url.starts_with("https://client.example.com/cb?error=interaction_required"));
        assert!(url.contains("state=xyz"));
    }
}
