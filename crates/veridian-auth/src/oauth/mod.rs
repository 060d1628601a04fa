//! OAuth 2.0 / OpenID Connect protocol engine.
//!
//! This module implements both protocol endpoints end to end:
//!
//! - Authorization endpoint: [`validator`] checks the incoming request and
//!   decides whether login or consent is still needed, [`response`] mints
//!   the code and front-channel tokens.
//! - Token endpoint: [`client_auth`] authenticates the caller,
//!   [`token_validator`] runs the per-grant state machines, and
//!   [`token_response`] produces the wire response.
//!
//! # Authorization Code Flow
//!
//! ```ignore
//! use veridian_auth::oauth::{
//!     AuthorizeOutcome, AuthorizeRequestValidator, AuthorizeResponseGenerator,
//! };
//!
//! let outcome = validator.validate(&request, &context).await?;
//! if let AuthorizeOutcome::Proceed(validated) = outcome {
//!     let response = generator.process(&validated).await?;
//!     let redirect = response.to_redirect_url()?;
//! }
//! ```

pub mod authorize;
pub mod client_auth;
pub mod consent;
pub mod response;
pub mod token;
pub mod token_response;
pub mod token_validator;
pub mod validator;

// Authorization endpoint types
pub use authorize::{
    AuthorizeError, AuthorizeErrorKind, AuthorizeRequest, AuthorizeResponse, ResponseMode,
    ResponseType,
};

// Authorization endpoint services
pub use consent::{ConsentService, DefaultConsentService};
pub use response::AuthorizeResponseGenerator;
pub use validator::{AuthorizeOutcome, AuthorizeRequestValidator, ValidatedAuthorizeRequest};

// Token endpoint types
pub use token::{GrantType, TokenError, TokenErrorCode, TokenRequest, TokenResponse};

// Token endpoint services
pub use client_auth::{
    AuthenticatedClient, TokenEndpointAuthMethod, authenticate_client, parse_basic_auth,
};
pub use token_response::TokenResponseGenerator;
pub use token_validator::{TokenRequestValidator, ValidatedTokenRequest};
