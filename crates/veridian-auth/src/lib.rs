//! # veridian-auth
//!
//! Core engine of the Veridian identity provider: an OAuth 2.0
//! authorization server with OpenID Connect identity tokens.
//!
//! This crate provides:
//! - Authorization endpoint validation and response generation
//!   (code, implicit, and hybrid flows)
//! - Token endpoint with authorization code, refresh token,
//!   client credentials, and resource owner password grants
//! - JWT identity tokens (HS256 per-client secrets or RS256 provider keys)
//!   and opaque reference access tokens
//! - Single-use authorization codes and rotating refresh tokens
//!
//! Persistence is abstracted behind the traits in [`storage`]; the
//! `veridian-store-memory` crate ships an in-memory implementation.
//!
//! ## Modules
//!
//! - [`config`] - Issuer identity and token lifetime configuration
//! - [`oauth`] - Authorization and token endpoint protocol engine
//! - [`token`] - Token construction and JWT signing
//! - [`scopes`] - Scope parsing and validation against the catalog
//! - [`claims`] - Pluggable claims resolution for issued tokens
//! - [`storage`] - Storage traits for clients, scopes, and grants
//! - [`types`] - Domain types shared across the crate
//! - [`users`] - Resource owner credential validation
//! - [`events`] - Protocol event notifications

pub mod claims;
pub mod config;
pub mod error;
pub mod events;
pub mod oauth;
pub mod scopes;
pub mod storage;
pub mod token;
pub mod types;
pub mod users;

pub use claims::{ClaimsProvider, DefaultClaimsProvider};
pub use config::{IdpConfig, OAuthConfig, SigningConfig};
pub use error::{AuthError, ErrorCategory};
pub use events::{AuthEvent, EventSink, TracingEventSink};
pub use scopes::{ScopeValidator, parse_scopes};
pub use users::UserService;

/// Result type used throughout the crate.
pub type AuthResult<T> = Result<T, AuthError>;
