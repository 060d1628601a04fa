//! Domain types for the identity provider core.

pub mod client;
pub mod context;
pub mod grant;
pub mod scope;
pub mod token;

pub use client::{Client, Flow, SigningKeyType};
pub use context::{RequestContext, Subject};
pub use grant::{AuthorizationCode, RefreshGrant, generate_handle, hash_secret};
pub use scope::{Scope, ScopeKind};
pub use token::{Token, TokenClaims, TokenKind};
