//! Storage traits for identity provider data.
//!
//! This module defines the repository interfaces the core validates and
//! issues against:
//!
//! - OAuth client registrations
//! - The scope catalog
//! - Authorization codes (single-use), reference token handles, and
//!   refresh grants
//!
//! # Implementations
//!
//! Reference in-memory implementations live in the `veridian-store-memory`
//! crate. Production deployments supply their own backends; timeout and
//! retry policy belong to the implementation, never to the validators.

pub mod client;
pub mod grant;
pub mod scope;

pub use client::ClientStore;
pub use grant::{AuthorizationCodeStore, RefreshTokenStore, TokenHandleStore};
pub use scope::ScopeStore;
