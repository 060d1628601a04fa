//! In-memory storage backend for the Veridian identity provider.
//!
//! This crate implements the storage traits from `veridian-auth` on top of
//! `dashmap` concurrent hash maps. It is intended for tests, demos, and
//! single-node deployments that can tolerate losing grants on restart.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use veridian_store_memory::{
//!     InMemoryClientStore, InMemoryCodeStore, InMemoryRefreshTokenStore,
//!     InMemoryScopeStore, InMemoryTokenHandleStore,
//! };
//!
//! let clients = Arc::new(InMemoryClientStore::with_clients(registrations));
//! let scopes = Arc::new(InMemoryScopeStore::with_scopes(catalog));
//! let codes = Arc::new(InMemoryCodeStore::new(config.oauth.authorization_code_lifetime));
//! ```

pub mod clients;
pub mod grants;
pub mod scopes;

pub use clients::InMemoryClientStore;
pub use grants::{InMemoryCodeStore, InMemoryRefreshTokenStore, InMemoryTokenHandleStore};
pub use scopes::InMemoryScopeStore;
