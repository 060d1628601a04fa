//! In-memory client registry.

use async_trait::async_trait;
use dashmap::DashMap;

use veridian_auth::AuthResult;
use veridian_auth::storage::ClientStore;
use veridian_auth::types::{Client, hash_secret};

/// A `ClientStore` backed by a concurrent hash map.
///
/// Registrations are loaded up front; the protocol engine only reads them.
#[derive(Debug, Default)]
pub struct InMemoryClientStore {
    clients: DashMap<String, Client>,
}

impl InMemoryClientStore {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-loaded with the given clients.
    #[must_use]
    pub fn with_clients(clients: Vec<Client>) -> Self {
        let store = Self::new();
        for client in clients {
            store.insert(client);
        }
        store
    }

    /// Registers a client, replacing any previous registration with the
    /// same `client_id`.
    pub fn insert(&self, client: Client) {
        self.clients.insert(client.client_id.clone(), client);
    }
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(client_id).map(|entry| entry.clone()))
    }

    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
        let digest = hash_secret(secret);
        Ok(self
            .clients
            .get(client_id)
            .is_some_and(|entry| entry.client_secrets.contains(&digest)))
    }
}
