//! In-memory scope catalog.

use async_trait::async_trait;
use dashmap::DashMap;

use veridian_auth::AuthResult;
use veridian_auth::storage::ScopeStore;
use veridian_auth::types::Scope;

/// A `ScopeStore` backed by a concurrent hash map.
#[derive(Debug, Default)]
pub struct InMemoryScopeStore {
    scopes: DashMap<String, Scope>,
}

impl InMemoryScopeStore {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-loaded with the given scopes.
    #[must_use]
    pub fn with_scopes(scopes: Vec<Scope>) -> Self {
        let store = Self::new();
        for scope in scopes {
            store.insert(scope);
        }
        store
    }

    /// Adds a scope to the catalog, replacing any entry with the same name.
    pub fn insert(&self, scope: Scope) {
        self.scopes.insert(scope.name.clone(), scope);
    }
}

#[async_trait]
impl ScopeStore for InMemoryScopeStore {
    async fn find_by_names(&self, names: &[String]) -> AuthResult<Vec<Scope>> {
        Ok(names
            .iter()
            .filter_map(|name| self.scopes.get(name).map(|entry| entry.clone()))
            .collect())
    }

    async fn all(&self) -> AuthResult<Vec<Scope>> {
        Ok(self.scopes.iter().map(|entry| entry.clone()).collect())
    }
}
