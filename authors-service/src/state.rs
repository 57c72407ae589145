//! Application state management

use std::sync::Arc;

use crate::config::Config;

/// Application state shared across handlers
///
/// Generic over the Data Store so the same router serves the in-memory and
/// the PostgreSQL backends.
pub struct AppState<S> {
    config: Arc<Config>,
    store: Arc<S>,
}

// Manual impl: cloning shares the Arcs and must not require `S: Clone`
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> AppState<S> {
    /// Create a new AppState from configuration and a store
    pub fn new(config: Config, store: S) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the Data Store
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryAuthorStore;

    #[test]
    fn test_clone_shares_store() {
        let state = AppState::new(Config::default(), InMemoryAuthorStore::new());
        let cloned = state.clone();
        assert!(std::ptr::eq(state.store(), cloned.store()));
        assert_eq!(cloned.config().service.name, "authors-service");
    }
}
