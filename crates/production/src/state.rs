//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ProductionConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Generic over the store so the router can run
/// against [`crate::db::PgStore`] in production and
/// [`crate::db::MemoryStore`] in tests.
#[derive(Debug)]
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

#[derive(Debug)]
struct AppStateInner<S> {
    config: Option<ProductionConfig>,
    store: S,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> AppState<S> {
    /// Create a new application state.
    pub fn new(config: ProductionConfig, store: S) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config: Some(config),
                store,
            }),
        }
    }

    /// Create a state with no loaded configuration, for tests and tools.
    pub fn with_store(store: S) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config: None,
                store,
            }),
        }
    }

    /// Get the configuration the server was started with, if any.
    #[must_use]
    pub fn config(&self) -> Option<&ProductionConfig> {
        self.inner.config.as_ref()
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }
}
