//! Registry for externally supplied custom selection providers

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::provider::SelectionProvider;

/// Custom selection providers keyed by mode identifier.
///
/// Registrations using `SelectionMode::Custom { mode_id }` are routed
/// through the provider registered under that identifier. An unknown
/// identifier simply yields no provider; the router then falls back to the
/// default key.
#[derive(Debug, Default)]
pub struct CustomProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn SelectionProvider>>>,
}

impl CustomProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under a mode identifier, replacing any previous
    /// provider for that identifier
    pub fn register(&self, mode_id: impl Into<String>, provider: Arc<dyn SelectionProvider>) {
        let mode_id = mode_id.into();
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(mode_id, provider);
    }

    /// Look up the provider for a mode identifier
    pub fn get(&self, mode_id: &str) -> Option<Arc<dyn SelectionProvider>> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(mode_id)
            .cloned()
    }
}
