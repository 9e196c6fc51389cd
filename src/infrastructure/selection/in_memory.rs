//! In-memory flag and configuration sources
//!
//! For tests and single-process deployments; production deployments plug in
//! sources backed by their own flag/config systems.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::domain::selection::{ConfigSource, FlagSource};

/// In-memory flag source
#[derive(Debug, Default)]
pub struct InMemoryFlagSource {
    flags: RwLock<HashMap<String, bool>>,
}

impl InMemoryFlagSource {
    /// Create an empty flag source
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag value
    pub fn set_flag(&self, name: impl Into<String>, enabled: bool) {
        self.flags
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), enabled);
    }

    /// Remove a flag
    pub fn clear_flag(&self, name: &str) {
        self.flags
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

#[async_trait]
impl FlagSource for InMemoryFlagSource {
    async fn is_enabled(&self, flag_name: &str) -> Result<bool, anyhow::Error> {
        let flags = self.flags.read().unwrap_or_else(PoisonError::into_inner);
        Ok(flags.get(flag_name).copied().unwrap_or(false))
    }
}

/// In-memory configuration source
#[derive(Debug, Default)]
pub struct InMemoryConfigSource {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryConfigSource {
    /// Create an empty configuration source
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set_value(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// Remove a configuration value
    pub fn clear_value(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

#[async_trait]
impl ConfigSource for InMemoryConfigSource {
    async fn get_value(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }
}
