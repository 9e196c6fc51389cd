//! Boolean-flag selection provider

use async_trait::async_trait;
use std::sync::Arc;

use super::context::SelectionContext;
use super::provider::{FlagSource, SelectionProvider};
use crate::domain::registration::TrialKey;

/// Maps an external on/off flag to the fixed trial keys `"true"`/`"false"`
#[derive(Debug)]
pub struct BooleanFlagProvider {
    source: Arc<dyn FlagSource>,
}

impl BooleanFlagProvider {
    /// Create a provider over a flag source
    pub fn new(source: Arc<dyn FlagSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl SelectionProvider for BooleanFlagProvider {
    async fn select_trial_key(
        &self,
        context: &SelectionContext,
    ) -> Result<Option<TrialKey>, anyhow::Error> {
        let enabled = self.source.is_enabled(context.selector_name()).await?;
        let key = if enabled { "true" } else { "false" };
        Ok(Some(TrialKey::new(key)?))
    }
}
