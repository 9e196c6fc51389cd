//! Configuration-value selection provider

use async_trait::async_trait;
use std::sync::Arc;

use super::context::SelectionContext;
use super::provider::{ConfigSource, SelectionProvider};
use crate::domain::registration::TrialKey;

/// Reads the preferred trial key as a string configuration value.
///
/// A missing or empty value means "no preference"; a non-empty value that is
/// not a valid trial key surfaces as an error, which the router maps to the
/// default key like any other provider failure.
#[derive(Debug)]
pub struct ConfigurationValueProvider {
    source: Arc<dyn ConfigSource>,
}

impl ConfigurationValueProvider {
    /// Create a provider over a configuration source
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl SelectionProvider for ConfigurationValueProvider {
    async fn select_trial_key(
        &self,
        context: &SelectionContext,
    ) -> Result<Option<TrialKey>, anyhow::Error> {
        let value = self.source.get_value(context.selector_name()).await?;

        match value {
            None => Ok(None),
            Some(raw) => {
                let trimmed = raw.trim();

                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(TrialKey::new(trimmed)?))
                }
            }
        }
    }
}
