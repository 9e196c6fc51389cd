//! Selection provider contracts
//!
//! A provider picks at most one preferred trial key per call. Any empty,
//! missing, or failed result is interpreted uniformly by the router as "use
//! the default key" before the error-policy cascade is built.

use async_trait::async_trait;
use std::fmt::Debug;

use super::context::SelectionContext;
use crate::domain::registration::{ServiceTypeId, TrialKey};

/// Picks the preferred trial key for a call.
///
/// Implementations may suspend (remote flag lookups); the router awaits the
/// result before any candidate attempt starts.
#[async_trait]
pub trait SelectionProvider: Send + Sync + Debug {
    async fn select_trial_key(
        &self,
        context: &SelectionContext,
    ) -> Result<Option<TrialKey>, anyhow::Error>;
}

/// External on/off source backing the boolean-flag strategy
#[async_trait]
pub trait FlagSource: Send + Sync + Debug {
    async fn is_enabled(&self, flag_name: &str) -> Result<bool, anyhow::Error>;
}

/// External string-value source backing the configuration-value strategy
#[async_trait]
pub trait ConfigSource: Send + Sync + Debug {
    async fn get_value(&self, key: &str) -> Result<Option<String>, anyhow::Error>;
}

/// How a registration's selector name is derived from its service type when
/// not set explicitly
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamingConvention {
    /// The service type ID verbatim
    #[default]
    AsIs,
    /// A fixed prefix before the service type ID
    Prefixed(String),
    /// A fixed suffix after the service type ID
    Suffixed(String),
}

/// Derive the default selector name for a service type
pub fn default_selector_name(
    service_type: &ServiceTypeId,
    convention: &NamingConvention,
) -> String {
    match convention {
        NamingConvention::AsIs => service_type.as_str().to_string(),
        NamingConvention::Prefixed(prefix) => format!("{prefix}{service_type}"),
        NamingConvention::Suffixed(suffix) => format!("{service_type}{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selector_name_conventions() {
        let service_type = ServiceTypeId::new("pricing").unwrap();

        assert_eq!(
            default_selector_name(&service_type, &NamingConvention::AsIs),
            "pricing"
        );
        assert_eq!(
            default_selector_name(
                &service_type,
                &NamingConvention::Prefixed("trials.".to_string())
            ),
            "trials.pricing"
        );
        assert_eq!(
            default_selector_name(
                &service_type,
                &NamingConvention::Suffixed(".trial".to_string())
            ),
            "pricing.trial"
        );
    }
}
