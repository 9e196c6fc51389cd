//! Selection domain module
//!
//! Strategies for picking the preferred trial key for a call: boolean flag,
//! configuration value, sticky hash, and externally registered custom
//! providers.

mod config_value;
mod context;
mod custom;
mod flag;
mod provider;
mod sticky;

pub use config_value::ConfigurationValueProvider;
pub use context::SelectionContext;
pub use custom::CustomProviderRegistry;
pub use flag::BooleanFlagProvider;
pub use provider::{
    default_selector_name, ConfigSource, FlagSource, NamingConvention, SelectionProvider,
};
pub use sticky::{StickyProvider, StickyRouter};
