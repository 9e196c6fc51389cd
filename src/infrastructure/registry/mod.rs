//! Registration registry infrastructure

mod in_memory;

pub use in_memory::{InMemoryRegistrationRegistry, RoutingService};
