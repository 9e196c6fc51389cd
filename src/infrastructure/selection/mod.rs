//! Selection infrastructure - concrete flag/config sources

mod in_memory;

pub use in_memory::{InMemoryConfigSource, InMemoryFlagSource};
