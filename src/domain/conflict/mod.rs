//! Conflict detection domain module
//!
//! Static, pre-flight validation over whole registration sets.

mod detector;

pub use detector::{Conflict, ConflictDetector, ConflictError};
