//! Browse API operation registry.
//!
//! Maps each supported method name to request construction: verb, path
//! and query or body shape. Construction is pure and runs for every
//! parameter set before any network call is made.

mod operations;

pub use operations::{Operation, PreparedRequest};
