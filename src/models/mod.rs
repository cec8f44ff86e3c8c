//! Data models for the Browse API client.
//!
//! - [`primitives`] - `Environment`, `Marketplace`, `ItemId`
//! - [`credentials`] - validated application credentials and context header
//! - [`params`] - per-request parameter sets and typed builders
//! - [`response`] - normalized replies

pub mod primitives;
pub mod credentials;
pub mod params;
pub mod response;

pub use primitives::*;
pub use credentials::*;
pub use params::*;
pub use response::*;
