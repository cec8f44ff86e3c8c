//! # browse-batch
//!
//! A rate-aware batched client for the eBay Browse API.
//!
//! The Browse API is protected by OAuth2 application tokens with a finite
//! validity window. This crate takes an arbitrary number of parameter sets
//! for one operation, sizes batches so that no token can expire while its
//! batch is in flight, runs each batch concurrently and returns one result
//! slot per input, in input order.
//!
//! ## Features
//!
//! - **Validated credentials**: marketplace, affiliate and locale context are
//!   checked once, before any network traffic
//! - **Token budgeting**: batch size is `floor(token validity / per-call timeout)`
//! - **Six operations**: `search`, `search_by_image`, `get_item`,
//!   `get_item_by_legacy_id`, `get_items_by_item_group`, `check_compatibility`
//! - **Suppression mode**: capture per-request failures in place instead of
//!   aborting the whole call
//! - **Typed replies**: item summaries, totals and remote warnings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use browse_batch::{BrowseClient, Credentials, SearchParams};
//!
//! #[tokio::main]
//! async fn main() -> browse_batch::Result<()> {
//!     let credentials = Credentials::builder("app-id", "cert-id")
//!         .marketplace("EBAY_US")
//!         .locale("US", "19406")
//!         .build()?;
//!     let client = BrowseClient::new(credentials)?;
//!
//!     let queries = ["leica m6", "hasselblad 500cm", "mamiya rz67"];
//!     let params = queries
//!         .iter()
//!         .map(|q| SearchParams::keywords(*q).limit(25).into_params())
//!         .collect();
//!
//!     for envelope in client.execute("search", params, true).await? {
//!         if let Some(response) = envelope.response() {
//!             println!("{}: {} listings", queries[envelope.index()], response.total_count());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export primary types at crate root for convenience
pub use error::{Error, Result};
pub use models::{
    BrowseResponse, CompatibilityParams, Credentials, CredentialsBuilder, Environment,
    GetItemParams, ItemGroupParams, ItemId, ItemSummary, LegacyItemParams, Marketplace, Params,
    SearchByImageParams, SearchParams,
};
pub use client::{BrowseClient, ClientConfig, ResponseEnvelope};

/// Prelude module for convenient imports.
///
/// ```rust
/// use browse_batch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::Operation;
    pub use crate::client::{BrowseClient, ClientConfig, ResponseEnvelope};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        Environment, ItemId, Marketplace,
        // Inputs
        CompatibilityParams, Credentials, GetItemParams, ItemGroupParams, LegacyItemParams,
        Params, SearchByImageParams, SearchParams,
        // Replies
        Amount, ApiMessage, BrowseResponse, ItemSummary,
    };
}
