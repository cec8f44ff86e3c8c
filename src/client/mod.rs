//! Request dispatcher for the Browse API.
//!
//! This module provides the main entry point [`BrowseClient`]. A call to
//! [`BrowseClient::execute`] validates every parameter set, obtains an
//! application token, and sends the requests in token-sized batches:
//!
//! 1. the batch size is the request budget of the current token
//! 2. requests inside a batch run concurrently and all settle before the
//!    next batch starts
//! 3. a new token is obtained before every further batch
//!
//! # Example
//!
//! ```no_run
//! use browse_batch::{BrowseClient, Environment, GetItemParams};
//! use browse_batch::api::Operation;
//!
//! # async fn example() -> browse_batch::Result<()> {
//! let client = BrowseClient::from_env(Environment::Sandbox)?;
//!
//! let item = client
//!     .execute_one(Operation::GetItem, GetItemParams::new("v1|110552191234|0").into_params())
//!     .await?;
//! println!("{:?}", item.all_items().first().and_then(|i| i.title.as_deref()));
//! # Ok(())
//! # }
//! ```

mod batch;
mod config;
mod http;

pub use batch::{batch_ranges, ResponseEnvelope};
pub use config::{ClientConfig, PUBLIC_DATA_SCOPE, REQUEST_TIMEOUT};
pub use http::BrowseClient;
