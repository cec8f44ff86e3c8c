//! OAuth2 client-credentials authentication.
//!
//! The Browse API accepts application access tokens obtained through the
//! client-credentials grant:
//!
//! ```text
//! POST /identity/v1/oauth2/token
//! Authorization: Basic base64(app_id:cert_id)
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=client_credentials&scope=https%3A%2F%2Fapi.ebay.com%2Foauth%2Fapi_scope
//! ```
//!
//! The reply carries `access_token` and `expires_in` (seconds). From the
//! validity window the [`TokenManager`] derives a request budget: how many
//! calls can be issued before the token could expire if each one ran into
//! the full per-call timeout.

mod token;

pub use token::{Token, TokenManager};
