//! Error types for the Browse API client.
//!
//! Failures fall into two classes. Fatal errors ([`Error::Param`],
//! [`Error::Method`], [`Error::Auth`]) mean the whole `execute` call cannot
//! succeed and are always raised. Item errors (timeouts, connection failures,
//! bad URIs, unexpected content types, undecodable bodies) belong to a single
//! request and may be captured in place when suppression is enabled.

use serde_json::Value;
use thiserror::Error;

/// A specialized `Result` type for Browse API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for all Browse API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid constructor field, missing required operation field or bad verb
    #[error("Invalid parameter: {0}")]
    Param(String),

    /// Operation name is not one of the supported Browse API methods
    #[error("This method is not supported: {0}")]
    Method(String),

    /// Token exchange failed or produced an unusable token
    #[error("OAuth error: {message}")]
    Auth {
        /// What went wrong
        message: String,
        /// Raw token endpoint response for diagnostics
        body: Value,
    },

    /// Request URL could not be built
    #[error("{message}: {uri}")]
    InvalidUri {
        /// Human-readable description
        message: String,
        /// The offending URI
        uri: String,
    },

    /// Per-call timeout elapsed
    #[error("Timeout occurred: {uri}")]
    Timeout {
        /// URI of the request that timed out
        uri: String,
    },

    /// Connection refused, reset or dropped by the server
    #[error("{message}: {uri}")]
    Connection {
        /// Human-readable description
        message: String,
        /// URI of the failed request
        uri: String,
    },

    /// Response carried a content type other than JSON
    #[error("Response has unexpected mime type {content_type:?}: {uri}")]
    MimeType {
        /// Content type reported by the server, if any
        content_type: Option<String>,
        /// URI of the request
        uri: String,
    },

    /// JSON body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn auth(message: impl Into<String>, body: Value) -> Self {
        Error::Auth {
            message: message.into(),
            body,
        }
    }

    pub(crate) fn invalid_uri(err: url::ParseError, uri: &str) -> Self {
        Error::InvalidUri {
            message: format!("Invalid uri ({err})"),
            uri: uri.to_string(),
        }
    }

    /// Map a transport failure onto the taxonomy.
    ///
    /// `reqwest` errors never escape this crate.
    pub(crate) fn from_transport(err: reqwest::Error, uri: &str) -> Self {
        let uri = uri.to_string();

        if err.is_timeout() {
            Error::Timeout { uri }
        } else if err.is_builder() {
            Error::InvalidUri {
                message: "Invalid uri".to_string(),
                uri,
            }
        } else if err.is_connect() {
            Error::Connection {
                message: "Connection error".to_string(),
                uri,
            }
        } else if err.is_body() || err.is_decode() {
            Error::Connection {
                message: "Server disconnected".to_string(),
                uri,
            }
        } else {
            Error::Connection {
                message: format!("Request failed ({err})"),
                uri,
            }
        }
    }

    /// Returns `true` if this error aborts the whole `execute` call
    /// regardless of suppression.
    ///
    /// # Example
    ///
    /// ```
    /// use browse_batch::Error;
    ///
    /// assert!(Error::Param("marketplace_id".into()).is_fatal());
    /// assert!(!Error::Timeout { uri: "https://example.com".into() }.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Param(_) | Error::Method(_) | Error::Auth { .. })
    }

    /// Returns `true` if this error belongs to a single request and can be
    /// captured when suppression is enabled.
    pub fn is_item_error(&self) -> bool {
        !self.is_fatal()
    }

    /// Returns `true` if this is a token exchange failure.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }

    /// Returns `true` if the request never produced a usable HTTP exchange.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Connection { .. } | Error::InvalidUri { .. }
        )
    }

    /// URI of the request that failed, for item errors that carry one.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Error::InvalidUri { uri, .. }
            | Error::Timeout { uri }
            | Error::Connection { uri, .. }
            | Error::MimeType { uri, .. } => Some(uri),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::Param("limit".into()).is_fatal());
        assert!(Error::Method("buy_item".into()).is_fatal());
        assert!(Error::auth("missing access_token", Value::Null).is_fatal());

        let timeout = Error::Timeout {
            uri: "https://api.sandbox.ebay.com".into(),
        };
        assert!(!timeout.is_fatal());
        assert!(timeout.is_item_error());
        assert!(timeout.is_transport_error());
    }

    #[test]
    fn test_mime_type_is_item_error_not_transport() {
        let err = Error::MimeType {
            content_type: Some("text/html".into()),
            uri: "https://api.sandbox.ebay.com/buy/browse/v1/item/1".into(),
        };
        assert!(err.is_item_error());
        assert!(!err.is_transport_error());
        assert_eq!(
            err.uri(),
            Some("https://api.sandbox.ebay.com/buy/browse/v1/item/1")
        );
    }

    #[test]
    fn test_auth_error_keeps_body() {
        let body = serde_json::json!({"error": "invalid_client"});
        match Error::auth("token response missing access_token", body.clone()) {
            Error::Auth { message, body: raw } => {
                assert!(message.contains("access_token"));
                assert_eq!(raw, body);
            }
            other => panic!("Expected Auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_url_parse_maps_to_invalid_uri() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err = Error::invalid_uri(parse_err, "not a url");
        assert!(matches!(err, Error::InvalidUri { .. }));
        assert_eq!(err.uri(), Some("not a url"));
    }
}
