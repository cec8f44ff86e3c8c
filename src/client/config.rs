//! Client configuration options.

use std::time::Duration;

use crate::{Environment, Error, Result};

/// Per-call timeout ceiling. Also the divisor of the request budget.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OAuth scope for public Browse API data.
pub const PUBLIC_DATA_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

const BROWSE_PATH: &str = "/buy/browse/v1";
const TOKEN_PATH: &str = "/identity/v1/oauth2/token";

/// Configuration for the Browse API client.
///
/// # Example
///
/// ```
/// use browse_batch::{ClientConfig, Environment};
///
/// let config = ClientConfig::default()
///     .with_environment(Environment::Production)
///     .with_user_agent("price-research/1.0");
///
/// assert_eq!(config.browse_url(), "https://api.ebay.com/buy/browse/v1");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Which eBay hosts to use
    pub environment: Environment,
    /// Total timeout of each call, and the budget ceiling
    pub request_timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// OAuth scope requested in the token exchange
    pub scope: String,
    /// Override of the Browse API base URL (including `/buy/browse/v1`)
    pub api_base_url: Option<String>,
    /// Override of the token endpoint URL
    pub auth_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            request_timeout: REQUEST_TIMEOUT,
            user_agent: format!("browse-batch/{} (Rust)", env!("CARGO_PKG_VERSION")),
            scope: PUBLIC_DATA_SCOPE.to_string(),
            api_base_url: None,
            auth_url: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the per-call timeout.
    ///
    /// Shorter timeouts increase the request budget of each token.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the OAuth scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Send Browse API calls to a different base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Send the token exchange to a different URL.
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    /// Browse API base URL without a trailing slash.
    pub fn browse_url(&self) -> String {
        match &self.api_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{}{}", self.environment.api_base_url(), BROWSE_PATH),
        }
    }

    /// Token endpoint URL.
    pub fn token_url(&self) -> String {
        match &self.auth_url {
            Some(url) => url.clone(),
            None => format!("{}{}", self.environment.api_base_url(), TOKEN_PATH),
        }
    }

    /// Check the configuration for values that make batching impossible.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::Param("request_timeout must be non-zero".to_string()));
        }
        if self.scope.is_empty() {
            return Err(Error::Param("scope must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(
            config.browse_url(),
            "https://api.sandbox.ebay.com/buy/browse/v1"
        );
        assert_eq!(
            config.token_url(),
            "https://api.sandbox.ebay.com/identity/v1/oauth2/token"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::new()
            .with_api_base_url("http://127.0.0.1:8080/buy/browse/v1/")
            .with_auth_url("http://127.0.0.1:8080/token");
        assert_eq!(config.browse_url(), "http://127.0.0.1:8080/buy/browse/v1");
        assert_eq!(config.token_url(), "http://127.0.0.1:8080/token");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ClientConfig::default().with_request_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::Param(_))));
    }
}
