//! Application token exchange and request budgeting.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::models::Credentials;
use crate::{Error, Result};

const GRANT_TYPE: &str = "client_credentials";

/// A bearer token from the client-credentials exchange.
///
/// Tokens are never updated in place; a refresh produces a new `Token`.
pub struct Token {
    bearer: SecretString,
    valid_for: Duration,
    issued_at: DateTime<Utc>,
}

impl Token {
    pub(crate) fn new(bearer: impl Into<String>, valid_for: Duration) -> Self {
        Self {
            bearer: SecretString::from(bearer.into()),
            valid_for,
            issued_at: Utc::now(),
        }
    }

    /// How long the token is valid after issue.
    pub fn valid_for(&self) -> Duration {
        self.valid_for
    }

    /// When the token was received.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the token stops being valid.
    pub fn expires_at(&self) -> DateTime<Utc> {
        let secs = self.valid_for.as_secs().min(u64::from(u32::MAX));
        self.issued_at + chrono::Duration::seconds(secs as i64)
    }

    /// Check if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at()
    }

    pub(crate) fn bearer(&self) -> &str {
        self.bearer.expose_secret()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("bearer", &"[REDACTED]")
            .field("valid_for", &self.valid_for)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Exchanges credentials for application tokens and sizes batches.
///
/// A `TokenManager` holds its own HTTP session for the token endpoint and
/// keeps no token state; callers own the tokens it returns.
pub struct TokenManager<'a> {
    http: reqwest::Client,
    credentials: &'a Credentials,
    auth_url: &'a str,
    scope: &'a str,
    timeout_ceiling: Duration,
}

impl<'a> TokenManager<'a> {
    pub(crate) fn new(
        http: reqwest::Client,
        credentials: &'a Credentials,
        auth_url: &'a str,
        scope: &'a str,
        timeout_ceiling: Duration,
    ) -> Self {
        Self {
            http,
            credentials,
            auth_url,
            scope,
            timeout_ceiling,
        }
    }

    /// Perform a client-credentials exchange.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the reply lacks `access_token` or
    /// `expires_in`, carrying the raw reply. Transport failures map to their
    /// usual kinds.
    pub async fn authenticate(&self) -> Result<Token> {
        let form = format!(
            "grant_type={}&scope={}",
            GRANT_TYPE,
            urlencoding::encode(self.scope)
        );

        let response = self
            .http
            .post(self.auth_url)
            .header(
                AUTHORIZATION,
                self.credentials.basic_authorization().expose_secret(),
            )
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|err| Error::from_transport(err, self.auth_url))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| Error::from_transport(err, self.auth_url))?;
        let body: Value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        let token = parse_token(&body).ok_or_else(|| {
            Error::auth(
                format!("token exchange failed ({status}): missing access_token or expires_in"),
                body.clone(),
            )
        })?;

        debug!(
            status,
            valid_for_secs = token.valid_for.as_secs(),
            "application token issued"
        );
        Ok(token)
    }

    /// Number of requests that can be issued under `token` before it could
    /// expire, assuming every call takes the full timeout ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the budget is zero.
    pub fn budget(&self, token: &Token) -> Result<usize> {
        request_budget(token.valid_for, self.timeout_ceiling)
    }
}

fn parse_token(body: &Value) -> Option<Token> {
    let access_token = body.get("access_token")?.as_str()?;
    let expires_in = body.get("expires_in")?.as_u64()?;
    Some(Token::new(access_token, Duration::from_secs(expires_in)))
}

/// `floor(valid_for / timeout_ceiling)`, rejecting zero.
pub(crate) fn request_budget(valid_for: Duration, timeout_ceiling: Duration) -> Result<usize> {
    let ceiling = timeout_ceiling.as_millis();
    if ceiling == 0 {
        return Err(Error::Param("request timeout must be non-zero".to_string()));
    }

    let budget = usize::try_from(valid_for.as_millis() / ceiling).unwrap_or(usize::MAX);
    if budget == 0 {
        return Err(Error::auth(
            format!(
                "token valid for {}s is shorter than the {}s request timeout",
                valid_for.as_secs(),
                timeout_ceiling.as_secs()
            ),
            Value::Null,
        ));
    }
    Ok(budget)
}
