//! HTTP client implementation for the Browse API.

use std::sync::Arc;

use futures_util::future::{join_all, try_join_all};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_CHARSET, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{Operation, PreparedRequest};
use crate::auth::{Token, TokenManager};
use crate::models::{BrowseResponse, Credentials, Params};
use crate::{Environment, Error, Result};

use super::batch::{next_batch, ResponseEnvelope};
use super::config::ClientConfig;

const MARKETPLACE_HEADER: &str = "x-ebay-c-marketplace-id";
const END_USER_CONTEXT_HEADER: &str = "x-ebay-c-enduserctx";

/// Batched client for the Browse API.
///
/// The client holds only validated credentials and configuration. Every
/// [`execute`](Self::execute) call opens its own sessions and obtains its
/// own tokens, so concurrent calls on one client (or its clones) never share
/// token state.
///
/// # Example
///
/// ```no_run
/// use browse_batch::{BrowseClient, Credentials, SearchParams};
///
/// # async fn example() -> browse_batch::Result<()> {
/// let credentials = Credentials::new("app-id", "cert-id", "EBAY_US")?;
/// let client = BrowseClient::new(credentials)?;
///
/// let params = vec![
///     SearchParams::keywords("nikon f3").limit(10).into_params(),
///     SearchParams::keywords("canon ae-1").limit(10).into_params(),
/// ];
///
/// for envelope in client.execute("search", params, true).await? {
///     match envelope.response() {
///         Some(response) => println!("#{}: {} matches", envelope.index(), response.total_count()),
///         None => println!("#{} failed: {:?}", envelope.index(), envelope.error()),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct BrowseClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    credentials: Credentials,
    config: ClientConfig,
}

impl BrowseClient {
    /// Create a client with the default configuration.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client with a custom configuration.
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        // Fail on unusable header values now rather than on the first call
        default_headers(&credentials)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                credentials,
                config,
            }),
        })
    }

    /// Create a client from `EBAY_*` environment variables.
    pub fn from_env(env: Environment) -> Result<Self> {
        let credentials = Credentials::from_env(env)?;
        Self::with_config(credentials, ClientConfig::default().with_environment(env))
    }

    /// Get the credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Run `operation` once per parameter set.
    ///
    /// Requests are sent in batches no larger than the request budget of the
    /// token valid at batch start; a fresh token is obtained before each
    /// further batch. Requests inside a batch run concurrently. The result
    /// is index-aligned with `params`.
    ///
    /// With `suppress_item_errors`, per-request failures (timeouts,
    /// connection errors, unexpected content types) are captured in place.
    /// Without it, the first such failure aborts the call.
    ///
    /// # Errors
    ///
    /// - [`Error::Method`] for an unknown operation name
    /// - [`Error::Param`] for an invalid parameter set (before any network call)
    /// - [`Error::Auth`] for a failed token exchange or a zero request budget
    /// - any item error when `suppress_item_errors` is `false`
    pub async fn execute(
        &self,
        operation: &str,
        params: Vec<Params>,
        suppress_item_errors: bool,
    ) -> Result<Vec<ResponseEnvelope>> {
        let operation: Operation = operation.parse()?;
        self.execute_operation(operation, params, suppress_item_errors)
            .await
    }

    /// Like [`execute`](Self::execute), with an already-resolved operation.
    pub async fn execute_operation(
        &self,
        operation: Operation,
        params: Vec<Params>,
        suppress_item_errors: bool,
    ) -> Result<Vec<ResponseEnvelope>> {
        let requests = params
            .iter()
            .map(|p| operation.prepare(p))
            .collect::<Result<Vec<PreparedRequest>>>()?;

        let inner = &self.inner;
        let transport = Transport::open(&inner.credentials, &inner.config)?;
        let token_url = inner.config.token_url();
        let tokens = TokenManager::new(
            auth_session(&inner.config)?,
            &inner.credentials,
            &token_url,
            &inner.config.scope,
            inner.config.request_timeout,
        );

        let mut token = tokens.authenticate().await?;
        let mut envelopes = Vec::with_capacity(requests.len());
        let mut start = 0;
        let mut batch_number = 0;

        while start < requests.len() {
            let budget = tokens.budget(&token)?;
            let range = next_batch(start, requests.len(), budget);
            info!(
                operation = %operation,
                batch = batch_number,
                size = range.len(),
                budget,
                "dispatching batch"
            );

            let batch = &requests[range.clone()];
            let current = &token;
            let session = &transport;

            if suppress_item_errors {
                let calls = batch.iter().enumerate().map(|(offset, request)| {
                    let index = range.start + offset;
                    async move { (index, session.send(request, current).await) }
                });

                for (index, outcome) in join_all(calls).await {
                    match outcome {
                        Err(err) if err.is_fatal() => return Err(err),
                        Err(err) => {
                            warn!(index, error = %err, "captured item failure");
                            envelopes.push(ResponseEnvelope::new(index, Err(err)));
                        }
                        Ok(response) => envelopes.push(ResponseEnvelope::new(index, Ok(response))),
                    }
                }
            } else {
                let calls = batch.iter().map(|request| session.send(request, current));
                let responses = try_join_all(calls).await.map_err(|err| {
                    warn!(operation = %operation, batch = batch_number, error = %err, "aborting call");
                    err
                })?;

                envelopes.extend(responses.into_iter().enumerate().map(|(offset, response)| {
                    ResponseEnvelope::new(range.start + offset, Ok(response))
                }));
            }

            start = range.end;
            batch_number += 1;

            if start < requests.len() {
                token = tokens.authenticate().await?;
            }
        }

        debug!(operation = %operation, responses = envelopes.len(), "call complete");
        Ok(envelopes)
    }

    /// Run `operation` for a single parameter set without suppression.
    pub async fn execute_one(&self, operation: Operation, params: Params) -> Result<BrowseResponse> {
        self.execute_operation(operation, vec![params], false)
            .await?
            .pop()
            .ok_or_else(|| Error::Param("no response for a single request".to_string()))?
            .into_result()
    }
}

/// Session for Browse API calls, bound to the credentials' headers.
///
/// Dropping it releases its connections.
struct Transport {
    http: reqwest::Client,
    browse_url: String,
}

impl Transport {
    fn open(credentials: &Credentials, config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .default_headers(default_headers(credentials)?)
            .build()
            .map_err(|err| Error::from_transport(err, &config.browse_url()))?;

        Ok(Self {
            http,
            browse_url: config.browse_url(),
        })
    }

    async fn send(&self, request: &PreparedRequest, token: &Token) -> Result<BrowseResponse> {
        let uri = format!("{}{}", self.browse_url, request.path);
        let url = Url::parse(&uri).map_err(|err| Error::invalid_uri(err, &uri))?;

        let mut builder = match request.method {
            Method::GET => self.http.get(url),
            Method::POST => self.http.post(url),
            ref other => return Err(Error::Param(format!("request_type {other}"))),
        };
        builder = builder.bearer_auth(token.bearer());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| Error::from_transport(err, &uri))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        if !content_type.as_deref().is_some_and(is_json) {
            return Err(Error::MimeType { content_type, uri });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| Error::from_transport(err, &uri))?;
        let raw: Value = serde_json::from_slice(&bytes)?;

        debug!(operation = %request.operation, status, "response received");
        Ok(BrowseResponse::from_json(request.operation, status, raw))
    }
}

/// Session for the token endpoint.
fn auth_session(config: &ClientConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|err| Error::from_transport(err, &config.token_url()))
}

fn default_headers(credentials: &Credentials) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
    headers.insert(
        HeaderName::from_static(MARKETPLACE_HEADER),
        HeaderValue::from_static(credentials.marketplace().as_str()),
    );

    if let Some(context) = credentials.context_header() {
        headers.insert(
            HeaderName::from_static(END_USER_CONTEXT_HEADER),
            HeaderValue::from_str(context).map_err(|_| {
                Error::Param("affiliate or locale values are not valid header text".to_string())
            })?,
        );
    }

    Ok(headers)
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

impl Clone for BrowseClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for BrowseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowseClient")
            .field("credentials", &self.inner.credentials)
            .field("config", &self.inner.config)
            .finish()
    }
}
