//
//  asc-cli
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # App Store Connect HTTP Client
//!
//! [`AscClient`] executes [`RequestDescriptor`]s against the App Store Connect
//! REST API. It is the only place in the crate that performs HTTP.
//!
//! ## Responsibilities
//!
//! - Signs every API request with a bearer token from a [`TokenProvider`]
//! - Sets `Accept: application/json` (unless the descriptor overrides it) and
//!   `User-Agent: asc/<version>`
//! - Retries idempotent requests on connection failures, 5xx and 429 with
//!   exponential backoff ([`RetryPolicy`]), honoring `Retry-After`
//! - Refreshes the token and retries once on 401, for any method
//! - Bounds the whole exchange, retries included, by the invocation
//!   [`Deadline`], and individual pages by an optional page timeout
//! - Downloads CDN assets without the bearer token
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use asc_cli::api::{AscClient, RequestDescriptor};
//! use asc_cli::auth::StaticToken;
//!
//! # async fn demo() -> Result<(), asc_cli::AscError> {
//! let client = AscClient::new(Arc::new(StaticToken::new("token")))?;
//! let app = client.send(&RequestDescriptor::get("/v1/apps/1234567890")).await?;
//! println!("{:?}", app.single().and_then(|a| a.attr_str("name")));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Client;
use url::Url;

use super::common::{decode_error_items, decode_response, Document};
use super::debug;
use super::request::RequestDescriptor;
use super::retry::{is_retryable_status, retry_after, RetryPolicy};
use crate::auth::{AuthError, TokenProvider};
use crate::context::Deadline;
use crate::error::AscError;
use crate::util::format_duration;

/// Production API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com";

/// Hosts a `links.next` URL may point at besides the configured base URL.
pub const KNOWN_HOSTS: &[&str] = &["api.appstoreconnect.apple.com"];

/// A response as it came off the wire.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as a JSON:API document, mapping error statuses onto
    /// the error taxonomy.
    pub fn into_document(self) -> Result<Document, AscError> {
        decode_response(self.status, retry_after(&self.headers), &self.body)
    }

    /// Passes a 2xx response through untouched; maps anything else onto the
    /// error taxonomy.
    pub fn error_for_status(self) -> Result<Self, AscError> {
        if self.is_success() {
            return Ok(self);
        }
        decode_response(self.status, retry_after(&self.headers), &self.body)?;
        Err(AscError::Internal(format!("unexpected status {}", self.status)))
    }
}

/// Authenticated App Store Connect client.
///
/// Cloning is cheap: the connection pool and token provider are shared.
#[derive(Clone)]
pub struct AscClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
    api_debug: bool,
    deadline: Option<Deadline>,
}

impl std::fmt::Debug for AscClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AscClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .field("api_debug", &self.api_debug)
            .finish_non_exhaustive()
    }
}

impl AscClient {
    /// Creates a client for the production API.
    ///
    /// # Errors
    ///
    /// Returns [`AscError::Transport`] if the TLS backend cannot be initialized.
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Result<Self, AscError> {
        let http = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(AscError::transport)?;

        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|e| AscError::Internal(format!("invalid default base URL: {e}")))?;

        Ok(Self {
            http,
            base_url,
            tokens,
            retry: RetryPolicy::default(),
            api_debug: false,
            deadline: None,
        })
    }

    /// Points the client at another origin. Used by tests and `--base-url`.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, AscError> {
        self.base_url = Url::parse(base_url)
            .map_err(|e| AscError::usage(format!("invalid base URL {base_url:?}: {e}")))?;
        Ok(self)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enables request/response tracing under the `asc::http` target.
    pub fn with_api_debug(mut self, enabled: bool) -> Self {
        self.api_debug = enabled;
        self
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Executes a request and decodes the JSON:API response.
    pub async fn send(&self, req: &RequestDescriptor) -> Result<Document, AscError> {
        self.execute(req).await?.into_document()
    }

    /// Like [`send`](Self::send) with a per-request timeout.
    pub async fn send_with_timeout(
        &self,
        req: &RequestDescriptor,
        timeout: Option<Duration>,
    ) -> Result<Document, AscError> {
        self.execute_with_timeout(req, timeout).await?.into_document()
    }

    /// Executes a request and returns the raw response, whatever its status.
    pub async fn execute(&self, req: &RequestDescriptor) -> Result<RawResponse, AscError> {
        self.execute_with_timeout(req, None).await
    }

    /// Executes a request with an optional per-request timeout.
    ///
    /// A per-request timeout surfaces as [`AscError::Transport`]; the
    /// invocation deadline surfaces as [`AscError::Cancelled`].
    pub async fn execute_with_timeout(
        &self,
        req: &RequestDescriptor,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, AscError> {
        let work = self.execute_with_retries(req, timeout);
        match &self.deadline {
            Some(deadline) => deadline.run(work).await,
            None => work.await,
        }
    }

    async fn execute_with_retries(
        &self,
        req: &RequestDescriptor,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, AscError> {
        let url = req.url(&self.base_url)?;
        let idempotent = req.is_idempotent();
        let mut attempt: u32 = 0;
        let mut refreshed = false;

        loop {
            attempt += 1;
            let token = self.tokens.token().await?;

            match self.send_once(req, &url, &token, timeout).await {
                Ok(response) if response.status == 401 => {
                    if refreshed {
                        let items = decode_error_items(401, &response.body);
                        let detail = items
                            .first()
                            .and_then(|item| item.detail.clone().or_else(|| item.title.clone()))
                            .unwrap_or_else(|| "401 Unauthorized".to_string());
                        return Err(AuthError::Rejected(detail).into());
                    }
                    tracing::debug!("401 from {}; refreshing token", url.path());
                    self.tokens.invalidate().await;
                    refreshed = true;
                    attempt -= 1;
                }
                Ok(response)
                    if idempotent
                        && is_retryable_status(response.status)
                        && self.retry.should_retry(attempt) =>
                {
                    let wait = self.retry.delay_for(attempt, retry_after(&response.headers));
                    tracing::debug!(
                        "{} {} returned {}; retry {} in {}",
                        req.method,
                        url.path(),
                        response.status,
                        attempt,
                        format_duration(wait)
                    );
                    tokio::time::sleep(wait).await;
                }
                Ok(response) => return Ok(response),
                Err(err) if idempotent && is_transient(&err) && self.retry.should_retry(attempt) => {
                    let wait = self.retry.delay_for(attempt, None);
                    tracing::debug!(
                        "{} {} failed ({err}); retry {} in {}",
                        req.method,
                        url.path(),
                        attempt,
                        format_duration(wait)
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(
        &self,
        req: &RequestDescriptor,
        url: &Url,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, AscError> {
        let mut builder = self
            .http
            .request(req.method.clone(), url.clone())
            .header(ACCEPT, req.accept.as_deref().unwrap_or("application/json"))
            .bearer_auth(token);

        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let request = builder.build().map_err(AscError::transport)?;
        self.dispatch(request, timeout).await
    }

    async fn dispatch(
        &self,
        request: reqwest::Request,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, AscError> {
        if self.api_debug {
            debug::log_request(&request);
        }

        let started = Instant::now();
        let map_err = |err: reqwest::Error| match timeout {
            Some(budget) if err.is_timeout() => AscError::timeout(budget),
            _ => AscError::transport(err),
        };

        let response = self.http.execute(request).await.map_err(map_err)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_err)?.to_vec();

        if self.api_debug {
            debug::log_response(status, &headers, &body, started.elapsed());
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Downloads a CDN asset.
    ///
    /// No bearer token is sent. A 403 is retried once after a short pause,
    /// since the asset CDN returns transient 403s.
    pub async fn download_asset(&self, url: &str) -> Result<Vec<u8>, AscError> {
        let parsed = Url::parse(url)
            .map_err(|e| AscError::validation(format!("invalid asset URL {url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "https" | "http") {
            return Err(AscError::validation(format!("unsupported asset URL scheme in {url:?}")));
        }

        let work = async {
            let mut retried = false;
            loop {
                let request = self
                    .http
                    .get(parsed.clone())
                    .build()
                    .map_err(AscError::transport)?;
                let response = self.dispatch(request, None).await?;

                if response.status == 403 && !retried {
                    retried = true;
                    let wait = self.retry.delay_for(1, None);
                    tracing::debug!("asset download returned 403; retrying in {}", format_duration(wait));
                    tokio::time::sleep(wait).await;
                    continue;
                }

                return Ok(response.error_for_status()?.body);
            }
        };

        match &self.deadline {
            Some(deadline) => deadline.run(work).await,
            None => work.await,
        }
    }
}

fn is_transient(err: &AscError) -> bool {
    match err {
        AscError::Transport {
            source: Some(source),
            ..
        } => source.is_connect() || (source.is_request() && !source.is_timeout()),
        _ => false,
    }
}
