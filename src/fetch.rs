//! Shared HTTP fetch client.
//!
//! One connection-pooled client serves every adapter, with an identifying
//! User-Agent, a per-request timeout, and bounded crate-wide concurrency.
//! Transient statuses (429, 500, 502, 503, 504) are retried with
//! exponential backoff; any other non-2xx fails immediately as `Http`.
//! Network-level failures surface as `Network` without retry.
//!
//! The transport is a seam: production uses [`HttpTransport`] over
//! `reqwest`, tests inject a fake that counts attempts.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::debug;

use crate::config::PollConfig;
use crate::error::FetchError;

/// Statuses worth a retry: rate limiting and transient upstream failures.
const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// Extra attempts after the first, per request.
const MAX_RETRIES: u32 = 2;

/// Backoff base; the delay is `BACKOFF_BASE * 2^attempt`.
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Raw response handed back by a transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RawResponse, FetchError>> + Send + 'a>>;

/// Minimal GET transport. The retry policy lives above this seam, so a
/// fake transport sees every individual attempt.
pub trait Transport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str, timeout: Duration) -> TransportFuture<'a>;
}

/// Production transport over a shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &PollConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/geo+json"));

        let client = reqwest::Client::builder()
            .user_agent(config.contact.clone())
            .default_headers(headers)
            .pool_max_idle_per_host(config.pool_size)
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, url: &'a str, timeout: Duration) -> TransportFuture<'a> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .timeout(timeout)
                .send()
                .await
                .map_err(network_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(network_error)?;
            Ok(RawResponse { status, body })
        })
    }
}

fn network_error(err: reqwest::Error) -> FetchError {
    FetchError::Network(err.to_string())
}

/// Connection-pooled fetch client shared by all adapters.
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn Transport>,
    permits: Arc<Semaphore>,
    default_timeout: Duration,
}

impl FetchClient {
    /// Create a client backed by the real HTTP transport.
    pub fn new(config: &PollConfig) -> anyhow::Result<Self> {
        Ok(Self::with_transport(
            Arc::new(HttpTransport::new(config)?),
            config,
        ))
    }

    /// Create a client over an arbitrary transport (for testing).
    pub fn with_transport(transport: Arc<dyn Transport>, config: &PollConfig) -> Self {
        Self {
            transport,
            permits: Arc::new(Semaphore::new(config.max_concurrency)),
            default_timeout: config.request_timeout,
        }
    }

    /// GET a URL and return the response body.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::Network("fetch pool closed".to_string()))?;

        let mut attempt = 0u32;
        loop {
            let response = self.transport.get(url, self.default_timeout).await?;
            if (200..300).contains(&response.status) {
                return Ok(response.body);
            }
            if RETRYABLE_STATUS.contains(&response.status) && attempt < MAX_RETRIES {
                let delay = BACKOFF_BASE * 2u32.pow(attempt);
                debug!(
                    url,
                    status = response.status,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "transient status, backing off"
                );
                sleep(delay).await;
                attempt += 1;
                continue;
            }
            return Err(FetchError::Http {
                status: response.status,
            });
        }
    }

    /// GET a URL and deserialize the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Scripted transport for tests: per-URL response queues, with the
    /// last entry repeating once the queue drains. Unrouted URLs answer
    /// 404. Every attempt is counted, retries included.
    #[derive(Default)]
    pub struct FakeTransport {
        routes: Mutex<HashMap<String, Vec<Result<RawResponse, FetchError>>>>,
        hits: Mutex<HashMap<String, u32>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_ok(&self, url: &str, body: &str) {
            self.push(url, Ok(RawResponse {
                status: 200,
                body: body.to_string(),
            }));
        }

        pub fn push_status(&self, url: &str, status: u16) {
            self.push(url, Ok(RawResponse {
                status,
                body: String::new(),
            }));
        }

        pub fn push_network_error(&self, url: &str) {
            self.push(url, Err(FetchError::Network("connection reset".to_string())));
        }

        fn push(&self, url: &str, response: Result<RawResponse, FetchError>) {
            self.routes
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_default()
                .push(response);
        }

        pub fn hits(&self, url: &str) -> u32 {
            self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    impl Transport for FakeTransport {
        fn get<'a>(&'a self, url: &'a str, _timeout: Duration) -> TransportFuture<'a> {
            Box::pin(async move {
                *self
                    .hits
                    .lock()
                    .unwrap()
                    .entry(url.to_string())
                    .or_insert(0) += 1;

                let mut routes = self.routes.lock().unwrap();
                match routes.get_mut(url) {
                    Some(queue) if queue.len() > 1 => queue.remove(0),
                    Some(queue) if queue.len() == 1 => queue[0].clone(),
                    _ => Ok(RawResponse {
                        status: 404,
                        body: String::new(),
                    }),
                }
            })
        }
    }
}
