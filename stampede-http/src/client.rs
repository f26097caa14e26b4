//! Pooled HTTP client implementation

use crate::errors::HttpError;
use crate::types::HttpMethod;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use stampede_config::domains::http::HttpClientConfig;
use stampede_core::LoadTestConfig;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Result of one request attempt, success or failure
///
/// Transport and timeout failures are represented with `status_code == 0`
/// and an error message; the measured duration always covers dispatch
/// through the fully-read body (or the point of failure).
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub status_code: u16,
    pub error: Option<String>,
    pub response_time_ms: f64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl RequestOutcome {
    fn failed(message: impl Into<String>, elapsed: Duration, bytes_sent: u64) -> Self {
        Self {
            status_code: 0,
            error: Some(message.into()),
            response_time_ms: elapsed.as_secs_f64() * 1000.0,
            bytes_sent,
            bytes_received: 0,
        }
    }
}

/// HTTP client backed by a bounded connection pool
///
/// Each virtual-user worker owns exactly one `PooledClient`; the pool is
/// never shared across workers.
#[derive(Debug, Clone)]
pub struct PooledClient {
    client: Client,
    default_timeout: Duration,
}

impl PooledClient {
    /// Build a client from the pool configuration.
    pub fn new(config: &HttpClientConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating pooled HTTP client, timeout {}s, {} idle conns per host",
            config.timeout.as_secs(),
            config.connection_pool.max_idle_per_host
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connection_pool.connection_timeout)
            .pool_max_idle_per_host(config.connection_pool.max_idle_per_host)
            .pool_idle_timeout(config.connection_pool.idle_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            client,
            default_timeout: config.timeout,
        })
    }

    /// Issue one request described by the test plan.
    ///
    /// Never fails: malformed methods or header names, connection errors, and
    /// timeouts all come back as a failed [`RequestOutcome`].
    pub async fn execute(&self, config: &LoadTestConfig, auth_token: Option<&str>) -> RequestOutcome {
        let bytes_sent = config
            .payload
            .as_ref()
            .and_then(|p| serde_json::to_vec(p).ok())
            .map(|b| b.len() as u64)
            .unwrap_or(0);

        let method = match HttpMethod::from_str(&config.method) {
            Ok(method) => method,
            Err(e) => {
                warn!("Rejecting request with invalid method: {}", e);
                return RequestOutcome::failed(e.to_string(), Duration::ZERO, 0);
            }
        };

        let headers = match build_headers(config, auth_token) {
            Ok(headers) => headers,
            Err(e) => {
                warn!("Rejecting request with invalid headers: {}", e);
                return RequestOutcome::failed(e.to_string(), Duration::ZERO, 0);
            }
        };

        let mut request = self
            .client
            .request(method.into(), &config.target_url)
            .headers(headers)
            .timeout(
                config
                    .request_timeout_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(self.default_timeout),
            );

        if let Some(payload) = &config.payload {
            request = request.json(payload);
        }

        debug!("Dispatching {} {}", method, config.target_url);
        let start = Instant::now();

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let elapsed = start.elapsed();
                debug!("Request failed after {:?}: {}", elapsed, e);
                return RequestOutcome::failed(describe_error(&e), elapsed, bytes_sent);
            }
        };

        let status_code = response.status().as_u16();

        // The clock stops only after the body has been fully read
        match response.bytes().await {
            Ok(body) => {
                let elapsed = start.elapsed();
                debug!(
                    "Response {} after {:?}, {} body bytes",
                    status_code,
                    elapsed,
                    body.len()
                );
                RequestOutcome {
                    status_code,
                    error: None,
                    response_time_ms: elapsed.as_secs_f64() * 1000.0,
                    bytes_sent,
                    bytes_received: body.len() as u64,
                }
            }
            Err(e) => {
                let elapsed = start.elapsed();
                debug!("Body read failed after {:?}: {}", elapsed, e);
                RequestOutcome::failed(describe_error(&e), elapsed, bytes_sent)
            }
        }
    }
}

/// Merge plan headers with the optional bearer token.
///
/// A supplied token always wins over an `Authorization` entry in the plan's
/// header map.
fn build_headers(config: &LoadTestConfig, auth_token: Option<&str>) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();

    for (key, value) in &config.headers {
        let name = HeaderName::from_str(key)
            .map_err(|_| HttpError::InvalidHeaderName(key.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| HttpError::InvalidHeaderName(key.to_string()))?;
        headers.insert(name, value);
    }

    if let Some(token) = auth_token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| HttpError::InvalidHeaderName(AUTHORIZATION.to_string()))?;
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
