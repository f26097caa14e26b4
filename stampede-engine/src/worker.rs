//! Virtual-user workers
//!
//! A worker owns one pooled HTTP client and executes the request/think-time
//! loop for the virtual users assigned to it. The `running` flag is flipped
//! only by the orchestrator; the worker reads it between iterations.

use chrono::Utc;
use stampede_config::domains::http::HttpClientConfig;
use stampede_core::{LoadTestConfig, RequestMetrics};
use stampede_http::PooledClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::EngineError;

/// Per-user request context
///
/// Carries the caller-supplied bearer token injected verbatim into the
/// `Authorization` header of every request the user issues.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub auth_token: Option<String>,
}

/// A labeled worker executing virtual-user sessions
pub struct VirtualUserWorker {
    id: String,
    region: String,
    http_config: HttpClientConfig,
    client: RwLock<Option<PooledClient>>,
    running: AtomicBool,
}

impl VirtualUserWorker {
    pub fn new(id: String, region: String, http_config: HttpClientConfig) -> Self {
        Self {
            id,
            region,
            http_config,
            client: RwLock::new(None),
            running: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Flip the running flag; only the orchestrator calls this.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Acquire the pooled connection resource. Idempotent; must complete
    /// before any request is executed.
    pub fn initialize(&self) -> Result<(), EngineError> {
        let mut guard = self
            .client
            .write()
            .map_err(|_| EngineError::WorkerError(format!("{}: client lock poisoned", self.id)))?;
        if guard.is_none() {
            debug!("Initializing worker {} in region {}", self.id, self.region);
            *guard = Some(PooledClient::new(&self.http_config)?);
        }
        Ok(())
    }

    /// Release the pooled connection resource. Safe to call repeatedly.
    pub fn cleanup(&self) {
        if let Ok(mut guard) = self.client.write() {
            if guard.take().is_some() {
                debug!("Worker {} released its connection pool", self.id);
            }
        }
    }

    /// Issue one request on behalf of a virtual user.
    ///
    /// Never fails: transport errors, timeouts, and a missing pool all come
    /// back as a failed metric with `status_code == 0`.
    pub async fn execute_request(
        &self,
        config: &LoadTestConfig,
        ctx: &UserContext,
    ) -> RequestMetrics {
        let client = match self.client.read() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        };

        let Some(client) = client else {
            return RequestMetrics {
                timestamp: Utc::now(),
                response_time_ms: 0.0,
                status_code: 0,
                error: Some(format!("worker {} not initialized", self.id)),
                bytes_sent: 0,
                bytes_received: 0,
                worker_id: self.id.clone(),
            };
        };

        let outcome = client.execute(config, ctx.auth_token.as_deref()).await;

        RequestMetrics {
            timestamp: Utc::now(),
            response_time_ms: outcome.response_time_ms,
            status_code: outcome.status_code,
            error: outcome.error,
            bytes_sent: outcome.bytes_sent,
            bytes_received: outcome.bytes_received,
            worker_id: self.id.clone(),
        }
    }

    /// Request/think-time loop for one virtual user.
    ///
    /// Runs until the worker's running flag drops or the token is cancelled.
    /// Cancellation discards any in-flight request without emitting a
    /// metric. A closed collector is the only unexpected failure mode; it is
    /// logged and retried after a short back-off rather than ending the
    /// session.
    pub async fn run_user_session(
        &self,
        config: &LoadTestConfig,
        user_id: u32,
        ctx: UserContext,
        emitter: mpsc::UnboundedSender<RequestMetrics>,
        cancel: CancellationToken,
        error_backoff: Duration,
    ) {
        debug!("User {} session starting on worker {}", user_id, self.id);

        while self.is_running() {
            let metrics = tokio::select! {
                _ = cancel.cancelled() => break,
                metrics = self.execute_request(config, &ctx) => metrics,
            };

            if emitter.send(metrics).is_err() {
                warn!(
                    "User {} on worker {}: metrics collector closed, backing off",
                    user_id, self.id
                );
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(error_backoff) => {}
                }
                continue;
            }

            if config.think_time_seconds > 0.0 {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs_f64(config.think_time_seconds)) => {}
                }
            }
        }

        debug!("User {} session on worker {} finished", user_id, self.id);
    }
}
