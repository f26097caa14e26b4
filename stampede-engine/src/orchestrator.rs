//! Load-test orchestration
//!
//! The orchestrator owns the worker pool and runs the three-phase schedule:
//! ramp-up spawns one session task per virtual user at a fixed interval,
//! steady-state holds the full concurrency, ramp-down flips the worker flags
//! and cancels outstanding sessions. Metrics emitted by sessions flow
//! through an mpsc channel into a single collector task, so buffer appends
//! are serialized without the sessions contending on a lock.

use chrono::Utc;
use stampede_config::domains::engine::EngineConfig;
use stampede_config::domains::http::HttpClientConfig;
use stampede_core::{AggregatedMetrics, LoadTestConfig, LoadTestResult, RequestMetrics};
use stampede_metrics::{aggregate_final, aggregate_window, generate_recommendations, performance_score};
use stampede_storage::ResultRepository;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, RwLock as StdRwLock};
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::worker::{UserContext, VirtualUserWorker};

/// Callback invoked with a rolling-window summary during ramp-up
pub type ProgressCallback = Box<dyn Fn(AggregatedMetrics) + Send + Sync>;

/// Orchestrates load-test runs over a pool of virtual-user workers
pub struct LoadTestOrchestrator {
    engine_config: EngineConfig,
    http_config: HttpClientConfig,
    repository: Arc<dyn ResultRepository>,
    workers: StdRwLock<Vec<Arc<VirtualUserWorker>>>,
    next_worker_index: AtomicU32,
    running: AtomicBool,
    active_test: StdRwLock<Option<Uuid>>,
}

impl LoadTestOrchestrator {
    pub fn new(
        engine_config: EngineConfig,
        http_config: HttpClientConfig,
        repository: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            engine_config,
            http_config,
            repository,
            workers: StdRwLock::new(Vec::new()),
            next_worker_index: AtomicU32::new(0),
            running: AtomicBool::new(false),
            active_test: StdRwLock::new(None),
        }
    }

    /// Orchestrator with default engine and HTTP configuration
    pub fn with_defaults(repository: Arc<dyn ResultRepository>) -> Self {
        Self::new(EngineConfig::default(), HttpClientConfig::default(), repository)
    }

    /// Register a worker for the given region.
    ///
    /// Worker ids are `worker-<region>-<index>` with a single orchestrator-
    /// wide monotonically increasing index.
    pub fn add_worker(&self, region: &str) -> Arc<VirtualUserWorker> {
        let index = self.next_worker_index.fetch_add(1, Ordering::SeqCst);
        let id = format!("worker-{}-{}", region, index);
        let worker = Arc::new(VirtualUserWorker::new(
            id.clone(),
            region.to_string(),
            self.http_config.clone(),
        ));

        match self.workers.write() {
            Ok(mut workers) => workers.push(worker.clone()),
            Err(_) => warn!("Worker list lock poisoned; {} not registered", id),
        }

        info!("Registered worker {}", id);
        worker
    }

    /// Whether a run is currently in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Id of the in-progress run, if any
    pub fn active_test(&self) -> Option<Uuid> {
        self.active_test.read().ok().and_then(|guard| *guard)
    }

    /// Run a load test with an empty user context.
    pub async fn run_load_test(
        &self,
        config: LoadTestConfig,
        progress: Option<ProgressCallback>,
    ) -> Result<Uuid, EngineError> {
        self.run_load_test_as(config, UserContext::default(), progress)
            .await
    }

    /// Run a load test, injecting the supplied context (bearer token) into
    /// every virtual-user request.
    ///
    /// The returned id refers to the persisted record; a run that fails
    /// mid-flight still resolves to `Ok` with the record marked `Failed`.
    /// Only a failure to create the record at all is an `Err`.
    pub async fn run_load_test_as(
        &self,
        config: LoadTestConfig,
        ctx: UserContext,
        progress: Option<ProgressCallback>,
    ) -> Result<Uuid, EngineError> {
        let mut record = LoadTestResult::started(config.clone());
        let test_id = record.id;
        self.repository.create(record.clone()).await?;

        self.running.store(true, Ordering::SeqCst);
        if let Ok(mut active) = self.active_test.write() {
            *active = Some(test_id);
        }

        info!(
            "Load test {} ({}) starting: {} users against {}",
            test_id, config.test_name, config.max_users, config.target_url
        );

        // The buffer outlives the phases so a failed run keeps everything
        // collected up to the point of failure.
        let buffer: Arc<RwLock<Vec<RequestMetrics>>> = Arc::new(RwLock::new(Vec::new()));

        let outcome = self
            .execute_phases(&config, ctx, progress, &mut record, buffer.clone())
            .await;

        if let Err(e) = outcome {
            error!("Load test {} failed: {}", test_id, e);
            if record.summary.is_none() {
                let snapshot = buffer.read().await.clone();
                record.summary = Some(aggregate_final(&snapshot, config.max_users));
            }
            record.fail(e.to_string());
            if let Err(update_err) = self.repository.update(record).await {
                warn!(
                    "Could not persist failure for test {}: {}",
                    test_id, update_err
                );
            }
        }

        // Teardown runs regardless of outcome
        if let Ok(workers) = self.workers.read() {
            for worker in workers.iter() {
                worker.set_running(false);
                worker.cleanup();
            }
        }
        self.running.store(false, Ordering::SeqCst);
        if let Ok(mut active) = self.active_test.write() {
            *active = None;
        }

        Ok(test_id)
    }

    /// Ramp-up, steady-state, ramp-down, final aggregation and persistence.
    async fn execute_phases(
        &self,
        config: &LoadTestConfig,
        ctx: UserContext,
        progress: Option<ProgressCallback>,
        record: &mut LoadTestResult,
        buffer: Arc<RwLock<Vec<RequestMetrics>>>,
    ) -> Result<(), EngineError> {
        // A run with no registered workers gets one default worker
        let no_workers = self
            .workers
            .read()
            .map(|w| w.is_empty())
            .unwrap_or(true);
        if no_workers {
            self.add_worker(&self.engine_config.default_region);
        }

        let workers: Vec<Arc<VirtualUserWorker>> = self
            .workers
            .read()
            .map_err(|_| EngineError::InvalidState("worker list lock poisoned".to_string()))?
            .clone();

        for worker in &workers {
            worker.initialize()?;
        }

        // Single collector task serializes all buffer appends
        let (tx, mut rx) = mpsc::unbounded_channel::<RequestMetrics>();
        let collector_buffer = buffer.clone();
        let collector = tokio::spawn(async move {
            while let Some(metrics) = rx.recv().await {
                collector_buffer.write().await.push(metrics);
            }
        });

        let cancel = CancellationToken::new();
        let spawn_interval = config.spawn_interval_seconds();
        let backoff = Duration::from_secs(self.engine_config.session_error_backoff_seconds);
        let mut sessions = Vec::with_capacity(config.max_users as usize);

        info!(
            "Ramp-up: {} users over {}s ({:.2}s apart)",
            config.max_users, config.ramp_up_seconds, spawn_interval
        );

        for user_id in 0..config.max_users {
            let worker = assign_worker(&workers, user_id);
            worker.set_running(true);

            let session_config = config.clone();
            let session_ctx = ctx.clone();
            let session_tx = tx.clone();
            let session_cancel = cancel.child_token();
            sessions.push(tokio::spawn(async move {
                worker
                    .run_user_session(
                        &session_config,
                        user_id,
                        session_ctx,
                        session_tx,
                        session_cancel,
                        backoff,
                    )
                    .await;
            }));

            if spawn_interval > 0.0 {
                sleep(Duration::from_secs_f64(spawn_interval)).await;
            }

            let spawned = user_id + 1;
            if spawned % self.engine_config.progress_every_spawns == 0 {
                if let Some(callback) = &progress {
                    let window_end = Utc::now();
                    let window_start = window_end
                        - chrono::Duration::seconds(
                            self.engine_config.progress_window_seconds as i64,
                        );
                    let snapshot = buffer.read().await.clone();
                    let summary =
                        aggregate_window(&snapshot, window_start, window_end, spawned);
                    debug!(
                        "Progress after {} spawns: {} requests in window",
                        spawned, summary.total_requests
                    );
                    callback(summary);
                }
            }
        }

        let steady = config.steady_state_seconds();
        info!("Steady state for {}s", steady);
        if steady > 0 {
            sleep(Duration::from_secs(steady)).await;
        }

        info!("Ramp-down over {}s", config.ramp_down_seconds);
        for worker in &workers {
            worker.set_running(false);
        }
        cancel.cancel();
        if config.ramp_down_seconds > 0 {
            sleep(Duration::from_secs(config.ramp_down_seconds)).await;
        }

        for session in sessions {
            session
                .await
                .map_err(|e| EngineError::TaskJoinError(e.to_string()))?;
        }

        // All senders gone: the collector drains and exits
        drop(tx);
        collector
            .await
            .map_err(|e| EngineError::TaskJoinError(e.to_string()))?;

        let snapshot = buffer.read().await.clone();
        let summary = aggregate_final(&snapshot, config.max_users);
        let score = performance_score(&config.success_criteria, &summary);
        let recommendations = generate_recommendations(&summary);

        info!(
            "Load test {} finished: {} requests, {:.1}% errors, score {:.0}",
            record.id,
            summary.total_requests,
            summary.error_rate * 100.0,
            score
        );

        record.complete(summary, score, recommendations);
        self.repository.update(record.clone()).await?;
        Ok(())
    }
}

/// Round-robin worker assignment for a virtual user
fn assign_worker(workers: &[Arc<VirtualUserWorker>], user_id: u32) -> Arc<VirtualUserWorker> {
    workers[user_id as usize % workers.len()].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stampede_core::TestStatus;
    use stampede_storage::{InMemoryResultRepository, StorageError};

    fn orchestrator() -> LoadTestOrchestrator {
        LoadTestOrchestrator::with_defaults(Arc::new(InMemoryResultRepository::new()))
    }

    #[test]
    fn test_worker_id_format_and_monotonic_index() {
        let orchestrator = orchestrator();
        let a = orchestrator.add_worker("eu-west-1");
        let b = orchestrator.add_worker("us-east-1");
        let c = orchestrator.add_worker("eu-west-1");
        assert_eq!(a.id(), "worker-eu-west-1-0");
        assert_eq!(b.id(), "worker-us-east-1-1");
        assert_eq!(c.id(), "worker-eu-west-1-2");
    }

    #[test]
    fn test_round_robin_assignment_sequence() {
        let orchestrator = orchestrator();
        orchestrator.add_worker("local");
        orchestrator.add_worker("local");
        let workers = orchestrator.workers.read().unwrap().clone();

        let assigned: Vec<String> = (0..4)
            .map(|user| assign_worker(&workers, user).id().to_string())
            .collect();
        assert_eq!(
            assigned,
            vec![
                "worker-local-0",
                "worker-local-1",
                "worker-local-0",
                "worker-local-1"
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_users_completes_with_empty_summary() {
        let repo = Arc::new(InMemoryResultRepository::new());
        let orchestrator = LoadTestOrchestrator::with_defaults(repo.clone());

        let config = LoadTestConfig {
            max_users: 0,
            duration_seconds: 0,
            ramp_up_seconds: 0,
            ramp_down_seconds: 0,
            ..Default::default()
        };

        let test_id = orchestrator.run_load_test(config, None).await.unwrap();
        let record = repo.find_by_id(test_id).await.unwrap().unwrap();

        assert_eq!(record.status, TestStatus::Completed);
        let summary = record.summary.unwrap();
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.throughput_rps, 0.0);
        assert!(!orchestrator.is_running());
        assert!(orchestrator.active_test().is_none());
    }

    #[tokio::test]
    async fn test_default_worker_added_lazily() {
        let orchestrator = orchestrator();
        let config = LoadTestConfig {
            max_users: 0,
            duration_seconds: 0,
            ramp_up_seconds: 0,
            ramp_down_seconds: 0,
            ..Default::default()
        };
        orchestrator.run_load_test(config, None).await.unwrap();

        let workers = orchestrator.workers.read().unwrap();
        assert_eq!(workers.len(), 1);
        assert_eq!(workers[0].id(), "worker-local-0");
    }

    /// Repository whose updates always fail, to exercise the failure path
    struct BrokenRepository {
        inner: InMemoryResultRepository,
    }

    #[async_trait]
    impl ResultRepository for BrokenRepository {
        async fn create(&self, result: LoadTestResult) -> Result<(), StorageError> {
            self.inner.create(result).await
        }

        async fn update(&self, _result: LoadTestResult) -> Result<(), StorageError> {
            Err(StorageError::Internal {
                message: "disk on fire".to_string(),
            })
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<LoadTestResult>, StorageError> {
            self.inner.find_by_id(id).await
        }

        async fn list(&self) -> Result<Vec<LoadTestResult>, StorageError> {
            self.inner.list().await
        }

        async fn health_check(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_still_returns_test_id_and_tears_down() {
        let repo = Arc::new(BrokenRepository {
            inner: InMemoryResultRepository::new(),
        });
        let orchestrator = LoadTestOrchestrator::with_defaults(repo);

        let config = LoadTestConfig {
            max_users: 0,
            duration_seconds: 0,
            ramp_up_seconds: 0,
            ramp_down_seconds: 0,
            ..Default::default()
        };

        // The final update fails; the run is recorded as failed best-effort
        // and the call still resolves with the test id.
        let result = orchestrator.run_load_test(config, None).await;
        assert!(result.is_ok());
        assert!(!orchestrator.is_running());
    }

    #[tokio::test]
    async fn test_failure_before_aggregation_still_writes_summary() {
        let repo = Arc::new(InMemoryResultRepository::new());
        // A user agent with a newline makes the reqwest builder fail, so
        // worker initialization errors out before any phase runs.
        let http_config = HttpClientConfig {
            user_agent: "stampede\nbroken".to_string(),
            ..Default::default()
        };
        let orchestrator =
            LoadTestOrchestrator::new(EngineConfig::default(), http_config, repo.clone());

        let config = LoadTestConfig {
            max_users: 2,
            duration_seconds: 1,
            ramp_up_seconds: 0,
            ramp_down_seconds: 0,
            ..Default::default()
        };

        let test_id = orchestrator.run_load_test(config, None).await.unwrap();
        let record = repo.find_by_id(test_id).await.unwrap().unwrap();

        assert_eq!(record.status, TestStatus::Failed);
        assert!(record.error.is_some());
        // The failed record carries an aggregate of whatever was collected,
        // here nothing, rather than no summary at all.
        let summary = record.summary.unwrap();
        assert_eq!(summary.total_requests, 0);
    }
}
