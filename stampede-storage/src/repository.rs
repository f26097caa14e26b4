//! Repository trait for load-test result records

use crate::error::StorageError;
use async_trait::async_trait;
use stampede_core::LoadTestResult;
use uuid::Uuid;

/// Storage contract for run records
///
/// The orchestrator creates a record when a run starts and updates it once
/// at the end; readers fetch records by id after the fact.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Persist a new run record
    async fn create(&self, result: LoadTestResult) -> Result<(), StorageError>;

    /// Replace an existing run record
    async fn update(&self, result: LoadTestResult) -> Result<(), StorageError>;

    /// Fetch a record by test id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LoadTestResult>, StorageError>;

    /// List every stored record
    async fn list(&self) -> Result<Vec<LoadTestResult>, StorageError>;

    /// Check the repository is healthy and can serve requests
    async fn health_check(&self) -> Result<(), StorageError>;
}
