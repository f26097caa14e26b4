//! In-memory result repository

use crate::error::StorageError;
use crate::repository::ResultRepository;
use async_trait::async_trait;
use stampede_core::LoadTestResult;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Map-backed repository, the reference store for single-process runs
#[derive(Debug, Default)]
pub struct InMemoryResultRepository {
    records: RwLock<HashMap<Uuid, LoadTestResult>>,
}

impl InMemoryResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    async fn create(&self, result: LoadTestResult) -> Result<(), StorageError> {
        debug!("Storing new result record {}", result.id);
        self.records.write().await.insert(result.id, result);
        Ok(())
    }

    async fn update(&self, result: LoadTestResult) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        if !records.contains_key(&result.id) {
            return Err(StorageError::NotFound {
                id: result.id.to_string(),
            });
        }
        debug!("Updating result record {} -> {}", result.id, result.status);
        records.insert(result.id, result);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LoadTestResult>, StorageError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<LoadTestResult>, StorageError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stampede_core::{LoadTestConfig, TestStatus};

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryResultRepository::new();
        let result = LoadTestResult::started(LoadTestConfig::default());
        let id = result.id;

        repo.create(result).await.unwrap();
        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.status, TestStatus::Running);
    }

    #[tokio::test]
    async fn test_update_transitions_status() {
        let repo = InMemoryResultRepository::new();
        let mut result = LoadTestResult::started(LoadTestConfig::default());
        let id = result.id;
        repo.create(result.clone()).await.unwrap();

        result.fail("boom");
        repo.update(result).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.status, TestStatus::Failed);
        assert_eq!(found.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = InMemoryResultRepository::new();
        let result = LoadTestResult::started(LoadTestConfig::default());
        let err = repo.update(result).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let repo = InMemoryResultRepository::new();
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list() {
        let repo = InMemoryResultRepository::new();
        for _ in 0..3 {
            repo.create(LoadTestResult::started(LoadTestConfig::default()))
                .await
                .unwrap();
        }
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }
}
