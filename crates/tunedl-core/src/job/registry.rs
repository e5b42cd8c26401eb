use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::job::record::JobRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The job was never inserted or has already been removed.
    #[error("job not found: {0}")]
    NotFound(String),
}

/// Centralized, thread-safe store of every job record, keyed by job ID.
///
/// Uses a `tokio::sync::RwLock<HashMap>` so HTTP handlers can read
/// concurrently while workers write. Every mutation happens under a single
/// write guard, so readers never observe a half-applied transition. The tokio
/// lock does not poison; a panicking writer cannot wedge other jobs.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    inner: Arc<RwLock<HashMap<String, JobRecord>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, overwriting any previous record with the same ID.
    pub async fn insert(&self, id: impl Into<String>, record: JobRecord) {
        self.inner.write().await.insert(id.into(), record);
    }

    /// Return a copy of the current record.
    pub async fn get(&self, id: &str) -> Option<JobRecord> {
        self.inner.read().await.get(id).cloned()
    }

    /// Atomically overwrite an existing record.
    ///
    /// Fails if the ID is unknown; a removed job is never brought back.
    pub async fn replace(&self, id: &str, record: JobRecord) -> Result<(), RegistryError> {
        match self.inner.write().await.get_mut(id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RegistryError::NotFound(id.to_owned())),
        }
    }

    /// Read-modify-write an existing record under one write guard.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut JobRecord),
    {
        match self.inner.write().await.get_mut(id) {
            Some(record) => {
                f(record);
                Ok(())
            }
            None => Err(RegistryError::NotFound(id.to_owned())),
        }
    }

    /// Snapshot of every `(id, record)` pair, in no particular order.
    pub async fn list_all(&self) -> Vec<(String, JobRecord)> {
        self.inner
            .read()
            .await
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    /// Remove a single record, returning it if it existed.
    pub async fn delete(&self, id: &str) -> Option<JobRecord> {
        self.inner.write().await.remove(id)
    }

    /// Remove everything; returns how many records were dropped.
    pub async fn clear(&self) -> usize {
        let mut guard = self.inner.write().await;
        let count = guard.len();
        guard.clear();
        count
    }

    /// Remove every record matching `pred`. Returns `(removed, remaining)`.
    pub async fn remove_where<F>(&self, mut pred: F) -> (usize, usize)
    where
        F: FnMut(&JobRecord) -> bool,
    {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, record| !pred(record));
        (before - guard.len(), guard.len())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::job::record::{JobPhase, JobStatus, Quality};
    use chrono::Utc;

    fn record(url: &str) -> JobRecord {
        JobRecord::new(url, Quality::Normal, Utc::now())
    }

    #[tokio::test]
    async fn insert_then_get() {
        let registry = JobRegistry::new();
        registry.insert("a", record("https://example.com/a")).await;
        let got = registry.get("a").await.expect("record present");
        assert_eq!(got.url(), "https://example.com/a");
        assert!(registry.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn replace_and_update_require_existing_id() {
        let registry = JobRegistry::new();
        assert_eq!(
            registry.replace("ghost", record("u")).await,
            Err(RegistryError::NotFound("ghost".into()))
        );
        assert!(registry.update("ghost", |_| {}).await.is_err());
        assert!(registry.is_empty().await, "failed writes must not insert");

        registry.insert("a", record("u")).await;
        registry
            .update("a", |r| r.transition(JobPhase::Processing, "Fetching info..."))
            .await
            .unwrap();
        assert_eq!(registry.get("a").await.unwrap().status(), JobStatus::Processing);
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let registry = JobRegistry::new();
        registry.insert("a", record("u")).await;
        registry.insert("b", record("u")).await;
        registry.insert("c", record("u")).await;

        assert!(registry.delete("a").await.is_some());
        assert!(registry.delete("a").await.is_none());
        assert_eq!(registry.len().await, 2);
        assert_eq!(registry.clear().await, 2);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn remove_where_reports_counts() {
        let registry = JobRegistry::new();
        registry.insert("keep", record("u")).await;
        let mut done = record("u");
        done.transition(
            JobPhase::Failed {
                error: None,
                failed_at: Utc::now(),
            },
            "failed",
        );
        registry.insert("drop", done).await;

        let (removed, remaining) = registry
            .remove_where(|r| r.status().is_terminal())
            .await;
        assert_eq!((removed, remaining), (1, 1));
        assert!(registry.get("keep").await.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_and_readers() {
        let registry = JobRegistry::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let id = format!("job-{i}");
                registry.insert(id.clone(), record("u")).await;
                for _ in 0..10 {
                    registry
                        .update(&id, |r| r.transition(JobPhase::Processing, "Fetching info..."))
                        .await
                        .unwrap();
                    let _ = registry.list_all().await;
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let all = registry.list_all().await;
        assert_eq!(all.len(), 32);
        assert!(all.iter().all(|(_, r)| r.status() == JobStatus::Processing));
    }
}
