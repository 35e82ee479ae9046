//! Coordination store contract and in-memory implementation
//!
//! Workers and the coordinator share no memory or clock; they communicate
//! through this TTL-bounded store keyed by `(meeting id, worker kind)`.
//! Correctness relies on the coordinator being the single consumer that
//! clears entries after reading — running two coordinator instances against
//! the same store is unsafe and must be prevented operationally.

use crate::error::StoreResult;
use async_trait::async_trait;
use dashmap::DashMap;
use meetbrief_core::{MeetingId, MeetingStatus, WorkerKind, WorkerResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Lifetime of worker result and job status entries
pub const RESULT_TTL: Duration = Duration::from_secs(3600);

/// Job progress entry, overwritten on every coordinator transition
///
/// Read by the status-query surface; never merged, always replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobStatus {
    /// Current status
    pub status: MeetingStatus,

    /// Human-readable progress message
    pub message: String,
}

/// Shared store for worker results and job progress
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Store a worker result (written once by the producing worker)
    async fn put_worker_result(
        &self,
        meeting_id: MeetingId,
        kind: WorkerKind,
        result: WorkerResult,
    ) -> StoreResult<()>;

    /// Read a worker result; `None` when absent or expired
    async fn worker_result(
        &self,
        meeting_id: MeetingId,
        kind: WorkerKind,
    ) -> StoreResult<Option<WorkerResult>>;

    /// Delete a worker result entry
    async fn clear_worker_result(&self, meeting_id: MeetingId, kind: WorkerKind)
    -> StoreResult<()>;

    /// Overwrite the job progress entry
    async fn set_job_status(
        &self,
        meeting_id: MeetingId,
        status: MeetingStatus,
        message: &str,
    ) -> StoreResult<()>;

    /// Read the job progress entry; `None` when absent or expired
    async fn job_status(&self, meeting_id: MeetingId) -> StoreResult<Option<JobStatus>>;
}

/// An entry with a bounded lifetime
#[derive(Debug, Clone)]
struct Expiring<T> {
    value: T,
    deadline: Instant,
}

impl<T: Clone> Expiring<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            deadline: Instant::now() + ttl,
        }
    }

    fn live(&self) -> Option<T> {
        (Instant::now() < self.deadline).then(|| self.value.clone())
    }
}

/// In-process coordination store with per-entry TTL
///
/// Expired entries are evicted lazily on read. Suitable for single-node
/// deployments where workers run in the same process, and for tests; a
/// networked key-value store can implement [`CoordinationStore`] for
/// multi-process setups.
#[derive(Debug)]
pub struct MemoryCoordinationStore {
    results: DashMap<(MeetingId, WorkerKind), Expiring<WorkerResult>>,
    statuses: DashMap<MeetingId, Expiring<JobStatus>>,
    ttl: Duration,
}

impl MemoryCoordinationStore {
    /// Create a store with the standard entry lifetime
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(RESULT_TTL)
    }

    /// Create a store with a custom entry lifetime
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            results: DashMap::new(),
            statuses: DashMap::new(),
            ttl,
        }
    }
}

impl Default for MemoryCoordinationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoordinationStore for MemoryCoordinationStore {
    async fn put_worker_result(
        &self,
        meeting_id: MeetingId,
        kind: WorkerKind,
        result: WorkerResult,
    ) -> StoreResult<()> {
        self.results
            .insert((meeting_id, kind), Expiring::new(result, self.ttl));
        Ok(())
    }

    async fn worker_result(
        &self,
        meeting_id: MeetingId,
        kind: WorkerKind,
    ) -> StoreResult<Option<WorkerResult>> {
        let key = (meeting_id, kind);
        let Some(entry) = self.results.get(&key) else {
            return Ok(None);
        };

        match entry.live() {
            Some(value) => Ok(Some(value)),
            None => {
                drop(entry);
                self.results.remove(&key);
                Ok(None)
            }
        }
    }

    async fn clear_worker_result(
        &self,
        meeting_id: MeetingId,
        kind: WorkerKind,
    ) -> StoreResult<()> {
        self.results.remove(&(meeting_id, kind));
        Ok(())
    }

    async fn set_job_status(
        &self,
        meeting_id: MeetingId,
        status: MeetingStatus,
        message: &str,
    ) -> StoreResult<()> {
        let entry = JobStatus {
            status,
            message: message.to_string(),
        };
        self.statuses
            .insert(meeting_id, Expiring::new(entry, self.ttl));
        Ok(())
    }

    async fn job_status(&self, meeting_id: MeetingId) -> StoreResult<Option<JobStatus>> {
        let Some(entry) = self.statuses.get(&meeting_id) else {
            return Ok(None);
        };

        match entry.live() {
            Some(value) => Ok(Some(value)),
            None => {
                drop(entry);
                self.statuses.remove(&meeting_id);
                Ok(None)
            }
        }
    }
}
