//! Coordinator service lifecycle
//!
//! Wraps the [`TaskCoordinator`] in a long-lived cooperative poll loop:
//! every tick iterates the current snapshot of registered jobs and calls
//! the per-job transition function. The loop sleeps between ticks, backs
//! off after a faulted tick instead of hot-looping, and supports graceful
//! shutdown through a broadcast signal. In-flight analysis tasks are joined
//! (or aborted) as part of `stop`.

use crate::config::{PollConfig, ServiceConfig};
use crate::coordinator::TaskCoordinator;
use crate::error::{CoordinatorError, Result};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceStatus {
    /// Service is stopped
    #[default]
    Stopped,

    /// Service is running normally
    Running,

    /// Service is shutting down
    Stopping,
}

/// Outcome of one poll tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    /// Every store interaction succeeded
    Clean,
    /// At least one job's store reads failed; back off before the next tick
    Faulted,
}

/// Long-lived poll loop around a [`TaskCoordinator`]
pub struct CoordinatorService {
    coordinator: Arc<TaskCoordinator>,
    poll: PollConfig,
    service: ServiceConfig,

    /// Poll task handle
    poll_handle: Mutex<Option<JoinHandle<()>>>,

    /// Shutdown sender (for broadcasting shutdown)
    shutdown_tx: broadcast::Sender<()>,

    /// Service status
    status: Arc<RwLock<ServiceStatus>>,
}

impl std::fmt::Debug for CoordinatorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorService")
            .field("status", &*self.status.read())
            .finish_non_exhaustive()
    }
}

impl CoordinatorService {
    /// Create a service around an explicit coordinator instance
    #[must_use]
    pub fn new(coordinator: Arc<TaskCoordinator>, poll: PollConfig, service: ServiceConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            coordinator,
            poll,
            service,
            poll_handle: Mutex::new(None),
            shutdown_tx,
            status: Arc::new(RwLock::new(ServiceStatus::Stopped)),
        }
    }

    /// The coordinator driven by this service
    #[must_use]
    pub const fn coordinator(&self) -> &Arc<TaskCoordinator> {
        &self.coordinator
    }

    /// Get service status
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        *self.status.read()
    }

    /// Start the poll loop
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::ServiceAlreadyRunning`] if the service
    /// is not stopped.
    pub fn start(&self) -> Result<()> {
        {
            let mut status = self.status.write();
            if *status != ServiceStatus::Stopped {
                return Err(CoordinatorError::ServiceAlreadyRunning);
            }
            *status = ServiceStatus::Running;
        }

        let handle = self.spawn_poll_loop();
        *self.poll_handle.lock() = Some(handle);

        info!(
            service = %self.service.name,
            poll_interval_seconds = self.poll.poll_interval_seconds,
            "coordinator service started"
        );
        Ok(())
    }

    /// Stop the poll loop and join in-flight analysis work
    ///
    /// The current tick is allowed to finish; analysis tasks get the
    /// configured join timeout before being aborted.
    pub async fn stop(&self) {
        {
            let mut status = self.status.write();
            if *status == ServiceStatus::Stopped {
                return;
            }
            *status = ServiceStatus::Stopping;
        }

        info!("stopping coordinator service");
        let _ = self.shutdown_tx.send(());

        let handle = self.poll_handle.lock().take();
        if let Some(handle) = handle
            && tokio::time::timeout(self.service.shutdown_timeout(), handle)
                .await
                .is_err()
        {
            warn!("poll loop did not stop within the shutdown timeout");
        }

        self.coordinator
            .shutdown(self.service.analysis_join_timeout())
            .await;

        *self.status.write() = ServiceStatus::Stopped;
        info!("coordinator service stopped");
    }

    /// Spawn the poll loop task
    fn spawn_poll_loop(&self) -> JoinHandle<()> {
        let coordinator = Arc::clone(&self.coordinator);
        let poll_interval = self.poll.poll_interval();
        let error_backoff = self.poll.error_backoff();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            debug!("poll loop started");

            loop {
                let delay = match Self::tick(&coordinator).await {
                    TickOutcome::Clean => poll_interval,
                    TickOutcome::Faulted => error_backoff,
                };

                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    _ = shutdown_rx.recv() => {
                        debug!("poll loop shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Run one poll tick over the current job snapshot
    async fn tick(coordinator: &TaskCoordinator) -> TickOutcome {
        let mut faulted = false;

        for meeting_id in coordinator.pending_ids() {
            match coordinator.check_and_process(meeting_id).await {
                Ok(true) => debug!(meeting_id, "job advanced"),
                Ok(false) => {}
                Err(e) => {
                    error!(meeting_id, error = %e, "poll tick failed for job");
                    faulted = true;
                }
            }
        }

        if faulted {
            TickOutcome::Faulted
        } else {
            TickOutcome::Clean
        }
    }
}
