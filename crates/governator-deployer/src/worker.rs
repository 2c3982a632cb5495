//! Supervise loop that runs deploy cycles until told to stop.

use crate::pipeline::Deployer;
use governator_core::CycleOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Counters for one worker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub cycles: u64,
    pub deployed: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Runs one deploy cycle at a time, pausing between cycles.
pub struct Worker {
    deployer: Arc<Deployer>,
    interval: Duration,
}

impl Worker {
    pub fn new(deployer: Arc<Deployer>, interval: Duration) -> Self {
        Self { deployer, interval }
    }

    /// Run cycles until `shutdown` flips to `true`.
    ///
    /// Shutdown is only observed between cycles, so a cycle that has started
    /// always runs to completion. Cycle errors are logged and the loop carries on.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> WorkerStats {
        info!(
            queue = %self.deployer.queue(),
            cluster = %self.deployer.cluster_name(),
            "Starting worker"
        );
        let mut stats = WorkerStats::default();

        while !*shutdown.borrow() {
            stats.cycles += 1;
            match self.deployer.run_once().await {
                Ok(CycleOutcome::Idle) => {}
                Ok(CycleOutcome::Deployed { id, service, image }) => {
                    stats.deployed += 1;
                    info!(deploy_id = %id, service = %service, image = %image, "Deployed");
                }
                Ok(outcome) => {
                    stats.skipped += 1;
                    debug!(?outcome, "Nothing to deploy this cycle");
                }
                Err(e) => {
                    stats.failed += 1;
                    error!(error = %e, kind = ?e.kind(), "Deploy cycle failed");
                }
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        warn!("Shutdown sender dropped, stopping worker");
                        break;
                    }
                }
            }
        }

        info!(?stats, "Worker stopped");
        stats
    }
}
