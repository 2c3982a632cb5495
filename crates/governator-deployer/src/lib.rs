//! Deploy pipeline and backends for governator.
//!
//! Provides:
//! - `Deployer`, which runs one select/claim/validate/apply/report cycle
//! - Docker Swarm control plane (`SwarmClusterControl`)
//! - HTTP deploy-state tracker client (`DeployStateClient`)
//! - `Worker`, the loop that keeps running cycles until shutdown

pub mod pipeline;
pub mod swarm;
pub mod tracker;
pub mod worker;

#[cfg(test)]
mod testing;

pub use governator_core::{
    ClusterControl, ClusterService, CycleOutcome, DeployRequest, DeployStateTracker, Error,
    ErrorKind, ImageReference, QueueName, QueueStore, Result,
};
pub use pipeline::Deployer;
pub use swarm::SwarmClusterControl;
pub use tracker::DeployStateClient;
pub use worker::{Worker, WorkerStats};
