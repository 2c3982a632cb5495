//! Core domain types and traits for the governator deploy agent.
//!
//! This crate contains:
//! - Image reference parsing
//! - Deploy request metadata and cycle outcomes
//! - Queue key namespacing
//! - Collaborator traits (queue store, cluster control plane, deploy-state tracker)

pub mod cluster;
pub mod deploy;
pub mod error;
pub mod image;
pub mod queue;
pub mod tracker;

pub use cluster::{ClusterControl, ClusterService};
pub use deploy::{CycleOutcome, DeployRequest};
pub use error::{Error, ErrorKind, Result};
pub use image::ImageReference;
pub use queue::{CANCELLATION_FIELD, METADATA_FIELD, QueueName, QueueStore};
pub use tracker::DeployStateTracker;
