//! Cluster control plane trait and service snapshot.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A service as read from the control plane, ready to be written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterService {
    /// Control-plane id of the service.
    pub id: String,
    /// Lookup name.
    pub name: String,
    /// Optimistic-concurrency token from the read. Must be sent back unchanged.
    pub version: u64,
    /// Image the service should run. Written into `spec` on update.
    pub image: Option<String>,
    /// Platform-specific service spec, carried through untouched.
    pub spec: serde_json::Value,
}

/// Control plane operations needed to roll a service to a new image.
#[async_trait]
pub trait ClusterControl: Send + Sync {
    /// Read a service's spec and version token in one call.
    async fn inspect_service(&self, name: &str) -> Result<ClusterService>;

    /// Submit `service` back, guarded by `service.version`.
    ///
    /// Fails if the version is stale or the service has gone away.
    async fn update_service(&self, service: &ClusterService) -> Result<()>;
}
