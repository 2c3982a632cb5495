//! Deploy requests and cycle outcomes.

use serde::{Deserialize, Serialize};

use crate::{ImageReference, Result};

/// Metadata stored under `request:metadata` for each queued deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    /// Legacy key-value directory of the target. Carried but unused.
    #[serde(rename = "etcdDir", default, skip_serializing_if = "Option::is_none")]
    pub etcd_dir: Option<String>,
    /// Full image reference to roll out.
    #[serde(rename = "dockerUrl")]
    pub docker_url: String,
}

impl DeployRequest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn image(&self) -> Result<ImageReference> {
        ImageReference::parse(&self.docker_url)
    }
}

/// What a single deploy cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing was due.
    Idle,
    /// Another consumer claimed the deploy first.
    ClaimLost { id: String },
    /// The deploy was claimed but carried a cancellation marker.
    Cancelled { id: String },
    /// The service was updated and the tracker notified.
    Deployed {
        id: String,
        service: String,
        image: String,
    },
}

impl CycleOutcome {
    pub fn is_deployed(&self) -> bool {
        matches!(self, CycleOutcome::Deployed { .. })
    }
}
