//! Deploy-state tracker trait.

use async_trait::async_trait;

use crate::{ImageReference, Result};

/// External service recording the outcome of a deployment.
#[async_trait]
pub trait DeployStateTracker: Send + Sync {
    /// Record that `image` was rolled out successfully to `cluster`.
    async fn mark_passed(&self, image: &ImageReference, cluster: &str) -> Result<()>;
}
