//! The deploy cycle.
//!
//! One call to [`Deployer::run_once`] walks a single deploy through
//! select, claim, cancellation check, metadata load, service update and
//! tracker notification. The claim comes first so that at most one consumer
//! ever gets past it for a given deploy id. Anything that fails after the
//! claim leaves the deploy off the queue; nothing is re-enqueued or rolled back.

use chrono::Utc;
use governator_core::{
    CANCELLATION_FIELD, ClusterControl, CycleOutcome, DeployRequest, DeployStateTracker, Error,
    ImageReference, METADATA_FIELD, QueueName, QueueStore, Result,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs deploy cycles against shared store, cluster and tracker handles.
pub struct Deployer {
    store: Arc<dyn QueueStore>,
    cluster: Arc<dyn ClusterControl>,
    tracker: Arc<dyn DeployStateTracker>,
    queue: QueueName,
    cluster_name: String,
}

impl Deployer {
    pub fn new(
        store: Arc<dyn QueueStore>,
        cluster: Arc<dyn ClusterControl>,
        tracker: Arc<dyn DeployStateTracker>,
        queue: impl Into<QueueName>,
        cluster_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cluster,
            tracker,
            queue: queue.into(),
            cluster_name: cluster_name.into(),
        }
    }

    pub fn queue(&self) -> &QueueName {
        &self.queue
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Run one cycle for deploys due as of now.
    pub async fn run_once(&self) -> Result<CycleOutcome> {
        self.run_once_at(Utc::now().timestamp()).await
    }

    /// Run one cycle for deploys due at or before `now` (Unix seconds).
    pub async fn run_once_at(&self, now: i64) -> Result<CycleOutcome> {
        let Some(id) = self.next_deploy(now).await? else {
            return Ok(CycleOutcome::Idle);
        };

        if !self.claim(&id).await? {
            debug!(deploy_id = %id, "Failed to obtain lock");
            return Ok(CycleOutcome::ClaimLost { id });
        }

        if self.is_cancelled(&id).await? {
            info!(deploy_id = %id, "Deploy was cancelled");
            return Ok(CycleOutcome::Cancelled { id });
        }

        let request = self.metadata(&id).await?;
        let image = request.image()?;
        self.deploy(&id, &image).await?;

        Ok(CycleOutcome::Deployed {
            id,
            service: image.repo().to_string(),
            image: image.to_string(),
        })
    }

    async fn next_deploy(&self, now: i64) -> Result<Option<String>> {
        self.store
            .earliest_due(&self.queue.deploys_key(), now)
            .await
    }

    async fn claim(&self, id: &str) -> Result<bool> {
        debug!(deploy_id = %id, "Claiming deploy");
        let removed = self.store.remove(&self.queue.deploys_key(), id).await?;
        Ok(removed != 0)
    }

    async fn is_cancelled(&self, id: &str) -> Result<bool> {
        self.store
            .field_exists(&self.queue.record_key(id), CANCELLATION_FIELD)
            .await
    }

    async fn metadata(&self, id: &str) -> Result<DeployRequest> {
        let bytes = self
            .store
            .field(&self.queue.record_key(id), METADATA_FIELD)
            .await?
            .ok_or_else(|| Error::MetadataNotFound(id.to_string()))?;
        DeployRequest::from_slice(&bytes)
    }

    async fn deploy(&self, id: &str, image: &ImageReference) -> Result<()> {
        let mut service = self.cluster.inspect_service(image.repo()).await?;
        debug!(
            deploy_id = %id,
            service = %service.name,
            version = service.version,
            current_image = ?service.image,
            "Inspected service"
        );

        service.image = Some(image.to_string());
        self.cluster.update_service(&service).await?;
        info!(deploy_id = %id, service = %service.name, image = %image, "Service updated");

        self.tracker.mark_passed(image, &self.cluster_name).await?;
        info!(deploy_id = %id, cluster = %self.cluster_name, "Deploy state marked passed");

        Ok(())
    }
}
