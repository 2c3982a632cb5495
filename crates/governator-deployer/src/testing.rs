//! Recording fakes for the cluster and tracker collaborators.

use async_trait::async_trait;
use governator_core::{
    ClusterControl, ClusterService, DeployStateTracker, Error, ImageReference, Result,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeCluster {
    pub services: Mutex<HashMap<String, ClusterService>>,
    pub updates: Mutex<Vec<ClusterService>>,
    pub inspects: Mutex<Vec<String>>,
    pub reject_updates: bool,
}

impl FakeCluster {
    pub fn with_service(name: &str, version: u64) -> Self {
        let cluster = Self::default();
        cluster.services.lock().unwrap().insert(
            name.to_string(),
            ClusterService {
                id: format!("{}-id", name),
                name: name.to_string(),
                version,
                image: Some(format!("octoblu/{}:v0", name)),
                spec: serde_json::json!({ "Name": name }),
            },
        );
        cluster
    }

    pub fn updates(&self) -> Vec<ClusterService> {
        self.updates.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inspects.lock().unwrap().len() + self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl ClusterControl for FakeCluster {
    async fn inspect_service(&self, name: &str) -> Result<ClusterService> {
        self.inspects.lock().unwrap().push(name.to_string());
        self.services
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ServiceNotFound(name.to_string()))
    }

    async fn update_service(&self, service: &ClusterService) -> Result<()> {
        if self.reject_updates {
            return Err(Error::ClusterRejected("update out of sequence".to_string()));
        }
        self.updates.lock().unwrap().push(service.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeTracker {
    pub calls: Mutex<Vec<(String, String, String, String)>>,
    pub fail_status: Option<u16>,
}

impl FakeTracker {
    pub fn calls(&self) -> Vec<(String, String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeployStateTracker for FakeTracker {
    async fn mark_passed(&self, image: &ImageReference, cluster: &str) -> Result<()> {
        self.calls.lock().unwrap().push((
            image.owner().to_string(),
            image.repo().to_string(),
            image.tag().to_string(),
            cluster.to_string(),
        ));
        match self.fail_status {
            Some(status) => Err(Error::Tracker { status }),
            None => Ok(()),
        }
    }
}
