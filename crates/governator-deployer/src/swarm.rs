//! Docker Swarm control plane.

use async_trait::async_trait;
use bollard::Docker;
use bollard::errors::Error as DockerError;
use bollard::models::{Service, ServiceSpec};
use bollard::service::UpdateServiceOptions;
use governator_config::DockerHost;
use governator_core::{ClusterControl, ClusterService, Error, Result};
use std::time::Duration;
use tracing::debug;

/// Swarm services, addressed by name, updated through the Docker API.
pub struct SwarmClusterControl {
    docker: Docker,
}

impl SwarmClusterControl {
    /// Connect to the daemon at `host`. `timeout_secs` bounds every API call.
    pub fn connect(host: &DockerHost, timeout_secs: u64) -> Result<Self> {
        let docker = match host {
            DockerHost::LocalDefaults => Docker::connect_with_local_defaults()
                .map(|docker| docker.with_timeout(Duration::from_secs(timeout_secs))),
            DockerHost::Unix(path) | DockerHost::NamedPipe(path) => {
                Docker::connect_with_socket(path, timeout_secs, bollard::API_DEFAULT_VERSION)
            }
            DockerHost::Tcp { addr } => Docker::connect_with_http(
                &format!("http://{}", addr),
                timeout_secs,
                bollard::API_DEFAULT_VERSION,
            ),
        }
        .map_err(|e| Error::Cluster(e.to_string()))?;
        Ok(Self { docker })
    }

    /// Create with a custom Docker client.
    pub fn with_client(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl ClusterControl for SwarmClusterControl {
    async fn inspect_service(&self, name: &str) -> Result<ClusterService> {
        let service = self
            .docker
            .inspect_service(name, None)
            .await
            .map_err(|e| map_docker_error(e, name))?;
        to_cluster_service(name, service)
    }

    async fn update_service(&self, service: &ClusterService) -> Result<()> {
        let mut spec: ServiceSpec = serde_json::from_value(service.spec.clone())?;
        if let Some(image) = &service.image {
            set_image(&mut spec, image);
        }

        let options = UpdateServiceOptions {
            version: service.version,
            ..Default::default()
        };

        let response = self
            .docker
            .update_service(&service.id, spec, options, None)
            .await
            .map_err(|e| map_docker_error(e, &service.name))?;

        for warning in response.warnings.unwrap_or_default() {
            debug!(service = %service.name, warning = %warning, "Service update warning");
        }
        Ok(())
    }
}

fn to_cluster_service(name: &str, service: Service) -> Result<ClusterService> {
    let id = service
        .id
        .ok_or_else(|| Error::Cluster(format!("service `{}` has no id", name)))?;
    let version = service
        .version
        .and_then(|v| v.index)
        .ok_or_else(|| Error::Cluster(format!("service `{}` has no version", name)))?;
    let spec = service.spec.unwrap_or_default();

    Ok(ClusterService {
        id,
        name: spec.name.clone().unwrap_or_else(|| name.to_string()),
        version,
        image: current_image(&spec),
        spec: serde_json::to_value(&spec)?,
    })
}

fn current_image(spec: &ServiceSpec) -> Option<String> {
    spec.task_template
        .as_ref()
        .and_then(|t| t.container_spec.as_ref())
        .and_then(|c| c.image.clone())
}

fn set_image(spec: &mut ServiceSpec, image: &str) {
    spec.task_template
        .get_or_insert_with(Default::default)
        .container_spec
        .get_or_insert_with(Default::default)
        .image = Some(image.to_string());
}

fn map_docker_error(e: DockerError, service: &str) -> Error {
    match e {
        DockerError::DockerResponseServerError {
            status_code: 404, ..
        } => Error::ServiceNotFound(service.to_string()),
        DockerError::DockerResponseServerError {
            status_code,
            message,
        } => Error::ClusterRejected(format!("{} ({}): {}", service, status_code, message)),
        other => Error::Cluster(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{ObjectVersion, TaskSpec, TaskSpecContainerSpec};

    fn make_service(image: Option<&str>) -> Service {
        Service {
            id: Some("svc-123".to_string()),
            version: Some(ObjectVersion { index: Some(17) }),
            spec: Some(ServiceSpec {
                name: Some("my-app".to_string()),
                task_template: Some(TaskSpec {
                    container_spec: Some(TaskSpecContainerSpec {
                        image: image.map(String::from),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_to_cluster_service() {
        let service = to_cluster_service("my-app", make_service(Some("octoblu/my-app:v0")))
            .unwrap();
        assert_eq!(service.id, "svc-123");
        assert_eq!(service.name, "my-app");
        assert_eq!(service.version, 17);
        assert_eq!(service.image.as_deref(), Some("octoblu/my-app:v0"));
    }

    #[test]
    fn test_service_without_version_is_an_error() {
        let mut service = make_service(None);
        service.version = None;
        assert!(matches!(
            to_cluster_service("my-app", service),
            Err(Error::Cluster(_))
        ));
    }

    #[test]
    fn test_spec_round_trips_with_new_image() {
        let service = to_cluster_service("my-app", make_service(Some("octoblu/my-app:v0")))
            .unwrap();
        let mut spec: ServiceSpec = serde_json::from_value(service.spec).unwrap();
        set_image(&mut spec, "octoblu/my-app:v1");

        assert_eq!(spec.name.as_deref(), Some("my-app"));
        assert_eq!(current_image(&spec).as_deref(), Some("octoblu/my-app:v1"));
    }

    #[test]
    fn test_set_image_fills_missing_template() {
        let mut spec = ServiceSpec::default();
        set_image(&mut spec, "octoblu/my-app:v1");
        assert_eq!(current_image(&spec).as_deref(), Some("octoblu/my-app:v1"));
    }

    #[test]
    fn test_map_docker_errors() {
        let not_found = DockerError::DockerResponseServerError {
            status_code: 404,
            message: "service my-app not found".to_string(),
        };
        assert!(matches!(
            map_docker_error(not_found, "my-app"),
            Error::ServiceNotFound(ref s) if s == "my-app"
        ));

        let stale = DockerError::DockerResponseServerError {
            status_code: 500,
            message: "update out of sequence".to_string(),
        };
        let err = map_docker_error(stale, "my-app");
        assert!(matches!(err, Error::ClusterRejected(_)));
        assert!(err.to_string().contains("update out of sequence"));
    }
}
