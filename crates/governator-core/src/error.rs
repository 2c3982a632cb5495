//! Error types for governator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("queue store error: {0}")]
    Store(String),

    #[error("cluster error: {0}")]
    Cluster(String),

    #[error("cluster rejected request: {0}")]
    ClusterRejected(String),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("metadata not found for `{0}`")]
    MetadataNotFound(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid image reference: `{0}`")]
    InvalidImageReference(String),

    #[error("invalid response from deploy-state-service: {status}")]
    Tracker { status: u16 },

    #[error("deploy-state request failed: {0}")]
    TrackerRequest(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Broad classes of failure, used by the driver to decide how loudly to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Store or control-plane connectivity. Retry on the next cycle.
    TransientInfra,
    /// Missing or malformed queue data. The item is already gone from the queue.
    DataIntegrity,
    /// The control plane or tracker rejected a call.
    ExternalCall,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Store(_) | Error::Cluster(_) | Error::Config(_) => ErrorKind::TransientInfra,
            Error::MetadataNotFound(_) | Error::Json(_) | Error::InvalidImageReference(_) => {
                ErrorKind::DataIntegrity
            }
            Error::ClusterRejected(_)
            | Error::ServiceNotFound(_)
            | Error::Tracker { .. }
            | Error::TrackerRequest(_) => ErrorKind::ExternalCall,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_not_found_names_identifier() {
        let err = Error::MetadataNotFound("pending-deploy-1".to_string());
        assert_eq!(err.to_string(), "metadata not found for `pending-deploy-1`");
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    }

    #[test]
    fn test_json_error_is_surfaced_as_is() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let message = json_err.to_string();
        let err = Error::from(json_err);
        assert_eq!(err.to_string(), message);
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::Store("connection refused".into()).kind(),
            ErrorKind::TransientInfra
        );
        assert_eq!(
            Error::Tracker { status: 500 }.kind(),
            ErrorKind::ExternalCall
        );
        assert_eq!(
            Error::ServiceNotFound("my-app".into()).kind(),
            ErrorKind::ExternalCall
        );
        assert_eq!(
            Error::ClusterRejected("my-app (500): update out of sequence".into()).kind(),
            ErrorKind::ExternalCall
        );
        assert_eq!(
            Error::Cluster("connection refused".into()).kind(),
            ErrorKind::TransientInfra
        );
    }
}
