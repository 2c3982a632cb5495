//! Docker host URIs.

use crate::{ConfigError, ConfigResult};
use url::Url;

/// Where to reach the Docker daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerHost {
    /// Whatever the client's own defaults resolve to (`DOCKER_HOST`, then the local socket).
    LocalDefaults,
    /// Unix domain socket path.
    Unix(String),
    /// Windows named pipe path.
    NamedPipe(String),
    /// TCP `host:port`.
    Tcp { addr: String },
}

impl DockerHost {
    /// Host for an optional configured URI. No URI means local defaults.
    pub fn resolve(uri: Option<&str>) -> ConfigResult<Self> {
        match uri {
            None => Ok(Self::LocalDefaults),
            Some(uri) => Self::parse(uri),
        }
    }

    /// Parse `proto://addr`.
    ///
    /// TCP URIs must not carry a path: the Docker client always talks to the
    /// API root, so a base path could not be honoured.
    pub fn parse(uri: &str) -> ConfigResult<Self> {
        let Some((proto, addr)) = uri.split_once("://") else {
            return Err(invalid(uri, "expected <proto>://<addr>"));
        };

        match proto {
            "unix" => Ok(Self::Unix(addr.to_string())),
            "npipe" => Ok(Self::NamedPipe(addr.to_string())),
            "tcp" | "http" => {
                let parsed = Url::parse(&format!("tcp://{}", addr))
                    .map_err(|e| invalid(uri, &e.to_string()))?;
                let host = parsed
                    .host_str()
                    .ok_or_else(|| invalid(uri, "missing host"))?;
                if !matches!(parsed.path(), "" | "/") {
                    return Err(invalid(uri, "API base paths are not supported"));
                }
                let addr = match parsed.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                };
                Ok(Self::Tcp { addr })
            }
            other => Err(invalid(uri, &format!("unsupported protocol `{}`", other))),
        }
    }

    /// URI form accepted by the Docker client. `None` for local defaults.
    pub fn client_uri(&self) -> Option<String> {
        match self {
            Self::LocalDefaults => None,
            Self::Unix(path) => Some(format!("unix://{}", path)),
            Self::NamedPipe(path) => Some(format!("npipe://{}", path)),
            Self::Tcp { addr } => Some(format!("http://{}", addr)),
        }
    }
}

fn invalid(uri: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: "docker-uri".to_string(),
        message: format!("unable to parse docker host `{}`: {}", uri, message),
    }
}
