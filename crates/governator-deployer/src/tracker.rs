//! HTTP client for the deploy-state service.

use async_trait::async_trait;
use governator_core::{DeployStateTracker, Error, ImageReference, Result};
use tracing::debug;
use url::Url;

/// Client for `PUT <base>/deployments/<owner>/<repo>/<tag>/cluster/<cluster>/passed`.
///
/// Credentials embedded in the base URI are sent as HTTP basic auth rather
/// than as part of the request URL.
pub struct DeployStateClient {
    client: reqwest::Client,
    base: Url,
    credentials: Option<(String, Option<String>)>,
}

impl DeployStateClient {
    pub fn new(base_uri: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), base_uri)
    }

    /// Create with a custom HTTP client (timeouts, proxies, TLS).
    pub fn with_client(client: reqwest::Client, base_uri: &str) -> Result<Self> {
        let mut base = Url::parse(base_uri)
            .map_err(|e| Error::Config(format!("deploy-state-uri `{}`: {}", base_uri, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "deploy-state-uri `{}` cannot be used as a base URL",
                base_uri
            )));
        }

        let credentials = if base.username().is_empty() {
            None
        } else {
            let username = decode(base.username());
            let password = base.password().map(decode);
            Some((username, password))
        };
        // Only fails for cannot-be-a-base URLs, excluded above.
        let _ = base.set_username("");
        let _ = base.set_password(None);

        Ok(Self {
            client,
            base,
            credentials,
        })
    }

    /// Where a successful deploy of `image` to `cluster` is reported.
    pub fn passed_url(&self, image: &ImageReference, cluster: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "deployments",
                image.owner(),
                image.repo(),
                image.tag(),
                "cluster",
                cluster,
                "passed",
            ]);
        }
        url
    }
}

fn decode(component: &str) -> String {
    urlencoding::decode(component)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| component.to_string())
}

#[async_trait]
impl DeployStateTracker for DeployStateClient {
    async fn mark_passed(&self, image: &ImageReference, cluster: &str) -> Result<()> {
        let url = self.passed_url(image, cluster);
        debug!(url = %url, "Making request to deploy-state-service");

        let mut request = self.client.put(url);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, password.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::TrackerRequest(e.to_string()))?;

        let status = response.status().as_u16();
        debug!(status, "Deploy-state response");
        if status > 399 {
            return Err(Error::Tracker { status });
        }
        Ok(())
    }
}
