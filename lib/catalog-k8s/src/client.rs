//! Kubernetes client used by the endpoints directory

use kube::{Client, Config};

/// KubeClient wraps the Kubernetes client together with the API server URL
/// it talks to, which is needed to build back-links to directory entries.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    cluster_url: String,
}

impl KubeClient {
    /// Connect using the in-cluster service account or the local kubeconfig
    pub async fn connect() -> anyhow::Result<Self> {
        let config = Config::infer().await?;
        let cluster_url = config.cluster_url.to_string();
        let client = Client::try_from(config)?;
        Ok(Self::from_parts(client, cluster_url))
    }

    /// Wrap an existing client
    pub fn from_parts(client: Client, cluster_url: impl Into<String>) -> Self {
        let cluster_url = cluster_url.into().trim_end_matches('/').to_string();
        Self { client, cluster_url }
    }

    /// Get the underlying Kubernetes client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// URL of the Endpoints collection of a namespace
    pub fn endpoints_url(&self, namespace: &str) -> String {
        endpoints_url(&self.cluster_url, namespace)
    }
}

pub(crate) fn endpoints_url(cluster_url: &str, namespace: &str) -> String {
    format!("{}/api/v1/namespaces/{}/endpoints", cluster_url, namespace)
}
