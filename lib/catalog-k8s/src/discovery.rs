//! Endpoints discovery for a single namespace

use crate::KubeClient;
use catalog_core::{
    CatalogError, DirectorySource, EndpointAddress, EndpointPort, EndpointSubset,
    EndpointsRecord, Protocol, Result,
};
use k8s_openapi::api::core::v1::{self as core_v1, Endpoints};
use kube::api::{Api, ListParams};
use tracing::{debug, warn};

/// Tag carried by every instance sourced from Kubernetes
pub const SOURCE_KIND: &str = "kubernetes";

/// EndpointsDirectory lists the Endpoints objects of a namespace
pub struct EndpointsDirectory {
    client: KubeClient,
}

impl EndpointsDirectory {
    pub fn new(client: KubeClient) -> Self {
        Self { client }
    }

    /// Connect to the cluster and create a directory on top of it
    pub async fn connect() -> anyhow::Result<Self> {
        Ok(Self::new(KubeClient::connect().await?))
    }
}

#[async_trait::async_trait]
impl DirectorySource for EndpointsDirectory {
    fn kind(&self) -> &str {
        SOURCE_KIND
    }

    fn endpoints_url(&self, scope: &str) -> String {
        self.client.endpoints_url(scope)
    }

    async fn get_endpoints(&self, scope: &str) -> Result<Vec<EndpointsRecord>> {
        let endpoints: Api<Endpoints> = Api::namespaced(self.client.inner().clone(), scope);
        let list = endpoints
            .list(&ListParams::default())
            .await
            .map_err(|e| list_error(scope, e))?;

        debug!("Discovered {} Endpoints objects in {}", list.items.len(), scope);
        Ok(list.items.iter().filter_map(endpoints_to_record).collect())
    }
}

/// Any failure to list endpoints means the directory is unreachable or
/// answered badly; the catalog only distinguishes it as a connect error.
fn list_error(scope: &str, error: kube::Error) -> CatalogError {
    CatalogError::Connect(format!("listing Endpoints in {}: {}", scope, error))
}

/// Convert an Endpoints object into a directory record.
///
/// Only ready addresses are kept. Returns `None` for objects without a name.
pub fn endpoints_to_record(endpoints: &Endpoints) -> Option<EndpointsRecord> {
    let name = endpoints.metadata.name.as_deref()?;

    let subsets = endpoints
        .subsets
        .iter()
        .flatten()
        .map(|subset| EndpointSubset {
            addresses: subset
                .addresses
                .iter()
                .flatten()
                .map(|address| EndpointAddress {
                    ip: address.ip.clone(),
                    target_ref_id: address.target_ref.as_ref().and_then(|r| r.uid.clone()),
                })
                .collect(),
            ports: subset
                .ports
                .iter()
                .flatten()
                .filter_map(|port| convert_port(name, port))
                .collect(),
        })
        .collect();

    Some(EndpointsRecord {
        name: name.to_string(),
        subsets,
    })
}

fn convert_port(service: &str, port: &core_v1::EndpointPort) -> Option<EndpointPort> {
    // Kubernetes defaults an unset protocol to TCP
    let protocol = match port.protocol.as_deref() {
        None | Some("TCP") => Protocol::Tcp,
        Some("UDP") => Protocol::Udp,
        Some(other) => {
            warn!("Skipping port {} of {}: unsupported protocol {}", port.port, service, other);
            return None;
        }
    };

    match u16::try_from(port.port) {
        Ok(number) if number > 0 => Some(EndpointPort { number, protocol }),
        _ => {
            warn!("Skipping port of {}: invalid port number {}", service, port.port);
            None
        }
    }
}
