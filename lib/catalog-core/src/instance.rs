//! Service instances as served to catalog callers
use serde::{Deserialize, Serialize};

/// Status assigned to every directory-sourced instance
pub const STATUS_UP: &str = "UP";

/// Transport used to reach an instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    Tcp,
    Udp,
}

/// Transport and dial target of an instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "type")]
    pub kind: EndpointType,
    /// `address:port`
    pub value: String,
}

/// One addressable endpoint of a service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    pub id: String,
    pub service_name: String,
    pub endpoint: Endpoint,
    pub status: String,
    /// JSON-encoded provenance data
    #[serde(default)]
    pub metadata: Vec<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Lease length in seconds, zero when the directory is the liveness authority
    #[serde(default)]
    pub ttl: u64,
}

impl ServiceInstance {
    /// Decode the metadata blob.
    pub fn metadata_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.metadata)
    }
}

/// A service name present in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub service_name: String,
}
