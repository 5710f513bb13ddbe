//! Directory source contract and the raw records it returns

use crate::Result;
use serde::{Deserialize, Serialize};

/// Transport protocol reported for an endpoint port
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

/// One named directory entry with its address/port subsets
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointsRecord {
    pub name: String,
    #[serde(default)]
    pub subsets: Vec<EndpointSubset>,
}

/// Every address in a subset is reachable on every port of that subset
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSubset {
    #[serde(default)]
    pub addresses: Vec<EndpointAddress>,
    #[serde(default)]
    pub ports: Vec<EndpointPort>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointAddress {
    pub ip: String,
    /// Stable identifier of the object behind this address, if the source has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_ref_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPort {
    pub number: u16,
    pub protocol: Protocol,
}

/// DirectorySource supplies point-in-time snapshots of a scope's endpoints.
///
/// Implementations own the transport to the directory. A failed call must
/// return an error rather than a partial list.
#[async_trait::async_trait]
pub trait DirectorySource: Send + Sync {
    /// Marker identifying the kind of directory, used as the instance tag
    fn kind(&self) -> &str;

    /// Base URL under which the scope's entries can be looked up
    fn endpoints_url(&self, scope: &str) -> String;

    /// Fetch the full current set of endpoints for `scope`
    async fn get_endpoints(&self, scope: &str) -> Result<Vec<EndpointsRecord>>;
}
