//! Lookup structures built from one directory snapshot

use crate::{
    Endpoint, EndpointType, EndpointsRecord, Protocol, Result, ServiceInstance, STATUS_UP,
};
use std::collections::HashMap;
use tracing::debug;

/// Index holds the by-service and by-id views of one snapshot.
///
/// An index is never modified after `build` returns; a refresh builds a new
/// one and swaps it in whole.
#[derive(Clone, Debug, Default)]
pub struct Index {
    by_service: HashMap<String, Vec<ServiceInstance>>,
    by_id: HashMap<String, ServiceInstance>,
}

impl Index {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from a directory snapshot.
    ///
    /// `tag` marks the kind of source and `endpoints_url` is the base of the
    /// provenance link stored in each instance's metadata.
    pub fn build(records: &[EndpointsRecord], tag: &str, endpoints_url: &str) -> Result<Self> {
        let mut by_service: HashMap<String, Vec<ServiceInstance>> = HashMap::new();
        let mut by_id = HashMap::new();
        let url_key = format!("{}_url", tag);

        for record in records {
            // Entries without subsets have no live endpoints at all
            if record.subsets.is_empty() {
                continue;
            }

            let mut link = serde_json::Map::new();
            link.insert(
                url_key.clone(),
                serde_json::Value::String(format!("{}/{}", endpoints_url, record.name)),
            );
            let metadata = serde_json::to_vec(&link)?;
            let instances = by_service.entry(record.name.clone()).or_default();

            for subset in &record.subsets {
                for address in &subset.addresses {
                    for port in &subset.ports {
                        let uid = address
                            .target_ref_id
                            .as_deref()
                            .filter(|id| !id.is_empty())
                            .unwrap_or(&address.ip);

                        let instance = ServiceInstance {
                            id: format!("{}-{}", uid, port.number),
                            service_name: record.name.clone(),
                            endpoint: Endpoint {
                                kind: endpoint_type(port.protocol),
                                value: format!("{}:{}", address.ip, port.number),
                            },
                            status: STATUS_UP.to_string(),
                            metadata: metadata.clone(),
                            tags: vec![tag.to_string()],
                            ttl: 0,
                        };

                        if by_id.insert(instance.id.clone(), instance.clone()).is_some() {
                            debug!("Duplicate instance id in snapshot: {}", instance.id);
                        }
                        instances.push(instance);
                    }
                }
            }
        }

        Ok(Self { by_service, by_id })
    }

    /// Iterate over service names and their instances
    pub fn services(&self) -> impl Iterator<Item = (&str, &[ServiceInstance])> {
        self.by_service
            .iter()
            .map(|(name, instances)| (name.as_str(), instances.as_slice()))
    }

    pub fn instances(&self, service_name: &str) -> Option<&[ServiceInstance]> {
        self.by_service.get(service_name).map(Vec::as_slice)
    }

    pub fn instance(&self, instance_id: &str) -> Option<&ServiceInstance> {
        self.by_id.get(instance_id)
    }

    pub fn service_count(&self) -> usize {
        self.by_service.len()
    }

    pub fn instance_count(&self) -> usize {
        self.by_id.len()
    }
}

fn endpoint_type(protocol: Protocol) -> EndpointType {
    match protocol {
        Protocol::Tcp => EndpointType::Tcp,
        Protocol::Udp => EndpointType::Udp,
    }
}
