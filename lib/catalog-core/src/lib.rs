//! Read-only, periodically refreshed service catalog
//!
//! This library provides:
//! - The service instance data model served to callers
//! - The directory source contract and its raw endpoint records
//! - Index construction from a directory snapshot
//! - `Catalog`, which mirrors a directory scope into an in-memory index

pub mod catalog;
pub mod error;
pub mod index;
pub mod instance;
pub mod source;

pub use catalog::{Catalog, Predicate, RefreshStatus, ServiceCatalog, REFRESH_INTERVAL};
pub use error::{CatalogError, ErrorCode, Result};
pub use index::Index;
pub use instance::{Endpoint, EndpointType, Service, ServiceInstance, STATUS_UP};
pub use source::{
    DirectorySource, EndpointAddress, EndpointPort, EndpointSubset, EndpointsRecord, Protocol,
};
