//! Kubernetes Endpoints as a catalog directory source
pub mod client;
pub mod discovery;

pub use client::KubeClient;
pub use discovery::{endpoints_to_record, EndpointsDirectory, SOURCE_KIND};
