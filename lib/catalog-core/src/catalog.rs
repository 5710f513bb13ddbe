//! Read-only catalog mirroring one directory scope

use crate::{CatalogError, DirectorySource, Index, Result, Service, ServiceInstance};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Period of the background refresh loop
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Caller-supplied instance filter
pub type Predicate<'a> = dyn Fn(&ServiceInstance) -> bool + Send + Sync + 'a;

/// Query and mutation surface shared by catalog implementations
#[async_trait::async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Names of services with at least one instance matching `predicate`,
    /// or every service name when no predicate is given.
    ///
    /// Without a predicate, names whose instance list is empty are listed too,
    /// unlike the Go registry's `ListServices`, which skipped them.
    async fn list_services(&self, predicate: Option<&Predicate<'_>>) -> Vec<Service>;

    /// Copies of the instances of `service_name` matching `predicate`
    async fn list(
        &self,
        service_name: &str,
        predicate: Option<&Predicate<'_>>,
    ) -> Result<Vec<ServiceInstance>>;

    /// Copy of a single instance
    async fn instance(&self, instance_id: &str) -> Result<ServiceInstance>;

    async fn register(&self, instance: ServiceInstance) -> Result<ServiceInstance>;

    async fn deregister(&self, instance_id: &str) -> Result<()>;

    async fn renew(&self, instance_id: &str) -> Result<()>;

    async fn set_status(&self, instance_id: &str, status: &str) -> Result<()>;
}

/// Outcome of the most recent refresh cycles
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    /// Number of snapshots installed so far
    pub generation: u64,
    pub last_success: Option<DateTime<Utc>>,
    /// Error from the latest cycle, cleared by the next success
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

/// State shared between the catalog handle and its refresh task
struct Shared {
    scope: String,
    source: Arc<dyn DirectorySource>,
    index: RwLock<Arc<Index>>,
    status: RwLock<RefreshStatus>,
}

impl Shared {
    async fn snapshot(&self) -> Arc<Index> {
        self.index.read().await.clone()
    }

    /// Query the directory and build a new index without touching the live one
    async fn fetch(&self) -> Result<Index> {
        let records = self.source.get_endpoints(&self.scope).await?;
        Index::build(
            &records,
            self.source.kind(),
            &self.source.endpoints_url(&self.scope),
        )
    }

    /// Swap in a freshly built index, or record why there is none
    async fn install(&self, result: Result<Index>) {
        match result {
            Ok(index) => {
                let services = index.service_count();
                let instances = index.instance_count();
                let index = Arc::new(index);

                // Old index is released outside the lock
                let previous = {
                    let mut current = self.index.write().await;
                    std::mem::replace(&mut *current, index)
                };
                drop(previous);

                let mut status = self.status.write().await;
                status.generation += 1;
                status.last_success = Some(Utc::now());
                status.last_error = None;
                status.consecutive_failures = 0;

                debug!(
                    "Refreshed catalog {} (generation {}): {} services, {} instances",
                    self.scope, status.generation, services, instances
                );
            }
            Err(e) => {
                warn!("Unable to get endpoints for {}: {}", self.scope, e);

                let mut status = self.status.write().await;
                status.last_error = Some(e.to_string());
                status.consecutive_failures = status.consecutive_failures.saturating_add(1);
            }
        }
    }

    async fn refresh(&self) {
        let result = self.fetch().await;
        self.install(result).await;
    }
}

/// Catalog serves lookups from an in-memory index that a background task
/// keeps in sync with a `DirectorySource`.
///
/// The catalog is read-only: mutation calls always fail with
/// `CatalogError::Unsupported`.
pub struct Catalog {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Catalog {
    /// Create a catalog for `scope` and start refreshing it.
    ///
    /// The first refresh runs before this returns. If it fails the catalog
    /// still starts, empty, and the failure is reported through `status()`.
    pub async fn new(scope: impl Into<String>, source: Arc<dyn DirectorySource>) -> Result<Self> {
        Self::start(scope.into(), source, REFRESH_INTERVAL).await
    }

    async fn start(
        scope: String,
        source: Arc<dyn DirectorySource>,
        period: Duration,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            CatalogError::Internal(format!("catalog requires a Tokio runtime: {}", e))
        })?;

        let shared = Arc::new(Shared {
            scope,
            source,
            index: RwLock::new(Arc::new(Index::empty())),
            status: RwLock::new(RefreshStatus::default()),
        });

        shared.refresh().await;

        let cancel = CancellationToken::new();
        let task = runtime.spawn(refresh_loop(shared.clone(), period, cancel.clone()));

        info!(
            "Catalog for {} started ({} source, refresh every {:?})",
            shared.scope,
            shared.source.kind(),
            period
        );

        Ok(Self {
            shared,
            cancel,
            task: Some(task),
        })
    }

    /// Scope (namespace) this catalog mirrors
    pub fn scope(&self) -> &str {
        &self.shared.scope
    }

    pub async fn status(&self) -> RefreshStatus {
        self.shared.status.read().await.clone()
    }

    /// The index as of the latest successful refresh
    pub async fn snapshot(&self) -> Arc<Index> {
        self.shared.snapshot().await
    }

    /// Stop the refresh task and wait for it to exit.
    ///
    /// A directory call already in flight is allowed to finish; its result
    /// is discarded.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Refresh task for {} ended abnormally: {}", self.shared.scope, e);
            }
        }
        info!("Catalog for {} stopped", self.shared.scope);
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn refresh_loop(shared: Arc<Shared>, period: Duration, cancel: CancellationToken) {
    // The first refresh already ran during construction
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = shared.fetch().await;
        if cancel.is_cancelled() {
            debug!("Discarding refresh result for {} after shutdown", shared.scope);
            break;
        }
        shared.install(result).await;
    }

    debug!("Refresh loop for {} exited", shared.scope);
}

fn accepts(predicate: Option<&Predicate<'_>>, instance: &ServiceInstance) -> bool {
    predicate.map_or(true, |p| p(instance))
}

#[async_trait::async_trait]
impl ServiceCatalog for Catalog {
    async fn list_services(&self, predicate: Option<&Predicate<'_>>) -> Vec<Service> {
        let index = self.shared.snapshot().await;

        index
            .services()
            .filter(|(_, instances)| {
                predicate.is_none() || instances.iter().any(|inst| accepts(predicate, inst))
            })
            .map(|(name, _)| Service {
                service_name: name.to_string(),
            })
            .collect()
    }

    async fn list(
        &self,
        service_name: &str,
        predicate: Option<&Predicate<'_>>,
    ) -> Result<Vec<ServiceInstance>> {
        let index = self.shared.snapshot().await;
        let instances = index
            .instances(service_name)
            .ok_or_else(|| CatalogError::NoSuchService(service_name.to_string()))?;

        Ok(instances
            .iter()
            .filter(|inst| accepts(predicate, inst))
            .cloned()
            .collect())
    }

    async fn instance(&self, instance_id: &str) -> Result<ServiceInstance> {
        let index = self.shared.snapshot().await;
        index
            .instance(instance_id)
            .cloned()
            .ok_or_else(|| CatalogError::NoSuchInstance(instance_id.to_string()))
    }

    async fn register(&self, _instance: ServiceInstance) -> Result<ServiceInstance> {
        info!("Unsupported API (Register) called");
        Err(CatalogError::Unsupported("Register"))
    }

    async fn deregister(&self, _instance_id: &str) -> Result<()> {
        info!("Unsupported API (Deregister) called");
        Err(CatalogError::Unsupported("Deregister"))
    }

    async fn renew(&self, _instance_id: &str) -> Result<()> {
        info!("Unsupported API (Renew) called");
        Err(CatalogError::Unsupported("Renew"))
    }

    async fn set_status(&self, _instance_id: &str, _status: &str) -> Result<()> {
        info!("Unsupported API (SetStatus) called");
        Err(CatalogError::Unsupported("SetStatus"))
    }
}
