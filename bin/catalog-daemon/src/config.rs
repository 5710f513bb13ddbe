//! Daemon configuration from environment variables

use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const NAMESPACE_VAR: &str = "CATALOG_NAMESPACE";
pub const LOG_FORMAT_VAR: &str = "CATALOG_LOG_FORMAT";
pub const REPORT_INTERVAL_VAR: &str = "CATALOG_REPORT_INTERVAL_SECS";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Namespace to mirror
    pub namespace: String,
    pub log_format: LogFormat,
    /// How often a catalog summary is logged
    pub report_interval: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            log_format: LogFormat::Text,
            report_interval: Duration::from_secs(60),
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(namespace) = lookup(NAMESPACE_VAR).filter(|ns| !ns.is_empty()) {
            config.namespace = namespace;
        }

        if let Some(format) = lookup(LOG_FORMAT_VAR) {
            config.log_format = match format.to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                other => bail!("{} must be \"text\" or \"json\", got {:?}", LOG_FORMAT_VAR, other),
            };
        }

        if let Some(secs) = lookup(REPORT_INTERVAL_VAR) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {:?}", REPORT_INTERVAL_VAR, secs))?;
            if secs == 0 {
                bail!("{} must be greater than zero", REPORT_INTERVAL_VAR);
            }
            config.report_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
