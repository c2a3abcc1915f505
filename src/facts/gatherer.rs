//! Ordered execution of fact collectors against one device.
//!
//! A failing collector does not spoil the others by default: it is logged,
//! recorded in the [`GatherReport`], and skipped. Strict mode returns the first
//! failure instead.

use super::{FactCollector, Facts, RoutingEngineFacts, RoutingEngineOptions};
use crate::config::FactsConfig;
use crate::error::{Error, Result};
use crate::rpc::RpcCaller;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

/// Outcome of one [`FactsGatherer::gather`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatherReport {
    /// Collectors that completed
    pub succeeded: Vec<&'static str>,
    /// Collectors that failed, with the error message
    pub failed: Vec<(&'static str, String)>,
}

impl GatherReport {
    /// Whether every collector completed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs registered collectors in registration order.
pub struct FactsGatherer {
    collectors: Vec<Arc<dyn FactCollector>>,
    ignore_failures: bool,
}

impl Default for FactsGatherer {
    fn default() -> Self {
        Self::new()
    }
}

impl FactsGatherer {
    /// Create an empty gatherer that ignores collector failures
    pub fn new() -> Self {
        Self {
            collectors: Vec::new(),
            ignore_failures: true,
        }
    }

    /// Create a gatherer with all built-in collectors
    pub fn with_builtins(config: &FactsConfig) -> Self {
        let mut gatherer = Self::new().ignore_failures(config.ignore_failures);
        gatherer.register(Arc::new(RoutingEngineFacts::with_options(
            RoutingEngineOptions::from(config),
        )));
        gatherer
    }

    /// Set the failure policy
    pub fn ignore_failures(mut self, ignore: bool) -> Self {
        self.ignore_failures = ignore;
        self
    }

    /// Register a collector
    pub fn register(&mut self, collector: Arc<dyn FactCollector>) {
        self.collectors.push(collector);
    }

    /// Names of the registered collectors, in run order
    pub fn names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// Run every collector against `rpc`, folding results into `facts`.
    pub async fn gather(&self, rpc: &dyn RpcCaller, facts: &mut Facts) -> Result<GatherReport> {
        let mut report = GatherReport::default();

        for collector in &self.collectors {
            let name = collector.name();
            let span = info_span!("collect", host = rpc.host(), collector = name);

            match collector.collect(rpc, facts).instrument(span).await {
                Ok(()) => {
                    debug!(collector = name, "facts collected");
                    report.succeeded.push(name);
                }
                Err(e) if self.ignore_failures => {
                    warn!(collector = name, error = %e, "fact collector failed, skipping");
                    report.failed.push((name, e.to_string()));
                }
                Err(e) => return Err(Error::collector(name, e.to_string())),
            }
        }

        Ok(report)
    }
}
