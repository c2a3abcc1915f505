//! Device facts gathering for junos-facts
//!
//! [`Facts`] is the table every collector writes into. Collectors only add or
//! overwrite keys; nothing in this crate removes a fact once it is set.

pub mod gatherer;
pub mod routing_engines;

use crate::error::Result;
use crate::rpc::RpcCaller;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use gatherer::{FactsGatherer, GatherReport};
pub use routing_engines::{
    facts_routing_engines, facts_routing_engines_with, Mastership, RouteEngineRecord,
    RoutingEngineFacts, RoutingEngineOptions,
};

/// Facts gathered from a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts {
    data: IndexMap<String, serde_json::Value>,
}

impl Facts {
    /// Create empty facts
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fact, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a fact
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Get a string fact
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(serde_json::Value::as_str)
    }

    /// Get a boolean fact
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(serde_json::Value::as_bool)
    }

    /// Whether a fact is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of top-level facts
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no facts have been set
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fact names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Get all facts
    pub fn all(&self) -> &IndexMap<String, serde_json::Value> {
        &self.data
    }

    /// Render as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl From<IndexMap<String, serde_json::Value>> for Facts {
    fn from(data: IndexMap<String, serde_json::Value>) -> Self {
        Self { data }
    }
}

/// A unit of fact collection run against one device.
#[async_trait]
pub trait FactCollector: Send + Sync {
    /// Name used in logs and gather reports
    fn name(&self) -> &'static str;

    /// Query the device and fold the results into `facts`.
    async fn collect(&self, rpc: &dyn RpcCaller, facts: &mut Facts) -> Result<()>;
}
