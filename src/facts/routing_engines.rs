//! Routing-engine facts.
//!
//! Normalizes `get-route-engine-information` replies from every Junos
//! hardware family into one schema:
//!
//! | Key      | Value                                                      |
//! |----------|------------------------------------------------------------|
//! | `2RE`    | `true` when the reply carries more than one routing engine |
//! | `RE<n>`  | per-RE object (`mastership_state`, `status`, `model`, `up_time`, `last_reboot_reason`) |
//! | `master` | the master RE name, or a list when several claim mastership |
//!
//! Reply shapes differ by platform:
//!
//! - **Single RE**: one `route-engine`, no `slot` → `RE0`
//! - **Dual-RE chassis** (MX, T, M): `route-engine` elements carry `slot`
//! - **Virtual chassis**: each RE sits under a `multi-routing-engine-item`
//!   whose `re-name` (`fpc0`, `member1`, ...) carries the index
//! - **Fabric platforms** (QFabric): the plain RPC is rejected and must be
//!   scoped with `infrastructure=FM-0`
//!
//! `2RE` and `master` are left untouched when the reply does not warrant
//! them; their absence means "unknown / not multi-RE", never `false`.

use super::{FactCollector, Facts};
use crate::error::{Error, Result};
use crate::rpc::{RpcCaller, RpcReply};
use crate::xml::XmlElement;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Infrastructure instance queried on fabric platforms.
pub const DEFAULT_INFRASTRUCTURE: &str = "FM-0";

/// First decimal digit of a multi-instance `re-name`.
static RE_NAME_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d").expect("Invalid re-name digit regex"));

/// Options for [`facts_routing_engines_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingEngineOptions {
    /// `infrastructure` argument used when the plain RPC fails
    pub infrastructure: String,
    /// Log a warning when two records resolve to the same `RE<n>`
    pub warn_on_duplicate: bool,
}

impl Default for RoutingEngineOptions {
    fn default() -> Self {
        Self {
            infrastructure: DEFAULT_INFRASTRUCTURE.to_string(),
            warn_on_duplicate: true,
        }
    }
}

impl From<&crate::config::FactsConfig> for RoutingEngineOptions {
    fn from(config: &crate::config::FactsConfig) -> Self {
        Self {
            infrastructure: config.infrastructure.clone(),
            warn_on_duplicate: config.warn_on_duplicate_re,
        }
    }
}

// ============================================================================
// Per-RE record
// ============================================================================

/// Fields extracted from one `route-engine` element.
///
/// Fields whose element is missing stay `None` and are left out of the
/// serialized object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEngineRecord {
    /// `mastership-state` (`master`, `backup`, `disabled`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastership_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reboot_reason: Option<String>,
}

impl RouteEngineRecord {
    /// Read the known children of a `route-engine` element.
    pub fn from_element<E: XmlElement>(re: &E) -> Self {
        let field = |tag: &str| {
            re.find_child(tag)
                .map(|child| child.text().unwrap_or_default().to_string())
        };

        Self {
            mastership_state: field("mastership-state"),
            status: field("status"),
            model: field("model"),
            up_time: field("up-time"),
            last_reboot_reason: field("last-reboot-reason"),
        }
    }

    /// Whether this RE counts toward the mastership summary.
    ///
    /// Only a `"master"` found past the first character counts. Junos
    /// surrounds the value with newlines (`"\nmaster\n"`), so a bare
    /// `"master"` at offset 0 is not counted.
    pub fn claims_mastership(&self) -> bool {
        self.mastership_state
            .as_deref()
            .and_then(|state| state.find("master"))
            .is_some_and(|index| index > 0)
    }

    /// The fact value stored under `RE<n>`.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

// ============================================================================
// Mastership summary
// ============================================================================

/// Device-wide mastership summary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mastership {
    /// No RE reports mastership
    #[default]
    None,
    /// Exactly one master
    Single(String),
    /// Several REs claim mastership, in document order
    Multiple(Vec<String>),
}

impl Mastership {
    /// Fold into `facts["master"]`; [`Mastership::None`] leaves the key alone.
    pub fn apply(self, facts: &mut Facts) {
        match self {
            Mastership::None => {}
            Mastership::Single(name) => facts.set("master", serde_json::json!(name)),
            Mastership::Multiple(names) => facts.set("master", serde_json::json!(names)),
        }
    }
}

impl From<Vec<String>> for Mastership {
    fn from(mut masters: Vec<String>) -> Self {
        match masters.len() {
            0 => Mastership::None,
            1 => Mastership::Single(masters.remove(0)),
            _ => Mastership::Multiple(masters),
        }
    }
}

// ============================================================================
// Canonical RE name
// ============================================================================

/// Canonical `RE<n>` name of a `route-engine` element.
///
/// Multi-instance platforms are named after the first digit of the ancestor
/// `multi-routing-engine-item/re-name` (the outermost one when items nest);
/// everything else after the `slot` child, defaulting to slot 0.
///
/// Returns [`Error::MalformedReply`] when `re-name` holds no digit. The device
/// is expected to always encode the member index there.
pub fn canonical_re_name<E: XmlElement>(re: &E) -> Result<String> {
    if let Some(re_name) = re
        .ancestor_select("multi-routing-engine-item", "re-name")
        .first()
    {
        let text = re_name.text().unwrap_or_default();
        return RE_NAME_DIGIT
            .find(text)
            .map(|digit| format!("RE{}", digit.as_str()))
            .ok_or_else(|| {
                Error::malformed_reply("re-name", format!("no digit in '{}'", text.trim()))
            });
    }

    let slot = re
        .find_child("slot")
        .and_then(|slot| slot.text().map(str::to_string))
        .unwrap_or_else(|| "0".to_string());
    Ok(format!("RE{}", slot))
}

// ============================================================================
// Extraction
// ============================================================================

/// Fold every `route-engine` under `root` into `facts`.
///
/// Records are processed in document order. Facts for records before a
/// malformed `re-name` are kept when it fails.
pub fn normalize_route_engines<E: XmlElement>(
    root: &E,
    facts: &mut Facts,
    options: &RoutingEngineOptions,
) -> Result<()> {
    let engines = root.select_all("route-engine");
    if engines.len() > 1 {
        facts.set("2RE", serde_json::json!(true));
    }

    let mut seen = HashSet::new();
    let mut masters = Vec::new();

    for re in &engines {
        let name = canonical_re_name(re)?;
        let record = RouteEngineRecord::from_element(re);

        if !seen.insert(name.clone()) && options.warn_on_duplicate {
            warn!(re = %name, "duplicate routing engine in reply, keeping the last one");
        }

        debug!(re = %name, state = ?record.mastership_state, "routing engine");
        facts.set(name.clone(), record.to_value());

        if record.claims_mastership() {
            masters.push(name);
        }
    }

    Mastership::from(masters).apply(facts);
    Ok(())
}

/// Fetch routing-engine information, falling back to the infrastructure
/// scoped form.
///
/// Any [`RpcError`](crate::rpc::RpcError) on the first call triggers exactly
/// one retry; the retry's error is returned unchanged.
async fn fetch_route_engine_information(
    rpc: &dyn RpcCaller,
    infrastructure: &str,
) -> Result<RpcReply> {
    match rpc.get_route_engine_information(None).await {
        Ok(reply) => Ok(reply),
        Err(first) => {
            debug!(
                host = rpc.host(),
                error = %first,
                infrastructure,
                "route engine query failed, retrying with infrastructure"
            );
            Ok(rpc.get_route_engine_information(Some(infrastructure)).await?)
        }
    }
}

/// Gather routing-engine facts with default options.
pub async fn facts_routing_engines<'f>(
    rpc: &dyn RpcCaller,
    facts: &'f mut Facts,
) -> Result<&'f mut Facts> {
    facts_routing_engines_with(rpc, facts, &RoutingEngineOptions::default()).await
}

/// Gather routing-engine facts into `facts` and return the same table.
#[instrument(skip_all, fields(host = rpc.host()))]
pub async fn facts_routing_engines_with<'f>(
    rpc: &dyn RpcCaller,
    facts: &'f mut Facts,
    options: &RoutingEngineOptions,
) -> Result<&'f mut Facts> {
    let reply = fetch_route_engine_information(rpc, &options.infrastructure).await?;
    let doc = reply.document()?;

    normalize_route_engines(&doc.root_element(), facts, options)?;
    Ok(facts)
}

// ============================================================================
// Collector
// ============================================================================

/// [`FactCollector`] for routing-engine facts.
#[derive(Debug, Clone, Default)]
pub struct RoutingEngineFacts {
    options: RoutingEngineOptions,
}

impl RoutingEngineFacts {
    /// Collector with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector with explicit options
    pub fn with_options(options: RoutingEngineOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl FactCollector for RoutingEngineFacts {
    fn name(&self) -> &'static str {
        "routing_engines"
    }

    async fn collect(&self, rpc: &dyn RpcCaller, facts: &mut Facts) -> Result<()> {
        facts_routing_engines_with(rpc, facts, &self.options).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
