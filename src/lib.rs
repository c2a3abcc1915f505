//! # junos-facts - Fact gathering for Junos network devices
//!
//! junos-facts issues RPCs to Junos-family devices and normalizes the XML
//! replies into a flat table of facts about device identity, hardware, and
//! software state.
//!
//! ## Core Concepts
//!
//! - **RPC capability**: anything implementing [`rpc::RpcCaller`]; a NETCONF
//!   framing layer ([`rpc::netconf::NetconfRpc`]) sits on top of a pluggable
//!   transport
//! - **XML queries**: collectors read replies through [`xml::XmlElement`]
//! - **Facts**: the [`facts::Facts`] table collectors write into
//! - **Collectors**: units of fact gathering ([`facts::FactCollector`]), run in
//!   order by [`facts::FactsGatherer`]
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐     ┌─────────────────────┐
//! │  FactsGatherer   │────►│   FactCollector     │
//! │  (ordered runs)  │     │   routing_engines   │
//! └──────────────────┘     └─────────────────────┘
//!          │                          │
//!          ▼                          ▼
//! ┌──────────────────┐     ┌─────────────────────┐
//! │      Facts       │     │     RpcCaller       │
//! └──────────────────┘     │  NetconfRpc<T>      │
//!                          └─────────────────────┘
//!                                     │
//!                                     ▼
//!                          ┌─────────────────────┐
//!                          │  NetconfTransport   │
//!                          │  (SSH, provided by  │
//!                          │   the application)  │
//!                          └─────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use junos_facts::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let rpc = NetconfRpc::new(my_ssh_transport);
//!
//!     let mut facts = Facts::new();
//!     facts_routing_engines(&rpc, &mut facts).await?;
//!
//!     if facts.get_bool("2RE") == Some(true) {
//!         println!("master: {:?}", facts.get("master"));
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::facts::{
        facts_routing_engines, FactCollector, Facts, FactsGatherer, RoutingEngineFacts,
    };
    pub use crate::rpc::netconf::{NetconfRpc, NetconfTransport};
    pub use crate::rpc::{RpcArgs, RpcCaller, RpcError, RpcReply, RpcResult};
    pub use crate::xml::XmlElement;
}

/// Error types and result aliases.
pub mod error;

/// Layered configuration: defaults, files, environment.
pub mod config;

/// tracing-subscriber setup.
pub mod logging;

/// XML query capability used by fact collectors.
pub mod xml;

/// RPC capability and NETCONF framing.
pub mod rpc;

/// Fact table, collectors, and the routing-engine normalizer.
pub mod facts;

/// Returns the current version of junos-facts.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
