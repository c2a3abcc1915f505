//! RPC capability for Junos devices.
//!
//! Fact collectors talk to devices through the [`RpcCaller`] trait: given an
//! operation name and keyword arguments it returns the XML reply or an
//! [`RpcError`]. How the request reaches the device is the implementor's
//! business; [`netconf::NetconfRpc`] provides the NETCONF framing on top of a
//! pluggable [`netconf::NetconfTransport`].
//!
//! Operation names use Rust spelling (`get_route_engine_information`) and are
//! mapped to Junos RPC tags (`get-route-engine-information`) by [`rpc_tag`].
//!
//! # Example
//!
//! ```rust,ignore
//! use junos_facts::rpc::{RpcArgs, RpcCaller};
//!
//! let reply = rpc.get_route_engine_information(None).await?;
//! let doc = reply.document()?;
//! ```

pub mod netconf;

use async_trait::async_trait;
use indexmap::IndexMap;
use thiserror::Error;

pub use netconf::NetconfError;

/// Operation name for `show chassis routing-engine`.
pub const GET_ROUTE_ENGINE_INFORMATION: &str = "get_route_engine_information";

/// Errors surfaced by an [`RpcCaller`].
///
/// Every variant means "the operation did not produce a usable reply". Fact
/// collectors that retry with different arguments treat them all alike.
#[derive(Error, Debug, Clone)]
pub enum RpcError {
    /// Could not reach the device.
    #[error("ConnectError({host}): {message}")]
    ConnectionFailed {
        /// Target host
        host: String,
        /// Error message
        message: String,
    },

    /// The device did not answer in time.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The device answered with one or more `<rpc-error>` elements.
    #[error("RPC '{}' rejected by device: {}\n{}", .operation, summarize_errors(.errors), .reply)]
    Rejected {
        /// Operation that was rejected
        operation: String,
        /// Parsed `<rpc-error>` elements
        errors: Vec<NetconfError>,
        /// Pretty-printed reply
        reply: String,
    },

    /// Session-level failure after the connection was established.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The reply could not be parsed as XML.
    #[error("Malformed RPC reply: {0}")]
    MalformedReply(String),
}

impl RpcError {
    /// Creates a new connection failed error.
    pub fn connection_failed(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Returns true for failures below the RPC layer (connect, timeout, session).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RpcError::ConnectionFailed { .. } | RpcError::Timeout(_) | RpcError::Transport(_)
        )
    }
}

fn summarize_errors(errors: &[NetconfError]) -> String {
    match errors {
        [] => "no error details".to_string(),
        [single] => single.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Keyword arguments of an RPC, in insertion order.
pub type RpcArgs = IndexMap<String, String>;

/// Raw XML reply of a successful RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcReply {
    xml: String,
}

impl RpcReply {
    /// Wrap reply text.
    pub fn new(xml: impl Into<String>) -> Self {
        Self { xml: xml.into() }
    }

    /// The reply text.
    pub fn as_str(&self) -> &str {
        &self.xml
    }

    /// Parse the reply into a queryable document.
    pub fn document(&self) -> Result<roxmltree::Document<'_>, roxmltree::Error> {
        roxmltree::Document::parse(&self.xml)
    }
}

/// Map a Rust-style operation name to its Junos RPC tag.
pub fn rpc_tag(operation: &str) -> String {
    operation.replace('_', "-")
}

/// Capability to invoke RPCs on one device.
#[async_trait]
pub trait RpcCaller: Send + Sync {
    /// Identifier of the device, used in logs.
    fn host(&self) -> &str;

    /// Invoke `operation` with keyword arguments.
    async fn call(&self, operation: &str, args: &RpcArgs) -> RpcResult<RpcReply>;

    /// `get-route-engine-information`, optionally scoped to an infrastructure
    /// instance (required on fabric platforms).
    async fn get_route_engine_information(
        &self,
        infrastructure: Option<&str>,
    ) -> RpcResult<RpcReply> {
        let mut args = RpcArgs::new();
        if let Some(infrastructure) = infrastructure {
            args.insert("infrastructure".to_string(), infrastructure.to_string());
        }
        self.call(GET_ROUTE_ENGINE_INFORMATION, &args).await
    }
}
