//! Error types for junos-facts.
//!
//! This module defines the error types returned by fact collectors and the
//! logging setup. RPC-level failures keep their own type,
//! [`RpcError`](crate::rpc::RpcError), and are wrapped here unchanged.

use crate::rpc::RpcError;
use thiserror::Error;

/// Result type alias for junos-facts operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for junos-facts.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Device Errors
    // ========================================================================
    /// An RPC failed (after any fallback the caller attempted).
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The reply is not well-formed XML.
    #[error("XML parse error: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The reply parsed but does not have the expected shape.
    #[error("Malformed reply at <{element}>: {message}")]
    MalformedReply {
        /// Element that violated the expected shape
        element: String,
        /// Error message
        message: String,
    },

    /// A fact collector failed while gathering in strict mode.
    #[error("Fact collector '{name}' failed: {message}")]
    Collector {
        /// Collector name
        name: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates a new malformed reply error.
    pub fn malformed_reply(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedReply {
            element: element.into(),
            message: message.into(),
        }
    }

    /// Creates a new collector error.
    pub fn collector(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collector {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns true if retrying later may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Rpc(e) => e.is_transport(),
            _ => false,
        }
    }
}
