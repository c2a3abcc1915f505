//! Shared test utilities and fixtures for the junos-facts test suite.
//!
//! This module provides:
//! - A mock [`RpcCaller`] with per-argument scripted replies
//! - Fixture loading helpers
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use junos_facts::rpc::{NetconfError, RpcArgs, RpcCaller, RpcError, RpcReply, RpcResult};

// ============================================================================
// Mock RPC Implementation
// ============================================================================

/// A mock RPC capability for testing collectors.
///
/// Replies are keyed by the `infrastructure` argument (`None` for a plain
/// call). Every call is recorded, and unscripted calls fail with
/// [`RpcError::Transport`].
///
/// # Example
///
/// ```rust,ignore
/// let rpc = MockRpc::new("mx960")
///     .reply(None, load_fixture("route_engine/dual_re_mx.xml"));
///
/// facts_routing_engines(&rpc, &mut facts).await?;
/// assert_eq!(rpc.call_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockRpc {
    host: String,
    responses: RwLock<HashMap<Option<String>, RpcResult<RpcReply>>>,
    calls: RwLock<Vec<(String, RpcArgs)>>,
    call_count: AtomicU32,
}

impl MockRpc {
    /// Create a new mock with no scripted replies.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            responses: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Script a successful reply.
    pub fn reply(self, infrastructure: Option<&str>, xml: impl Into<String>) -> Self {
        self.responses
            .write()
            .insert(infrastructure.map(str::to_string), Ok(RpcReply::new(xml)));
        self
    }

    /// Script a failure.
    pub fn fail(self, infrastructure: Option<&str>, error: RpcError) -> Self {
        self.responses
            .write()
            .insert(infrastructure.map(str::to_string), Err(error));
        self
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The `infrastructure` argument of every call, in order.
    pub fn infrastructures(&self) -> Vec<Option<String>> {
        self.calls
            .read()
            .iter()
            .map(|(_, args)| args.get("infrastructure").cloned())
            .collect()
    }

    /// Operation names of every call, in order.
    pub fn operations(&self) -> Vec<String> {
        self.calls.read().iter().map(|(op, _)| op.clone()).collect()
    }
}

#[async_trait]
impl RpcCaller for MockRpc {
    fn host(&self) -> &str {
        &self.host
    }

    async fn call(&self, operation: &str, args: &RpcArgs) -> RpcResult<RpcReply> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .write()
            .push((operation.to_string(), args.clone()));

        let key = args.get("infrastructure").cloned();
        self.responses.read().get(&key).cloned().unwrap_or_else(|| {
            Err(RpcError::Transport(format!(
                "no scripted reply for {} ({:?})",
                operation, key
            )))
        })
    }
}

/// The error a fabric node returns for an unscoped route-engine query.
pub fn rejected(operation: &str) -> RpcError {
    RpcError::Rejected {
        operation: operation.to_string(),
        errors: vec![NetconfError {
            error_type: "protocol".to_string(),
            error_tag: "operation-failed".to_string(),
            error_severity: "error".to_string(),
            error_message: Some("syntax error, expecting <infrastructure>".to_string()),
            error_path: None,
        }],
        reply: String::new(),
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Directory holding the test fixtures.
pub fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Read a fixture relative to [`fixtures_path`].
pub fn load_fixture(name: &str) -> String {
    let path = fixtures_path().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}
