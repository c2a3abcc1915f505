//! NETCONF framing for Junos RPCs (RFC 6241, RFC 6242).
//!
//! [`NetconfRpc`] turns `(operation, args)` into an `<rpc>` envelope, hands it
//! to a [`NetconfTransport`], and interprets the `<rpc-reply>`:
//!
//! - `<rpc-error>` with severity `error` becomes [`RpcError::Rejected`]
//! - `<rpc-error>` with severity `warning` is logged and otherwise ignored
//! - anything else is returned as an [`RpcReply`]
//!
//! Keyword arguments become child elements of the operation tag. An argument
//! whose value is `"true"` is sent as an empty flag element, matching how
//! Junos spells boolean RPC options (`<detail/>`).

use super::{rpc_tag, RpcArgs, RpcCaller, RpcError, RpcReply, RpcResult};
use crate::xml::{escape_xml, pretty_print};
use async_trait::async_trait;
use roxmltree::{Document, Node};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, trace, warn};

// ============================================================================
// NETCONF Constants
// ============================================================================

/// NETCONF 1.0 message delimiter (used with SSH subsystem framing)
pub const NETCONF_1_0_DELIMITER: &str = "]]>]]>";

/// NETCONF base namespace (RFC 6241)
const NETCONF_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

// ============================================================================
// Transport
// ============================================================================

/// Byte pipe to a NETCONF server.
///
/// Implementations own the SSH session (or whatever carries the messages) and
/// map their failures onto the transport variants of [`RpcError`].
#[async_trait]
pub trait NetconfTransport: Send + Sync {
    /// Device identifier.
    fn host(&self) -> &str;

    /// Send one framed message and return the framed reply.
    async fn exchange(&self, message: &str) -> RpcResult<String>;
}

// ============================================================================
// NETCONF RPC client
// ============================================================================

/// [`RpcCaller`] speaking NETCONF 1.0 over a [`NetconfTransport`].
pub struct NetconfRpc<T> {
    transport: T,
    message_id: AtomicU32,
}

impl<T: NetconfTransport> NetconfRpc<T> {
    /// Create a client over an established transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            message_id: AtomicU32::new(1),
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn next_message_id(&self) -> u32 {
        self.message_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: NetconfTransport> RpcCaller for NetconfRpc<T> {
    fn host(&self) -> &str {
        self.transport.host()
    }

    async fn call(&self, operation: &str, args: &RpcArgs) -> RpcResult<RpcReply> {
        let message_id = self.next_message_id();
        let request = build_rpc(operation, args, message_id);
        trace!(host = self.host(), message_id, "sending {}", request);

        let response = self.transport.exchange(&request).await?;
        parse_reply(operation, &response)
    }
}

/// Build a framed `<rpc>` envelope.
pub fn build_rpc(operation: &str, args: &RpcArgs, message_id: u32) -> String {
    let tag = rpc_tag(operation);

    let body = if args.is_empty() {
        format!("<{}/>", tag)
    } else {
        let children: Vec<String> = args
            .iter()
            .map(|(name, value)| {
                let name = rpc_tag(name);
                if value == "true" {
                    format!("<{}/>", name)
                } else {
                    format!("<{name}>{}</{name}>", escape_xml(value))
                }
            })
            .collect();
        format!("<{tag}>{}</{tag}>", children.join(""))
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rpc xmlns="{}" message-id="{}">
{}
</rpc>{}"#,
        NETCONF_NS, message_id, body, NETCONF_1_0_DELIMITER
    )
}

/// Interpret a framed `<rpc-reply>`.
pub fn parse_reply(operation: &str, response: &str) -> RpcResult<RpcReply> {
    let body = response
        .trim()
        .trim_end_matches(NETCONF_1_0_DELIMITER)
        .trim();

    let doc = Document::parse(body).map_err(|e| RpcError::MalformedReply(e.to_string()))?;
    let root = doc.root_element();

    let mut errors = Vec::new();
    for node in root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "rpc-error")
    {
        let error = NetconfError::from_node(node);
        if error.is_warning() {
            warn!(operation, "device warning: {}", error);
        } else {
            errors.push(error);
        }
    }

    if !errors.is_empty() {
        debug!(operation, count = errors.len(), "rpc rejected");
        return Err(RpcError::Rejected {
            operation: rpc_tag(operation),
            errors,
            reply: pretty_print(root),
        });
    }

    Ok(RpcReply::new(body))
}

// ============================================================================
// NETCONF Errors
// ============================================================================

/// NETCONF RPC error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetconfError {
    /// Error type (protocol, application, etc.)
    pub error_type: String,
    /// Error tag (e.g., invalid-value, operation-failed)
    pub error_tag: String,
    /// Error severity (error, warning)
    pub error_severity: String,
    /// Error message
    pub error_message: Option<String>,
    /// Error path (configuration element that caused the error)
    pub error_path: Option<String>,
}

impl NetconfError {
    /// Build from an `<rpc-error>` element.
    fn from_node(node: Node<'_, '_>) -> Self {
        let field = |name: &str| {
            node.children()
                .find(|c| c.is_element() && c.tag_name().name() == name)
                .and_then(|c| c.text())
                .map(|t| t.trim().to_string())
        };

        NetconfError {
            error_type: field("error-type").unwrap_or_default(),
            error_tag: field("error-tag").unwrap_or_default(),
            error_severity: field("error-severity").unwrap_or_else(|| "error".to_string()),
            error_message: field("error-message"),
            error_path: field("error-path"),
        }
    }

    /// Warnings do not fail the RPC.
    pub fn is_warning(&self) -> bool {
        self.error_severity.eq_ignore_ascii_case("warning")
    }
}

impl std::fmt::Display for NetconfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.error_tag,
            self.error_message.as_deref().unwrap_or("Unknown error")
        )?;
        if let Some(ref path) = self.error_path {
            write!(f, " at {}", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::GET_ROUTE_ENGINE_INFORMATION;
    use parking_lot::RwLock;

    struct ScriptedTransport {
        reply: String,
        sent: RwLock<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                sent: RwLock::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NetconfTransport for ScriptedTransport {
        fn host(&self) -> &str {
            "qfabric-dg"
        }

        async fn exchange(&self, message: &str) -> RpcResult<String> {
            self.sent.write().push(message.to_string());
            Ok(self.reply.clone())
        }
    }

    const REJECTED: &str = r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" xmlns:junos="http://xml.juniper.net/junos/13.1X50/junos" message-id="1">
<rpc-error>
<error-type>protocol</error-type>
<error-tag>operation-failed</error-tag>
<error-severity>error</error-severity>
<error-message>syntax error, expecting &lt;infrastructure&gt;</error-message>
</rpc-error>
</rpc-reply>
]]>]]>"#;

    #[test]
    fn test_build_rpc_without_args() {
        let rpc = build_rpc(GET_ROUTE_ENGINE_INFORMATION, &RpcArgs::new(), 7);
        assert!(rpc.contains(r#"message-id="7""#));
        assert!(rpc.contains("<get-route-engine-information/>"));
        assert!(rpc.ends_with(NETCONF_1_0_DELIMITER));
    }

    #[test]
    fn test_build_rpc_with_args() {
        let mut args = RpcArgs::new();
        args.insert("infrastructure".to_string(), "FM-0".to_string());
        args.insert("detail".to_string(), "true".to_string());
        let rpc = build_rpc(GET_ROUTE_ENGINE_INFORMATION, &args, 1);
        assert!(rpc.contains(
            "<get-route-engine-information><infrastructure>FM-0</infrastructure><detail/></get-route-engine-information>"
        ));
    }

    #[test]
    fn test_build_rpc_escapes_values() {
        let mut args = RpcArgs::new();
        args.insert("interface_name".to_string(), "<ge-0/0/0>".to_string());
        let rpc = build_rpc("get_interface_information", &args, 1);
        assert!(rpc.contains("<interface-name>&lt;ge-0/0/0&gt;</interface-name>"));
    }

    #[test]
    fn test_parse_reply_ok() {
        let reply = parse_reply(
            GET_ROUTE_ENGINE_INFORMATION,
            "<rpc-reply><route-engine-information><route-engine/></route-engine-information></rpc-reply>\n]]>]]>",
        )
        .unwrap();
        assert!(!reply.as_str().contains(NETCONF_1_0_DELIMITER));
        assert!(reply.document().is_ok());
    }

    #[test]
    fn test_parse_reply_rejected() {
        let err = parse_reply(GET_ROUTE_ENGINE_INFORMATION, REJECTED).unwrap_err();
        match err {
            RpcError::Rejected {
                operation, errors, ..
            } => {
                assert_eq!(operation, "get-route-engine-information");
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].error_tag, "operation-failed");
                assert_eq!(
                    errors[0].error_message.as_deref(),
                    Some("syntax error, expecting <infrastructure>")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_reply_warning_only() {
        let reply = r#"<rpc-reply>
<rpc-error>
<error-severity>warning</error-severity>
<error-message>statement not applicable</error-message>
</rpc-error>
<route-engine-information/>
</rpc-reply>"#;
        assert!(parse_reply(GET_ROUTE_ENGINE_INFORMATION, reply).is_ok());
    }

    #[test]
    fn test_parse_reply_malformed() {
        let err = parse_reply(GET_ROUTE_ENGINE_INFORMATION, "<rpc-reply>").unwrap_err();
        assert!(matches!(err, RpcError::MalformedReply(_)));
    }

    #[tokio::test]
    async fn test_netconf_rpc_message_ids_increase() {
        let rpc = NetconfRpc::new(ScriptedTransport::new("<rpc-reply><ok/></rpc-reply>"));
        rpc.get_route_engine_information(None).await.unwrap();
        rpc.get_route_engine_information(Some("FM-0")).await.unwrap();

        let sent = rpc.transport().sent.read();
        assert!(sent[0].contains(r#"message-id="1""#));
        assert!(sent[1].contains(r#"message-id="2""#));
        assert!(sent[1].contains("<infrastructure>FM-0</infrastructure>"));
    }

    #[tokio::test]
    async fn test_netconf_rpc_rejection_surfaces() {
        let rpc = NetconfRpc::new(ScriptedTransport::new(REJECTED));
        let err = rpc.get_route_engine_information(None).await.unwrap_err();
        assert!(err.to_string().contains("<error-tag>operation-failed</error-tag>"));
    }

    #[test]
    fn test_netconf_error_display() {
        let error = NetconfError {
            error_type: "application".to_string(),
            error_tag: "invalid-value".to_string(),
            error_severity: "error".to_string(),
            error_message: Some("Invalid interface name".to_string()),
            error_path: Some("/configuration/interfaces/interface[name='ge-0/0/0']".to_string()),
        };

        let display = format!("{}", error);
        assert!(display.contains("invalid-value"));
        assert!(display.contains("Invalid interface name"));
        assert!(display.contains("ge-0/0/0"));
        assert!(!error.is_warning());
    }
}
