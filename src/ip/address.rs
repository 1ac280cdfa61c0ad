//! Node address mapping.
//!
//! Every rewritten address goes through [`AddressMapper`], so changing the
//! lab addressing scheme only touches this file.

use crate::topology::NodeId;

/// Maps node identifiers onto hosts of the shared lab subnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMapper {
    subnet_prefix: String,
}

impl AddressMapper {
    /// `subnet_prefix` holds the first three octets, e.g. `10.0.0`
    pub fn new(subnet_prefix: impl Into<String>) -> Self {
        AddressMapper {
            subnet_prefix: subnet_prefix.into(),
        }
    }

    /// Host octet of a node. Identity on the AS number (110 -> 110).
    pub fn host_octet(&self, node: NodeId) -> u32 {
        node.0
    }

    /// Full IPv4 address of a node
    pub fn ip(&self, node: NodeId) -> String {
        format!("{}.{}", self.subnet_prefix, self.host_octet(node))
    }

    /// `ip:port` for a node
    pub fn socket_addr(&self, node: NodeId, port: impl std::fmt::Display) -> String {
        format!("{}:{}", self.ip(node), port)
    }

    /// Move `host:port` onto the node's host, keeping the original port.
    ///
    /// Returns `None` when the address carries no port.
    pub fn remap(&self, node: NodeId, original: &str) -> Option<String> {
        let port = port_of(original)?;
        Some(self.socket_addr(node, port))
    }

    /// Like [`remap`](Self::remap), falling back to `default_port` when the
    /// original has no usable port
    pub fn remap_or(&self, node: NodeId, original: Option<&str>, default_port: u16) -> String {
        original
            .and_then(|addr| self.remap(node, addr))
            .unwrap_or_else(|| self.socket_addr(node, default_port))
    }
}

impl Default for AddressMapper {
    fn default() -> Self {
        AddressMapper::new(crate::config::DEFAULT_SUBNET_PREFIX)
    }
}

/// Port component of a `host:port` string. IPv6 hosts in brackets are
/// handled since only the text after the last `:` is considered.
pub fn port_of(addr: &str) -> Option<&str> {
    let (_, port) = addr.rsplit_once(':')?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(port)
}
