//! Identifiers shared by the node registry and the link rewriter.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Numeric AS identifier of one emulated node (`ASff00_0_110` -> 110)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Extract the trailing `_<digits>` of an AS directory name
    pub fn from_as_name(as_name: &str) -> Option<NodeId> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| Regex::new(r"_(\d+)$").expect("valid AS name regex"));
        let captures = pattern.captures(as_name)?;
        captures[1].parse().ok().map(NodeId)
    }

    /// Extract the AS number after the last `:` of an ISD-AS identifier
    /// (`1-ff00:0:111` -> 111)
    pub fn from_isd_as(isd_as: &str) -> Option<NodeId> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| Regex::new(r":(\d+)$").expect("valid ISD-AS regex"));
        let captures = pattern.captures(isd_as)?;
        captures[1].parse().ok().map(NodeId)
    }

    /// Name of the lab node (`as_110`)
    pub fn node_name(&self) -> String {
        format!("as_{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order-independent identity of one physical link between two nodes.
///
/// `ordinal` separates parallel links between the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKey {
    pub low: NodeId,
    pub high: NodeId,
    pub ordinal: u32,
}

impl LinkKey {
    pub fn new(a: NodeId, b: NodeId, ordinal: u32) -> Self {
        LinkKey {
            low: a.min(b),
            high: a.max(b),
            ordinal,
        }
    }

    /// The sorted node pair, without the ordinal
    pub fn pair(&self) -> (NodeId, NodeId) {
        (self.low, self.high)
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}#{}", self.low, self.high, self.ordinal)
    }
}
