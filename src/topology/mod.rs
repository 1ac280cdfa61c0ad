//! Topology descriptor handling.
//!
//! This module contains the node and link identifiers and the rewrite that
//! collapses each node's border routers into one and moves every
//! inter-domain link onto the shared lab subnet.

pub mod types;
pub mod consolidate;

// Re-export key types and functions for easier access
pub use types::{LinkKey, NodeId};
pub use consolidate::{consolidate_topology, update_topology_file, ConsolidationSummary, CONSOLIDATED_BR_ID};
