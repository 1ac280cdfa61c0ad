//! Link port allocation.
//!
//! All nodes share one lab subnet, so every inter-node link needs its own
//! underlay port. The allocator is owned by the run and passed to each
//! per-node rewrite; both endpoints of a link ask for the same [`LinkKey`]
//! independently and must receive the same port.

use crate::topology::{LinkKey, NodeId};
use std::collections::BTreeMap;

/// Hands out one port per distinct link, memoized by [`LinkKey`]
#[derive(Debug, Clone)]
pub struct LinkPortAllocator {
    base_port: u32,
    next_port: u32,
    assignments: BTreeMap<LinkKey, u32>,
}

impl LinkPortAllocator {
    pub fn new(base_port: u16) -> Self {
        LinkPortAllocator {
            base_port: u32::from(base_port),
            next_port: u32::from(base_port),
            assignments: BTreeMap::new(),
        }
    }

    /// Port for the `ordinal`-th link between `a` and `b`.
    ///
    /// Idempotent and symmetric in `a`/`b`. A new key takes the next counter
    /// value; the counter is not checked against the port range.
    pub fn allocate(&mut self, a: NodeId, b: NodeId, ordinal: u32) -> u32 {
        let key = LinkKey::new(a, b, ordinal);
        if let Some(port) = self.assignments.get(&key) {
            return *port;
        }

        let port = self.next_port;
        self.assignments.insert(key, port);
        self.next_port += 1;
        log::debug!("Allocated port {} for link {}", port, key);
        port
    }

    /// Port already assigned to a link, if any
    pub fn get(&self, key: &LinkKey) -> Option<u32> {
        self.assignments.get(key).copied()
    }

    pub fn base_port(&self) -> u32 {
        self.base_port
    }

    /// Number of distinct links seen so far
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// All assignments ordered by link key
    pub fn assignments(&self) -> &BTreeMap<LinkKey, u32> {
        &self.assignments
    }
}

impl Default for LinkPortAllocator {
    fn default() -> Self {
        LinkPortAllocator::new(crate::config::DEFAULT_BASE_PORT)
    }
}
