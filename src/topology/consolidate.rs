//! Border router consolidation for `topology.json`.
//!
//! A generated AS may run several border router processes, each owning some
//! of the AS's inter-domain interfaces. In the lab each node runs a single
//! router, so all interfaces are merged under one entry and every link is
//! moved onto the shared subnet with a port from the run-wide
//! [`LinkPortAllocator`].
//!
//! ## Link matching
//!
//! The two ends of a link are rewritten independently, each while converting
//! its own node. They agree on a port because both derive the same
//! [`LinkKey`]: the sorted node pair plus an ordinal counting earlier links
//! to the same peer in declaration order. This relies on both descriptors
//! listing parallel links to each other in the same relative order.

use crate::error::{ConvertError, Result};
use crate::ip::{AddressMapper, LinkPortAllocator};
use crate::topology::NodeId;
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Id of the single border router left in every topology
pub const CONSOLIDATED_BR_ID: &str = "br";

/// Top-level key used only by the local test environment
pub const TEST_DISPATCHER_KEY: &str = "test_dispatcher";

const BORDER_ROUTERS_KEY: &str = "border_routers";

const ADDRESSED_SERVICES: [&str; 2] = ["control_service", "discovery_service"];

/// What a consolidation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationSummary {
    /// Border router entries found before merging
    pub border_routers: usize,
    /// Interfaces in the merged entry
    pub interfaces: usize,
    /// Interfaces whose underlay was moved onto an allocated port
    pub links_rewritten: usize,
    /// Interface ids declared by more than one border router
    pub id_collisions: Vec<String>,
}

/// Rewrite one node's topology in place.
///
/// Service addresses move to the node's host, all border routers collapse
/// into [`CONSOLIDATED_BR_ID`], link underlays get allocated ports and the
/// `test_dispatcher` section is dropped.
pub fn consolidate_topology(
    topology: &mut Value,
    node: NodeId,
    mapper: &AddressMapper,
    ports: &mut LinkPortAllocator,
) -> ConsolidationSummary {
    let mut summary = ConsolidationSummary::default();
    let Some(root) = topology.as_object_mut() else {
        debug!("Topology for node {} is not an object, leaving it untouched", node);
        return summary;
    };

    root.shift_remove(TEST_DISPATCHER_KEY);

    for service_kind in ADDRESSED_SERVICES {
        if let Some(Value::Object(services)) = root.get_mut(service_kind) {
            for service in services.values_mut() {
                remap_addr_field(service, "addr", node, mapper);
            }
        }
    }

    let merged = match root.get(BORDER_ROUTERS_KEY) {
        Some(Value::Object(border_routers)) => {
            Some(merge_border_routers(border_routers, node, mapper, &mut summary))
        }
        _ => None,
    };

    if let Some((internal_addr, mut interfaces)) = merged {
        summary.links_rewritten = assign_link_ports(&mut interfaces, node, mapper, ports);
        summary.interfaces = interfaces.len();

        let mut entry = Map::new();
        if let Some(addr) = internal_addr {
            entry.insert("internal_addr".to_string(), Value::String(addr));
        }
        entry.insert("interfaces".to_string(), Value::Object(interfaces));

        let mut consolidated = Map::new();
        consolidated.insert(CONSOLIDATED_BR_ID.to_string(), Value::Object(entry));
        root.insert(BORDER_ROUTERS_KEY.to_string(), Value::Object(consolidated));
    }

    summary
}

/// Union of all interface maps, in declaration order, plus the remapped
/// internal address of the last router that declares one
fn merge_border_routers(
    border_routers: &Map<String, Value>,
    node: NodeId,
    mapper: &AddressMapper,
    summary: &mut ConsolidationSummary,
) -> (Option<String>, Map<String, Value>) {
    let mut internal_addr = None;
    let mut interfaces = Map::new();

    for (br_name, br_data) in border_routers {
        summary.border_routers += 1;

        if let Some(addr) = br_data.get("internal_addr").and_then(Value::as_str) {
            match mapper.remap(node, addr) {
                Some(remapped) => internal_addr = Some(remapped),
                None => debug!("Border router {} has internal_addr without port: {}", br_name, addr),
            }
        }

        if let Some(Value::Object(br_interfaces)) = br_data.get("interfaces") {
            for (interface_id, interface) in br_interfaces {
                if interfaces.insert(interface_id.clone(), interface.clone()).is_some() {
                    debug!(
                        "Interface {} redeclared by border router {} on node {}, keeping the later one",
                        interface_id, br_name, node
                    );
                    summary.id_collisions.push(interface_id.clone());
                }
            }
        }
    }

    (internal_addr, interfaces)
}

/// Point every resolvable interface at its allocated link port.
/// Returns the number of interfaces rewritten.
fn assign_link_ports(
    interfaces: &mut Map<String, Value>,
    node: NodeId,
    mapper: &AddressMapper,
    ports: &mut LinkPortAllocator,
) -> usize {
    let mut link_counters: HashMap<(NodeId, NodeId), u32> = HashMap::new();
    let mut rewritten = 0;

    for (interface_id, interface) in interfaces.iter_mut() {
        let Some(interface) = interface.as_object_mut() else {
            continue;
        };
        if !interface.contains_key("underlay") {
            continue;
        }

        let peer = interface
            .get("isd_as")
            .and_then(Value::as_str)
            .and_then(NodeId::from_isd_as);
        let Some(peer) = peer else {
            debug!(
                "Interface {} on node {} has no usable isd_as, underlay left as is",
                interface_id, node
            );
            continue;
        };

        let pair = (node.min(peer), node.max(peer));
        let counter = link_counters.entry(pair).or_insert(0);
        let ordinal = *counter;
        *counter += 1;

        let port = ports.allocate(node, peer, ordinal);

        if let Some(Value::Object(underlay)) = interface.get_mut("underlay") {
            if underlay.contains_key("local") {
                underlay.insert("local".to_string(), Value::String(mapper.socket_addr(node, port)));
            }
            if underlay.contains_key("remote") {
                underlay.insert("remote".to_string(), Value::String(mapper.socket_addr(peer, port)));
            }
        }
        rewritten += 1;
    }

    rewritten
}

fn remap_addr_field(service: &mut Value, field: &str, node: NodeId, mapper: &AddressMapper) {
    let Some(service) = service.as_object_mut() else {
        return;
    };
    let remapped = service
        .get(field)
        .and_then(Value::as_str)
        .and_then(|addr| mapper.remap(node, addr));
    if let Some(remapped) = remapped {
        service.insert(field.to_string(), Value::String(remapped));
    }
}

/// Load, consolidate and atomically rewrite a `topology.json` file
pub fn update_topology_file(
    path: &Path,
    node: NodeId,
    mapper: &AddressMapper,
    ports: &mut LinkPortAllocator,
) -> Result<ConsolidationSummary> {
    let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    let mut topology: Value = serde_json::from_str(&content).map_err(|e| ConvertError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    let summary = consolidate_topology(&mut topology, node, mapper, ports);

    let mut output = serde_json::to_string_pretty(&topology).map_err(|e| ConvertError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    output.push('\n');
    crate::utils::write_atomic(path, output.as_bytes())?;

    Ok(summary)
}
