//! Conversion orchestrator.
//!
//! This module drives one run: discover the nodes, convert each AS directory
//! into its lab node with a shared link port allocator, then write the lab
//! description.
//!
//! ## Data Flow
//!
//! 1. **Discovery**: build the node mapping from the source root
//! 2. **Per node**: copy credentials, rewrite `br.toml`, `cs.toml`,
//!    `sd.toml` and consolidate `topology.json`
//! 3. **Lab**: emit startup scripts and `lab.conf`
//!
//! Missing per-node files are reported and skipped. A missing source root or
//! an empty one aborts the run; output written so far is left in place.

use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::ip::{AddressMapper, LinkPortAllocator};
use crate::lab::LabEmitter;
use crate::registry::{build_node_mapping, NodeEntry, NodeMapping};
use crate::service::{update_service_file, ServiceKind, ServiceTarget};
use crate::topology::{update_topology_file, ConsolidationSummary, LinkKey};
use crate::utils::replace_dir;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Credential directories copied verbatim into every node
pub const CREDENTIAL_DIRS: [&str; 3] = ["certs", "crypto", "keys"];

/// Path of a node's configuration directory below the lab root
pub const NODE_CONFIG_SUBPATH: [&str; 2] = ["etc", "scion"];

/// Outcome of converting one node
#[derive(Debug, Clone)]
pub struct NodeReport {
    pub entry: NodeEntry,
    /// Directory holding the node's rewritten configuration
    pub config_dir: PathBuf,
    /// Set when a topology descriptor was found and rewritten
    pub topology: Option<ConsolidationSummary>,
    /// Sub-resources that were missing and skipped
    pub warnings: Vec<String>,
}

/// Outcome of a full run
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub nodes: Vec<NodeReport>,
    /// Every allocated link port
    pub links: BTreeMap<LinkKey, u32>,
    /// Startup scripts and `lab.conf`
    pub lab_files: Vec<PathBuf>,
}

impl ConversionReport {
    /// All per-node warnings, prefixed with the node name
    pub fn warnings(&self) -> Vec<String> {
        self.nodes
            .iter()
            .flat_map(|n| n.warnings.iter().map(move |w| format!("{}: {}", n.entry.node_name(), w)))
            .collect()
    }
}

/// Run a complete conversion
pub fn run_conversion(config: &ConvertConfig) -> Result<ConversionReport> {
    config.validate()?;

    let nodes = build_node_mapping(&config.source)?;
    info!("Found {} AS directories:", nodes.len());
    for entry in nodes.iter() {
        info!("  {} => {}", entry.source_name, entry.node_name());
    }

    fs::create_dir_all(&config.output).map_err(|e| ConvertError::io(&config.output, e))?;

    let mapper = AddressMapper::new(config.subnet_prefix.as_str());
    let mut ports = LinkPortAllocator::new(config.base_port);

    let node_reports = convert_nodes(config, &nodes, &mapper, &mut ports)?;
    info!("Reorganization complete");

    info!("Generating Kathara configuration files...");
    let emitter = LabEmitter::new(&mapper, &config.management_prefix, &config.image);
    let lab_files = emitter.emit(&config.output, &nodes)?;

    Ok(ConversionReport {
        nodes: node_reports,
        links: ports.assignments().clone(),
        lab_files,
    })
}

/// Convert every node in mapping order, sharing one port allocator
pub fn convert_nodes(
    config: &ConvertConfig,
    nodes: &NodeMapping,
    mapper: &AddressMapper,
    ports: &mut LinkPortAllocator,
) -> Result<Vec<NodeReport>> {
    let mut reports = Vec::with_capacity(nodes.len());
    for entry in nodes.iter() {
        let as_dir = config.source.join(&entry.source_name);
        if !as_dir.is_dir() {
            warn!("{} directory not found, skipping...", entry.source_name);
            continue;
        }
        reports.push(convert_node(entry, &as_dir, config, mapper, ports)?);
    }
    Ok(reports)
}

/// Convert one AS directory into `<output>/<node>/etc/scion/`
pub fn convert_node(
    entry: &NodeEntry,
    as_dir: &Path,
    config: &ConvertConfig,
    mapper: &AddressMapper,
    ports: &mut LinkPortAllocator,
) -> Result<NodeReport> {
    let node_dir = node_config_dir(&config.output, entry);
    info!(
        "Processing {} => {} ({})",
        entry.source_name,
        entry.node_name(),
        mapper.ip(entry.id)
    );
    fs::create_dir_all(&node_dir).map_err(|e| ConvertError::io(&node_dir, e))?;

    let mut warnings = Vec::new();

    for dir_name in CREDENTIAL_DIRS {
        let src_dir = as_dir.join(dir_name);
        if src_dir.is_dir() {
            replace_dir(&src_dir, &node_dir.join(dir_name))?;
            info!("  Copied {}/", dir_name);
        } else {
            warn!("  {}/ not found in {}", dir_name, entry.source_name);
            warnings.push(format!("{}/ not found", dir_name));
        }
    }

    let target = ServiceTarget {
        node: entry.id,
        mapper,
        config_dir: &config.config_dir,
    };
    for kind in ServiceKind::ALL {
        let Some(source_file) = find_service_file(as_dir, kind)? else {
            warn!("  No {} source found in {}", kind.file_name(), entry.source_name);
            warnings.push(format!("no {} source found", kind.file_name()));
            continue;
        };
        let dest = node_dir.join(kind.file_name());
        fs::copy(&source_file, &dest).map_err(|e| ConvertError::io(&source_file, e))?;
        update_service_file(kind, &dest, &target)?;
        info!("  Rewrote {} => {}", file_name_of(&source_file), kind.file_name());
    }

    let topology_src = as_dir.join("topology.json");
    let topology = if topology_src.is_file() {
        let dest = node_dir.join("topology.json");
        fs::copy(&topology_src, &dest).map_err(|e| ConvertError::io(&topology_src, e))?;
        let summary = update_topology_file(&dest, entry.id, mapper, ports)?;
        info!(
            "  Rewrote topology.json: {} border routers merged, {} of {} interfaces linked",
            summary.border_routers, summary.links_rewritten, summary.interfaces
        );
        Some(summary)
    } else {
        warn!("  topology.json not found in {}", entry.source_name);
        warnings.push("topology.json not found".to_string());
        None
    };

    Ok(NodeReport {
        entry: entry.clone(),
        config_dir: node_dir,
        topology,
        warnings,
    })
}

/// `<lab_root>/<node>/etc/scion`
pub fn node_config_dir(lab_root: &Path, entry: &NodeEntry) -> PathBuf {
    NODE_CONFIG_SUBPATH
        .iter()
        .fold(lab_root.join(entry.node_name()), |path, part| path.join(part))
}

/// First matching source file in lexical order; later matches are ignored
fn find_service_file(as_dir: &Path, kind: ServiceKind) -> Result<Option<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(as_dir).map_err(|e| ConvertError::io(as_dir, e))? {
        let entry = entry.map_err(|e| ConvertError::io(as_dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if kind.matches_source(name) {
                candidates.push(path);
            }
        }
    }
    candidates.sort();

    if candidates.len() > 1 {
        info!(
            "  {} candidates for {}, using {}",
            candidates.len(),
            kind.file_name(),
            file_name_of(&candidates[0])
        );
    }
    Ok(candidates.into_iter().next())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
