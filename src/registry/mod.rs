//! Node registry.
//!
//! Discovers the AS directories of a generated topology and assigns each one
//! its lab node. The order is ascending AS number, so repeated runs over the
//! same input produce the same lab.

use crate::error::{ConvertError, Result};
use crate::topology::NodeId;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// One discovered AS directory and the node it becomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    /// Directory name under the source root (`ASff00_0_110`)
    pub source_name: String,
    pub id: NodeId,
}

impl NodeEntry {
    /// Lab node name (`as_110`)
    pub fn node_name(&self) -> String {
        self.id.node_name()
    }

    /// Whether the identity host mapping pushes this node past the last octet
    pub fn exceeds_host_range(&self) -> bool {
        self.id.0 > u32::from(u8::MAX)
    }
}

/// Source directories ordered by node id. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMapping {
    entries: Vec<NodeEntry>,
}

impl NodeMapping {
    /// Build a mapping from candidate directory names.
    ///
    /// Names that do not look like `AS..._<number>` are skipped, as are later
    /// names that repeat an already seen number.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<NodeEntry> = Vec::new();
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();

        for name in names {
            if !name.starts_with("AS") {
                debug!("Ignoring non-AS directory {}", name);
                continue;
            }
            let Some(id) = NodeId::from_as_name(&name) else {
                warn!("Skipping {}: no trailing AS number", name);
                continue;
            };
            if let Some(existing) = entries.iter().find(|e| e.id == id) {
                warn!(
                    "Skipping {}: AS number {} already used by {}",
                    name, id, existing.source_name
                );
                continue;
            }
            let entry = NodeEntry {
                source_name: name,
                id,
            };
            if entry.exceeds_host_range() {
                warn!(
                    "{}: AS number {} exceeds 255, its lab address will not be a valid IPv4 host",
                    entry.source_name, id
                );
            }
            entries.push(entry);
        }

        entries.sort_by_key(|e| e.id);
        NodeMapping { entries }
    }

    pub fn entries(&self) -> &[NodeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Node ids in mapping order
    pub fn ids(&self) -> Vec<NodeId> {
        self.entries.iter().map(|e| e.id).collect()
    }
}

/// Scan the immediate subdirectories of `source_root`.
///
/// A missing root or a root without any AS directory is fatal.
pub fn build_node_mapping(source_root: &Path) -> Result<NodeMapping> {
    if !source_root.is_dir() {
        return Err(ConvertError::SourceMissing {
            path: source_root.to_path_buf(),
        });
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(source_root).map_err(|e| ConvertError::io(source_root, e))? {
        let entry = entry.map_err(|e| ConvertError::io(source_root, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!("Skipping directory with non-UTF-8 name {:?}", raw),
        }
    }

    let mapping = NodeMapping::from_names(names);
    if mapping.is_empty() {
        return Err(ConvertError::NoNodes {
            path: source_root.to_path_buf(),
        });
    }
    Ok(mapping)
}
