//! SCION service configuration rewriting.
//!
//! Each node keeps one border router, one control service and one daemon
//! configuration. Rewriting strips sections that only make sense on the
//! generating host (metrics and tracing endpoints), points local storage at
//! the in-lab configuration directory and moves the service's own addresses
//! onto the node's lab host.
//!
//! ## Key Components
//!
//! - `border_router.rs`: `br.toml`
//! - `control.rs`: `cs.toml`
//! - `daemon.rs`: `sd.toml`
//!
//! Rewritten files keep their content, not their key order or comments.

pub mod border_router;
pub mod control;
pub mod daemon;

use crate::error::{ConvertError, Result};
use crate::ip::AddressMapper;
use crate::topology::NodeId;
use std::fs;
use std::path::Path;
use toml::{Table, Value};

pub use border_router::rewrite_border_router;
pub use control::rewrite_control_service;
pub use daemon::rewrite_daemon;

/// Node-specific values every rewrite needs
#[derive(Debug, Clone, Copy)]
pub struct ServiceTarget<'a> {
    pub node: NodeId,
    pub mapper: &'a AddressMapper,
    /// Configuration directory inside the lab, e.g. `/etc/scion/`
    pub config_dir: &'a str,
}

impl ServiceTarget<'_> {
    /// Path of a file under the configuration directory
    pub fn config_path(&self, file_name: &str) -> String {
        if self.config_dir.ends_with('/') {
            format!("{}{}", self.config_dir, file_name)
        } else {
            format!("{}/{}", self.config_dir, file_name)
        }
    }
}

/// The three per-node service configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    BorderRouter,
    ControlService,
    Daemon,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [
        ServiceKind::BorderRouter,
        ServiceKind::ControlService,
        ServiceKind::Daemon,
    ];

    /// File name in the lab
    pub fn file_name(&self) -> &'static str {
        match self {
            ServiceKind::BorderRouter => "br.toml",
            ServiceKind::ControlService => "cs.toml",
            ServiceKind::Daemon => "sd.toml",
        }
    }

    /// Whether a generated file name belongs to this service.
    ///
    /// Border routers and control services are numbered per AS
    /// (`br1-ff00_0_110-1.toml`), the daemon is always `sd.toml`.
    pub fn matches_source(&self, file_name: &str) -> bool {
        match self {
            ServiceKind::BorderRouter => file_name.starts_with("br") && file_name.ends_with(".toml"),
            ServiceKind::ControlService => file_name.starts_with("cs") && file_name.ends_with(".toml"),
            ServiceKind::Daemon => file_name == "sd.toml",
        }
    }

    /// Apply this service's rewrite rules to a parsed configuration
    pub fn rewrite(&self, config: &mut Table, target: &ServiceTarget<'_>) {
        match self {
            ServiceKind::BorderRouter => rewrite_border_router(config, target),
            ServiceKind::ControlService => rewrite_control_service(config, target),
            ServiceKind::Daemon => rewrite_daemon(config, target),
        }
    }
}

/// Load a TOML service file, rewrite it and atomically write it back
pub fn update_service_file(kind: ServiceKind, path: &Path, target: &ServiceTarget<'_>) -> Result<()> {
    let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    let mut config: Table = toml::from_str(&content).map_err(|e| ConvertError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    kind.rewrite(&mut config, target);

    let output = toml::to_string(&config).map_err(|e| ConvertError::TomlWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    crate::utils::write_atomic(path, output.as_bytes())
}

pub(crate) fn remove_sections(config: &mut Table, sections: &[&str]) {
    for section in sections {
        config.remove(*section);
    }
}

/// Set `[section].key` when the section exists
pub(crate) fn set_in_section(config: &mut Table, section: &str, key: &str, value: String) {
    if let Some(Value::Table(table)) = config.get_mut(section) {
        table.insert(key.to_string(), Value::String(value));
    }
}

/// Move `[section].key` onto the node's host when the section exists,
/// keeping the original port or using `default_port` if it has none
pub(crate) fn remap_in_section(
    config: &mut Table,
    section: &str,
    key: &str,
    target: &ServiceTarget<'_>,
    default_port: u16,
) {
    if let Some(Value::Table(table)) = config.get_mut(section) {
        let original = table.get(key).and_then(Value::as_str);
        let remapped = target.mapper.remap_or(target.node, original, default_port);
        table.insert(key.to_string(), Value::String(remapped));
    }
}
