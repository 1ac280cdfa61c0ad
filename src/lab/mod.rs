//! Kathara lab description.
//!
//! Writes `lab.conf` and one `<node>.startup` script per node. The output
//! depends only on the node list; link topology lives in each node's
//! `topology.json`.

use crate::error::{ConvertError, Result};
use crate::ip::AddressMapper;
use crate::registry::NodeMapping;
use crate::topology::NodeId;
use crate::utils::{make_executable, write_atomic};
use log::info;
use std::path::{Path, PathBuf};

const LAB_HEADER: &str = r#"LAB_DESCRIPTION="SCION single collision domain topology"
LAB_VERSION=1.0
LAB_AUTHOR="Network Security Group, ETH Zurich"
LAB_WEB="https://netsec.ethz.ch"
"#;

const SCION_UNITS: [&str; 4] = [
    "scion-dispatcher.service",
    "scion-router.service",
    "scion-control.service",
    "scion-daemon.service",
];

/// Renders the lab files for a finished node mapping
#[derive(Debug, Clone)]
pub struct LabEmitter<'a> {
    mapper: &'a AddressMapper,
    management: AddressMapper,
    image: &'a str,
}

impl<'a> LabEmitter<'a> {
    pub fn new(mapper: &'a AddressMapper, management_prefix: &str, image: &'a str) -> Self {
        LabEmitter {
            mapper,
            management: AddressMapper::new(management_prefix),
            image,
        }
    }

    /// Contents of `lab.conf`
    pub fn lab_conf(&self, nodes: &NodeMapping) -> String {
        let mut labfile = String::from(LAB_HEADER);
        for entry in nodes.iter() {
            let name = entry.node_name();
            labfile.push_str(&format!(
                "\n# Config for {name}\n{name}[0]=net_0\n{name}[1]=net_1\n{name}[image]=\"{image}\"\n",
                name = name,
                image = self.image,
            ));
        }
        labfile
    }

    /// Contents of `<node>.startup`
    pub fn startup_script(&self, node: NodeId) -> String {
        let starts: String = SCION_UNITS
            .iter()
            .map(|unit| format!("systemctl start {}\n", unit))
            .collect();

        format!(
            "# === Startup Script for {name} ===\n\n\
ip address add {ip}/24 dev eth0\n\
ip address add {management}/24 dev eth1\n\
\n\
# Start SCION services\n\
{starts}\
systemctl status scion-*.service\n\n",
            name = node.node_name(),
            ip = self.mapper.ip(node),
            management = self.management.ip(node),
            starts = starts,
        )
    }

    /// Write every startup script and `lab.conf` under `lab_root`.
    /// Returns the written paths, `lab.conf` last.
    pub fn emit(&self, lab_root: &Path, nodes: &NodeMapping) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(lab_root).map_err(|e| ConvertError::io(lab_root, e))?;
        let mut written = Vec::with_capacity(nodes.len() + 1);

        for entry in nodes.iter() {
            let path = lab_root.join(format!("{}.startup", entry.node_name()));
            write_atomic(&path, self.startup_script(entry.id).as_bytes())?;
            make_executable(&path)?;
            info!("Generated {}.startup", entry.node_name());
            written.push(path);
        }

        let lab_conf = lab_root.join("lab.conf");
        write_atomic(&lab_conf, self.lab_conf(nodes).as_bytes())?;
        info!("Generated lab.conf");
        written.push(lab_conf);

        Ok(written)
    }
}
