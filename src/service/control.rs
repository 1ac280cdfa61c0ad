//! Control service configuration (`cs.toml`).

use super::{remap_in_section, remove_sections, set_in_section, ServiceTarget};
use toml::Table;

/// Default control service API port
pub const DEFAULT_API_PORT: u16 = 31152;

const DATABASES: [(&str, &str); 3] = [
    ("trust_db", "trust.db"),
    ("beacon_db", "beacon.db"),
    ("path_db", "path.db"),
];

/// Rewrite a control service configuration for the lab
pub fn rewrite_control_service(config: &mut Table, target: &ServiceTarget<'_>) {
    remove_sections(config, &["metrics", "tracing"]);

    set_in_section(config, "general", "config_dir", target.config_dir.to_string());
    for (section, file_name) in DATABASES {
        set_in_section(config, section, "connection", target.config_path(file_name));
    }

    remap_in_section(config, "api", "addr", target, DEFAULT_API_PORT);
}
