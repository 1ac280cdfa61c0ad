//! SCION daemon configuration (`sd.toml`).

use super::{remap_in_section, remove_sections, set_in_section, ServiceTarget};
use toml::Table;

/// Default daemon listen port
pub const DEFAULT_SD_PORT: u16 = 30255;
/// Default daemon API port
pub const DEFAULT_API_PORT: u16 = 30955;

/// Rewrite a daemon configuration for the lab
pub fn rewrite_daemon(config: &mut Table, target: &ServiceTarget<'_>) {
    remove_sections(config, &["metrics", "tracing"]);

    set_in_section(config, "general", "config_dir", target.config_dir.to_string());
    set_in_section(config, "trust_db", "connection", target.config_path("trust.db"));
    set_in_section(config, "path_db", "connection", target.config_path("path.db"));

    remap_in_section(config, "sd", "address", target, DEFAULT_SD_PORT);
    remap_in_section(config, "api", "addr", target, DEFAULT_API_PORT);
}
