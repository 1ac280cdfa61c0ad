//! Border router configuration (`br.toml`).

use super::{remap_in_section, remove_sections, set_in_section, ServiceTarget};
use crate::topology::CONSOLIDATED_BR_ID;
use toml::Table;

/// Default border router API port
pub const DEFAULT_API_PORT: u16 = 31442;

/// Rewrite a border router configuration for the lab.
///
/// The router id becomes the consolidated topology entry, so the single
/// router process finds every interface of the node.
pub fn rewrite_border_router(config: &mut Table, target: &ServiceTarget<'_>) {
    remove_sections(config, &["metrics", "tracing"]);

    set_in_section(config, "general", "config_dir", target.config_dir.to_string());
    set_in_section(config, "general", "id", CONSOLIDATED_BR_ID.to_string());

    remap_in_section(config, "api", "addr", target, DEFAULT_API_PORT);
}
