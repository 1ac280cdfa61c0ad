//! Conversion settings.
//!
//! Every field has a default matching the standard lab layout, so a run needs
//! no configuration file at all. A YAML file may override any subset of the
//! fields, and command-line flags override the file.

use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE: &str = "input_scion/gen";
pub const DEFAULT_OUTPUT: &str = "KatharaLab";
pub const DEFAULT_SUBNET_PREFIX: &str = "10.0.0";
pub const DEFAULT_MANAGEMENT_PREFIX: &str = "192.168.0";
pub const DEFAULT_BASE_PORT: u16 = 50000;
pub const DEFAULT_CONFIG_DIR: &str = "/etc/scion/";
pub const DEFAULT_IMAGE: &str = "kathara/scion-local";

/// Validation failures for [`ConvertConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be three dotted octets, got '{value}'")]
    InvalidPrefix { field: &'static str, value: String },

    #[error("base_port must be non-zero")]
    ZeroBasePort,

    #[error("Failed to open configuration {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Settings for one conversion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Generated topology root holding one `AS*` directory per node
    pub source: PathBuf,
    /// Lab root that receives node directories, startup scripts and lab.conf
    pub output: PathBuf,
    /// First three octets of the shared emulation subnet
    pub subnet_prefix: String,
    /// First three octets of the secondary interface subnet
    pub management_prefix: String,
    /// First port handed out to inter-node links
    pub base_port: u16,
    /// Directory the services read their configuration from inside the lab
    pub config_dir: String,
    /// Container image for every node
    pub image: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            source: PathBuf::from(DEFAULT_SOURCE),
            output: PathBuf::from(DEFAULT_OUTPUT),
            subnet_prefix: DEFAULT_SUBNET_PREFIX.to_string(),
            management_prefix: DEFAULT_MANAGEMENT_PREFIX.to_string(),
            base_port: DEFAULT_BASE_PORT,
            config_dir: DEFAULT_CONFIG_DIR.to_string(),
            image: DEFAULT_IMAGE.to_string(),
        }
    }
}

impl ConvertConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.as_os_str().is_empty() {
            return Err(ConfigError::Empty { field: "source" });
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::Empty { field: "output" });
        }
        if self.config_dir.is_empty() {
            return Err(ConfigError::Empty { field: "config_dir" });
        }
        if self.image.is_empty() {
            return Err(ConfigError::Empty { field: "image" });
        }
        Self::validate_prefix("subnet_prefix", &self.subnet_prefix)?;
        Self::validate_prefix("management_prefix", &self.management_prefix)?;
        if self.base_port == 0 {
            return Err(ConfigError::ZeroBasePort);
        }
        Ok(())
    }

    fn validate_prefix(field: &'static str, value: &str) -> Result<(), ConfigError> {
        let octets: Vec<&str> = value.split('.').collect();
        let valid = octets.len() == 3 && octets.iter().all(|o| o.parse::<u8>().is_ok());
        if !valid {
            return Err(ConfigError::InvalidPrefix {
                field,
                value: value.to_string(),
            });
        }
        Ok(())
    }
}

/// Load and validate settings from a YAML file
pub fn load_config(config_path: &Path) -> Result<ConvertConfig, ConfigError> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path).map_err(|e| ConfigError::Open {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    let config: ConvertConfig = serde_yaml::from_reader(file).map_err(|e| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    config.validate()?;

    Ok(config)
}
