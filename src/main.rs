use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;

use scion_kathara::config::{self, ConvertConfig};
use scion_kathara::orchestrator;

/// Convert a generated SCION topology into a single-subnet Kathara lab
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generated topology directory containing the AS* folders
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Output directory for the Kathara lab
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optional YAML file with conversion settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First underlay port assigned to inter-AS links
    #[arg(long)]
    base_port: Option<u16>,
}

impl Args {
    /// Settings file (or defaults) with command-line values on top
    fn resolve(&self) -> Result<ConvertConfig> {
        let mut settings = match &self.config {
            Some(path) => config::load_config(path)
                .wrap_err_with(|| format!("Failed to load configuration '{}'", path.display()))?,
            None => ConvertConfig::default(),
        };
        if let Some(source) = &self.source {
            settings.source = source.clone();
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if let Some(base_port) = self.base_port {
            settings.base_port = base_port;
        }
        settings.validate().wrap_err("Invalid conversion settings")?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = args.resolve()?;
    info!("Source directory: {:?}", settings.source);
    info!("Output directory: {:?}", settings.output);

    let report = orchestrator::run_conversion(&settings).wrap_err_with(|| {
        format!(
            "Conversion of '{}' failed; output in '{}' is incomplete",
            settings.source.display(),
            settings.output.display()
        )
    })?;

    let warnings = report.warnings();
    for warning in &warnings {
        warn!("{}", warning);
    }
    info!(
        "All done! Kathara lab with {} nodes and {} links is ready ({} warnings)",
        report.nodes.len(),
        report.links.len(),
        warnings.len()
    );
    Ok(())
}
