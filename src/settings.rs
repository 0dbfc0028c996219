use std::fs;
use std::path::{Path, PathBuf};

use railreach_core::{Error, PipelineConfig};
use tracing::{debug, info};

/// Builds the run configuration from an optional TOML file and the
/// command-line database override
pub fn load(path: Option<&Path>, database: Option<PathBuf>) -> Result<PipelineConfig, Error> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => {
            info!("No configuration file given, using defaults");
            PipelineConfig::default()
        }
    };
    if let Some(database) = database {
        config.database = database;
    }
    config.validate()?;
    debug!("Launching with config: {config:#?}");
    Ok(config)
}

pub fn read_config(path: &Path) -> Result<PipelineConfig, Error> {
    info!("Reading config from file {}", path.display());
    let text = fs::read_to_string(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("Error opening config file {}: {e}", path.display()),
        ))
    })?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<PipelineConfig, Error> {
    toml::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))
}
