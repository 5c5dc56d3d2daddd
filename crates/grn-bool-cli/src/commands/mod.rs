//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result};
use grn_bool_core::RegulatoryModel;
use grn_bool_synth::{Conversion, ModelConverter};
use tracing::info;

use crate::config::Config;

pub mod classify;
pub mod config;
pub mod equations;
pub mod simulate;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown format: {}. Use 'text' or 'json'", s),
        }
    }
}

/// Read and parse a model document.
pub fn load_model(path: &Path) -> Result<RegulatoryModel> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model from {}", path.display()))?;
    let model = RegulatoryModel::from_json_str(&contents)
        .with_context(|| format!("Failed to parse model {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = model.node_count(),
        links = model.link_count(),
        "Loaded model"
    );
    Ok(model)
}

/// Load a model document and run the full conversion on it.
pub fn convert(config: &Config, path: &Path) -> Result<Conversion> {
    let model = load_model(path)?;
    ModelConverter::new(&model, config.synthesis.clone())
        .convert()
        .with_context(|| format!("Failed to convert {}", path.display()))
}
