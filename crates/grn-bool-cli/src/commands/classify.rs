//! Classify command.

use std::path::Path;

use anyhow::Result;
use grn_bool_core::ModelSource;
use grn_bool_synth::{classify, EdgeClassification};
use tracing::info;

use super::{load_model, OutputFormat};
use crate::config::Config;

/// Classify the links of a model and print them.
pub fn execute(config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
    let model = load_model(path)?;
    let classification = classify(
        &model.nodes,
        &model.links,
        &model.root_node_ids(),
        config.synthesis.unreachable_policy,
    );

    info!(
        forward = classification.forward_edges().count(),
        feedback = classification.feedback_edges().count(),
        unreachable = classification.unreachable().len(),
        "Classified links"
    );

    let content = match format {
        OutputFormat::Text => render_text(&classification),
        OutputFormat::Json => serde_json::to_string_pretty(&classification)?,
    };
    println!("{}", content.trim_end());
    Ok(())
}

/// One `source -> target<TAB>class` line per link.
fn render_text(classification: &EdgeClassification) -> String {
    let mut out = String::new();
    for (link, class) in classification.iter() {
        out.push_str(&format!("{link}\t{class}\n"));
    }
    out
}
