//! Equations command.

use std::path::Path;

use anyhow::Result;
use grn_bool_synth::ConversionReport;
use tracing::info;

use super::OutputFormat;
use crate::config::Config;

/// Convert a model and print its rule equations.
pub fn execute(config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
    let conversion = super::convert(config, path)?;
    let report = &conversion.report;

    info!(
        genes = report.equations.len(),
        rules = report.equation_count(),
        diagnostics = report.diagnostics.len(),
        "Synthesized equations"
    );

    let content = match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    };
    println!("{}", content.trim_end());
    Ok(())
}

/// One `gene: rule` line per rule, genes in sorted order.
fn render_text(report: &ConversionReport) -> String {
    let mut out = String::new();
    for (gene, rules) in &report.equations {
        for rule in rules {
            out.push_str(&format!("{gene}: {rule}\n"));
        }
    }
    out
}
