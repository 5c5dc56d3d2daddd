//! Simulate command.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use grn_bool_synth::SimulatedRow;
use tracing::info;

use super::OutputFormat;
use crate::config::Config;

/// Convert a model, simulate it and print the expression table.
pub fn execute(
    config: &Config,
    path: &Path,
    max_time: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let conversion = super::convert(config, path)?;

    let horizon = max_time.unwrap_or_else(|| conversion.default_horizon());
    if horizon < 0 {
        anyhow::bail!("--max-time must not be negative, got {}", horizon);
    }

    let table = conversion
        .simulated_expression_table(horizon)
        .with_context(|| format!("Failed to simulate {}", path.display()))?;

    info!(genes = table.len(), max_time = horizon, "Simulated model");

    let content = match format {
        OutputFormat::Text => render_text(&table),
        OutputFormat::Json => serde_json::to_string_pretty(&table)?,
    };
    println!("{}", content.trim_end());
    Ok(())
}

/// Tab-separated `domain gene time level` rows under a header line.
fn render_text(table: &BTreeMap<String, Vec<SimulatedRow>>) -> String {
    let mut out = String::from("domain\tgene\ttime\tlevel\n");
    for row in table.values().flatten() {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            row.domain, row.gene, row.time, row.level
        ));
    }
    out
}
