//! CLI configuration management.
//!
//! Precedence, lowest first: built-in defaults, the `--config` JSON file, then
//! environment variables (a `.env` file is loaded when present).

use std::path::Path;

use anyhow::{Context, Result};
use grn_bool_synth::{SynthesisConfig, UnreachablePolicy};
use serde::Serialize;

/// Environment variable overriding the gene delay.
pub const ENV_GENE_DELAY: &str = "GRNB_GENE_DELAY";

/// Environment variable overriding the unreachable-vertex policy.
pub const ENV_UNREACHABLE_POLICY: &str = "GRNB_UNREACHABLE_POLICY";

/// Application-wide configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    /// Settings handed to every conversion.
    pub synthesis: SynthesisConfig,
}

impl Config {
    /// Load configuration from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Some(path) = path {
            config.synthesis = SynthesisConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from environment lookups.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(delay) = var(ENV_GENE_DELAY) {
            self.synthesis.gene_delay = delay
                .trim()
                .parse()
                .with_context(|| format!("{ENV_GENE_DELAY} must be an integer, got {delay:?}"))?;
        }
        if let Some(policy) = var(ENV_UNREACHABLE_POLICY) {
            self.synthesis.unreachable_policy =
                UnreachablePolicy::parse(&policy).with_context(|| {
                    format!(
                        "{ENV_UNREACHABLE_POLICY} must be `forward` or `break_cycles`, got {policy:?}"
                    )
                })?;
        }
        Ok(())
    }
}
