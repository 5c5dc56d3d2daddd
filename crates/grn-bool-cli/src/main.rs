//! grnb - boolean rule synthesis for gene regulatory models.
//!
//! Reads a regulatory model document (JSON), classifies its links, synthesizes
//! rule equations and simulates the resulting boolean network.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::OutputFormat;
use config::Config;

/// grnb - Synthesize boolean rules from gene regulatory models.
#[derive(Parser, Debug)]
#[command(
    name = "grnb",
    author,
    version,
    about = "Synthesize, classify and simulate boolean rules of gene regulatory models",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Synthesis configuration file (JSON).
    #[arg(long, global = true, env = "GRNB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the synthesized rule of every gene.
    Equations {
        /// Model document to convert.
        model: PathBuf,

        /// Output format: text or json.
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print every link with its Forward/Feedback class.
    Classify {
        /// Model document to classify.
        model: PathBuf,

        /// Output format: text or json.
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Simulate the synthesized network and print the expression table.
    Simulate {
        /// Model document to simulate.
        model: PathBuf,

        /// Last time step to tabulate (defaults to the last expression timepoint).
        #[arg(long)]
        max_time: Option<i64>,

        /// Output format: text or json.
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the effective configuration.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity, RUST_LOG wins when set
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Equations { model, format } => {
            let format: OutputFormat = format.parse()?;
            commands::equations::execute(&config, &model, format)?;
        }

        Commands::Classify { model, format } => {
            let format: OutputFormat = format.parse()?;
            commands::classify::execute(&config, &model, format)?;
        }

        Commands::Simulate {
            model,
            max_time,
            format,
        } => {
            let format: OutputFormat = format.parse()?;
            commands::simulate::execute(&config, &model, max_time, format)?;
        }

        Commands::Config => {
            commands::config::show(&config)?;
        }
    }

    Ok(())
}
