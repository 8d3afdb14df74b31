//! Command-line driver of the five-qubit fault-tolerance demonstration.
//!
//! ```text
//!   catalog ──→ run ──→ process ──→ aggregate / calibration / show
//!   circuits    jobs    stats logs  tables and plots
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{aggregate, calibration, catalog, process, run, show, version};
use config::Config;

/// ftdemo - fault-tolerance demonstration on a five-qubit device
#[derive(Parser)]
#[command(name = "ftdemo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "FTDEMO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the generated circuits
    Catalog {
        /// Write one OpenQASM 2 file per circuit into this directory
        #[arg(long)]
        qasm_dir: Option<PathBuf>,
    },

    /// Execute the batch on the local simulator and process the results
    Run {
        /// Number of jobs to submit
        #[arg(short = 'n', long, default_value = "1")]
        repetitions: u32,

        /// Shots per circuit (overrides the configuration)
        #[arg(short, long)]
        shots: Option<u32>,
    },

    /// Decode pending API dumps into statistics logs
    Process,

    /// Summarize logged runs per family
    Aggregate {
        /// Family to subtract in the difference view, e.g. "bare[2, 0]"
        #[arg(short, long)]
        baseline: Option<String>,

        /// Write .dat tables
        #[arg(long)]
        export: bool,

        /// Render SVG plots
        #[arg(long)]
        plot: bool,
    },

    /// Export averaged calibration tables
    Calibration,

    /// Plot one random logged run of an experiment
    Show {
        /// Experiment label, e.g. "MX1|00>"
        label: String,

        /// Seed for the run selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Version => {
            version::execute();
            Ok(())
        }
        command => dispatch(command, cli.config.as_deref()).await,
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn dispatch(command: Commands, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = &Config::load(config_path)?;
    match command {
        Commands::Catalog { qasm_dir } => catalog::execute(config, qasm_dir.as_deref()).await,
        Commands::Run { repetitions, shots } => run::execute(config, repetitions, shots).await,
        Commands::Process => process::execute(config).await,
        Commands::Aggregate {
            baseline,
            export,
            plot,
        } => aggregate::execute(config, baseline.as_deref(), export, plot).await,
        Commands::Calibration => calibration::execute(config).await,
        Commands::Show { label, seed } => show::execute(config, &label, seed).await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
