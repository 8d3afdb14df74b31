//! Helpers shared by the commands.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use ftdemo_analysis::{Analyzer, DecodedStats, read_all_logs};
use ftdemo_catalog::{CircuitBatch, ExperimentCatalog, standard_batch};
use ftdemo_sched::DataLayout;

use crate::config::Config;

/// Data layout under the configured root.
pub fn layout(config: &Config) -> DataLayout {
    DataLayout::new(&config.data_dir)
}

/// The standard catalog and its circuits for the configured layout.
pub fn build_batch(config: &Config) -> Result<(ExperimentCatalog, CircuitBatch)> {
    standard_batch(config.pairs.clone(), config.mapping).context("Failed to generate the circuit batch")
}

/// Analyzer for the configured mapping and bit order.
pub fn analyzer(config: &Config) -> Result<Analyzer> {
    let catalog = ExperimentCatalog::standard().context("Failed to build the experiment catalog")?;
    Ok(Analyzer::new(catalog, config.mapping, config.bit_order))
}

/// Every logged record; fails when nothing has been logged yet.
pub async fn load_records(layout: &DataLayout) -> Result<Vec<DecodedStats>> {
    let log = read_all_logs(layout)
        .await
        .with_context(|| format!("Failed to read statistics logs under {}", layout.root().display()))?;
    if log.skipped > 0 {
        println!(
            "  {} skipped {} malformed log lines",
            style("!").yellow().bold(),
            log.skipped
        );
    }
    if log.records.is_empty() {
        bail!(
            "No statistics logged under {}; run `ftdemo run` or `ftdemo process` first",
            layout.processed_dir().display()
        );
    }
    Ok(log.records)
}

/// Spinner in the style used by every long-running command.
pub fn spinner(message: impl Into<String>) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Format a fraction as a percentage.
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
