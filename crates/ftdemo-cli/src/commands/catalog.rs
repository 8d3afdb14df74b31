//! Catalog command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use ftdemo_catalog::Variant;

use super::common::build_batch;
use crate::config::Config;

/// Execute the catalog command.
pub async fn execute(config: &Config, qasm_dir: Option<&Path>) -> Result<()> {
    let (catalog, batch) = build_batch(config)?;
    println!(
        "{} Generated {} circuits from {} experiments ({} bare pairs)",
        style("→").cyan().bold(),
        style(batch.len()).green(),
        catalog.len(),
        config.pairs.len()
    );

    for entry in batch.entries() {
        let kind = match entry.id.variant {
            Variant::Bare { .. } => style("bare").dim(),
            Variant::Encoded { .. } => style("encoded").yellow(),
        };
        println!(
            "  {:<30} {:<8} {:>3} ops",
            entry.id.name(),
            kind,
            entry.circuit.op_count()
        );
    }

    if let Some(dir) = qasm_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for entry in batch.entries() {
            let path = dir.join(format!("{}.qasm", entry.id.file_stem()));
            tokio::fs::write(&path, entry.circuit.to_qasm())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        println!(
            "{} Wrote {} OpenQASM files to {}",
            style("✓").green().bold(),
            batch.len(),
            style(dir.display()).cyan()
        );
    }

    Ok(())
}
