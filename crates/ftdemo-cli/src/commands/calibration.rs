//! Calibration command implementation.

use anyhow::{Context, Result};
use console::style;

use ftdemo_analysis::export::write_calibration;
use ftdemo_analysis::summarize_calibration;

use super::common::{layout, load_records};
use crate::config::Config;

/// Execute the calibration command.
pub async fn execute(config: &Config) -> Result<()> {
    let layout = layout(config);
    let records = load_records(&layout).await?;
    let summary = summarize_calibration(&records)?;

    println!(
        "{} Calibration averaged over {} runs",
        style("→").cyan().bold(),
        style(summary.runs).green()
    );
    println!(
        "  {:<6} {:>16} {:>16} {:>18} {:>18}",
        "Qubit", "T1", "T2", "Gate error", "Readout error"
    );
    for q in &summary.qubits {
        println!(
            "  {:<6} {:>8.2} ± {:<5.2} {:>8.2} ± {:<5.2} {:>9.2e} ± {:<6.1e} {:>9.2e} ± {:<6.1e}",
            q.name,
            q.t1.mean,
            q.t1.sigma,
            q.t2.mean,
            q.t2.sigma,
            q.gate_error.mean,
            q.gate_error.sigma,
            q.readout_error.mean,
            q.readout_error.sigma
        );
    }
    for c in &summary.couplings {
        println!(
            "  CX {}-{}  {:.2e} ± {:.1e}",
            c.qubits[0], c.qubits[1], c.gate_error.mean, c.gate_error.sigma
        );
    }
    if let Some(t) = summary.temperature {
        println!("  Fridge {:.4} ± {:.4} K", t.mean, t.sigma);
    }

    let dir = layout.exports_dir();
    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let written = write_calibration(&dir, &summary)?;
    println!(
        "{} Wrote {} tables to {}",
        style("✓").green().bold(),
        written.len(),
        style(dir.display()).cyan()
    );
    Ok(())
}
