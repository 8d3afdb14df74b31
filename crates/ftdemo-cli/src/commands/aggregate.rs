//! Aggregate command implementation.

use anyhow::{Context, Result};
use console::style;

use ftdemo_analysis::export::{write_diff_table, write_family_table, write_qasm_counts, write_raw_points};
use ftdemo_analysis::plot::{plot_comparison, plot_difference};
use ftdemo_analysis::{Aggregation, Family, raw_points};
use ftdemo_catalog::ExperimentCatalog;

use super::common::{layout, load_records, percent};
use crate::config::Config;

/// Execute the aggregate command.
pub async fn execute(config: &Config, baseline: Option<&str>, export: bool, plot: bool) -> Result<()> {
    let layout = layout(config);
    let records = load_records(&layout).await?;
    let catalog = ExperimentCatalog::standard()?;
    let aggregation = Aggregation::summarize(&records, &catalog, config.confidence)?;

    println!(
        "{} Aggregated {} runs into {} families ({} confidence)",
        style("→").cyan().bold(),
        style(records.len()).green(),
        aggregation.families().len(),
        percent(aggregation.confidence())
    );
    if aggregation.skipped() > 0 {
        println!(
            "  {} skipped {} records matching no experiment",
            style("!").yellow().bold(),
            aggregation.skipped()
        );
    }
    println!();
    println!("  {:<24} {:>12} {:>8}", style("Family").bold(), style("Mean dist").bold(), style("Points").bold());
    for (family, mean) in aggregation.family_means() {
        let points = aggregation.family(&family).map_or(0, |f| f.points.len());
        println!("  {:<24} {:>12.4} {:>8}", family.to_string(), mean, points);
    }

    let post_selection = aggregation.post_selection_means();
    if !post_selection.is_empty() {
        println!();
        println!("  {:<24} {:>12}", style("Encoded family").bold(), style("Accepted").bold());
        for (family, ratio) in post_selection {
            println!("  {:<24} {:>12}", family.to_string(), percent(ratio));
        }
    }

    if !export && !plot {
        return Ok(());
    }

    let baseline: Family = match baseline {
        Some(label) => label.parse()?,
        None => Family::Bare(config.pairs[0]),
    };
    let differences = aggregation
        .difference(&baseline)
        .with_context(|| format!("Baseline {baseline} has no logged runs"))?;

    if export {
        let dir = layout.exports_dir();
        std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        let mut written = 0;
        for summary in aggregation.families() {
            write_family_table(&dir, summary, aggregation.confidence())?;
            write_qasm_counts(&dir, summary)?;
            written += 2;
        }
        for series in &differences {
            write_diff_table(&dir, series, aggregation.confidence())?;
            written += 1;
        }
        write_raw_points(&dir, &raw_points(&records))?;
        written += 1;
        println!();
        println!(
            "{} Wrote {} tables to {}",
            style("✓").green().bold(),
            written,
            style(dir.display()).cyan()
        );
    }

    if plot {
        let dir = layout.plots_dir();
        std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        let families: Vec<Family> = aggregation.families().iter().map(|f| f.family).collect();
        let comparison = dir.join("comparison.svg");
        plot_comparison(&comparison, &aggregation, &catalog, &families)?;
        let difference = dir.join(format!("difference_{}.svg", baseline.file_stem()));
        plot_difference(&difference, &differences, &catalog)?;
        println!(
            "{} Plots written: {}, {}",
            style("✓").green().bold(),
            style(comparison.display()).cyan(),
            style(difference.display()).cyan()
        );
    }

    Ok(())
}
