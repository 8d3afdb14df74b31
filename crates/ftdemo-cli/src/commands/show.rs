//! Show command implementation.

use anyhow::Result;
use console::style;
use rand::SeedableRng;
use rand::rngs::StdRng;

use ftdemo_analysis::plot::{plot_single_run, select_random_runs};
use ftdemo_catalog::{ExperimentCatalog, label_stem};

use super::common::{layout, load_records, percent};
use crate::config::Config;

/// Execute the show command.
pub async fn execute(config: &Config, label: &str, seed: Option<u64>) -> Result<()> {
    let layout = layout(config);
    let records = load_records(&layout).await?;
    let catalog = ExperimentCatalog::standard()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let runs = select_random_runs(&records, &catalog, label, &mut rng)?;

    println!("{} {}", style("→").cyan().bold(), style(label).green());
    for (family, run) in &runs {
        println!(
            "  {:<24} {}  dist {:.4}  accepted {}",
            family.to_string(),
            run.date.format("%Y-%m-%d %H:%M:%S"),
            run.stat_dist,
            percent(run.post_selection_ratio)
        );
    }

    let dir = layout.plots_dir();
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!("single_{}.svg", label_stem(label)));
    plot_single_run(&path, label, &runs, config.confidence)?;
    println!("{} Plot written: {}", style("✓").green().bold(), style(path.display()).cyan());
    Ok(())
}
