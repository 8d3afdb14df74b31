//! Process command implementation.

use anyhow::{Context, Result};
use console::style;

use ftdemo_analysis::process_all_dumps;
use ftdemo_sched::{COMPLETED_LIST, DataLayout, TIMED_OUT_LIST, read_ids, refetched_name};

use super::common::{analyzer, layout};
use crate::config::Config;

/// Execute the process command.
pub async fn execute(config: &Config) -> Result<()> {
    let layout = layout(config);
    process_pending(config, &layout).await?;

    let pending = read_ids(&layout.id_list(TIMED_OUT_LIST)).await?;
    if !pending.is_empty() {
        println!(
            "  {} {} timed-out jobs are still listed in {}",
            style("!").yellow().bold(),
            pending.len(),
            TIMED_OUT_LIST
        );
    }
    Ok(())
}

/// Decode every completed or re-fetched dump not processed yet.
pub async fn process_pending(config: &Config, layout: &DataLayout) -> Result<usize> {
    let analyzer = analyzer(config)?;
    let mut processed = 0;
    for list in [COMPLETED_LIST.to_string(), refetched_name(TIMED_OUT_LIST)] {
        processed += process_all_dumps(&analyzer, layout, &list)
            .await
            .with_context(|| format!("Failed to process the dumps listed in {list}"))?;
    }
    println!(
        "{} Processed {} new dumps into {}",
        style("✓").green().bold(),
        processed,
        style(layout.processed_dir().display()).cyan()
    );
    Ok(processed)
}
