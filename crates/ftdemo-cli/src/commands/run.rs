//! Run command implementation.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use ftdemo_adapter_sim::SimulatorBackend;
use ftdemo_hal::Backend;
use ftdemo_ir::Circuit;
use ftdemo_sched::{HandlerOutcome, ResultHandler, TIMED_OUT_LIST, read_ids, refetch_pending};

use super::common::{build_batch, layout, spinner};
use super::process;
use crate::config::Config;

/// Execute the run command.
///
/// Every repetition submits the whole batch as one job; finished jobs go
/// through the result handler, timed-out ones are re-fetched afterwards.
pub async fn execute(config: &Config, repetitions: u32, shots: Option<u32>) -> Result<()> {
    let shots = shots.unwrap_or(config.shots);
    let (_, batch) = build_batch(config)?;
    let layout = layout(config);
    layout
        .ensure_dirs()
        .await
        .with_context(|| format!("Failed to prepare {}", layout.root().display()))?;

    let backend =
        SimulatorBackend::new(config.simulator.backend.clone()).with_queue_polls(config.simulator.queue_polls);
    println!(
        "{} Running {} circuits x {} jobs on {} ({} shots)",
        style("→").cyan().bold(),
        style(batch.len()).green(),
        repetitions,
        style(backend.name()).yellow(),
        shots
    );

    let circuits: Vec<Circuit> = batch.entries().iter().map(|e| e.circuit.clone()).collect();
    let mut handler = ResultHandler::new(layout.clone(), &batch);
    let policy = config.wait.policy();

    let progress = ProgressBar::new(u64::from(repetitions));
    progress.set_style(ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?);
    let (mut completed, mut timed_out) = (0, 0);
    for _ in 0..repetitions {
        progress.set_message("submitting");
        let job_id = backend.submit(&circuits, shots).await?;
        progress.set_message(format!("waiting for {job_id}"));
        let outcome = backend.wait(&job_id, policy).await;
        match handler.handle(&job_id, outcome).await? {
            HandlerOutcome::Completed { .. } => completed += 1,
            HandlerOutcome::TimedOut => timed_out += 1,
        }
        progress.inc(1);
    }
    progress.finish_and_clear();
    println!("  Completed: {completed}, timed out: {timed_out}");

    if timed_out > 0 {
        let pending_path = layout.id_list(TIMED_OUT_LIST);
        let mut refetched = 0;
        for round in 1..=config.wait.refetch_rounds {
            if read_ids(&pending_path).await?.is_empty() {
                break;
            }
            let spinner = spinner(format!("Re-fetching timed-out jobs (pass {round})..."))?;
            tokio::time::sleep(policy.poll_interval).await;
            refetched += refetch_pending(&backend, &layout, TIMED_OUT_LIST).await?;
            spinner.finish_and_clear();
        }
        let pending = read_ids(&pending_path).await?.len();
        println!("  Re-fetched: {refetched}, still pending: {pending}");
    }

    process::process_pending(config, &layout).await?;
    Ok(())
}
