//! Result handler invoked once per finished job.

use chrono::Local;
use rustc_hash::FxHashMap;
use tokio::fs;
use tracing::{info, instrument, warn};

use ftdemo_catalog::CircuitBatch;
use ftdemo_hal::{HalError, HalResult, JobId, JobResult};

use crate::error::SchedResult;
use crate::idlist::{append_id, append_line};
use crate::layout::{COMPLETED_LIST, DataLayout, TIMED_OUT_LIST};

/// What the handler did with a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Counts and dump written, id recorded as completed.
    Completed {
        /// Number of circuits written.
        circuits: usize,
    },
    /// Id recorded for a later re-fetch; nothing else written.
    TimedOut,
}

/// Writes every artifact of a finished job.
///
/// Methods take `&mut self`, so jobs are handled one at a time.
#[derive(Debug)]
pub struct ResultHandler {
    layout: DataLayout,
    stems: FxHashMap<String, String>,
}

impl ResultHandler {
    /// Handler writing under `layout` for the circuits of `batch`.
    pub fn new(layout: DataLayout, batch: &CircuitBatch) -> Self {
        let stems = batch
            .entries()
            .iter()
            .map(|e| (e.id.name(), e.id.file_stem()))
            .collect();
        Self { layout, stems }
    }

    /// The layout written to.
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// File stem of a circuit name; names outside the batch are sanitized.
    pub fn stem_of(&self, name: &str) -> String {
        self.stems.get(name).cloned().unwrap_or_else(|| {
            name.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                .collect()
        })
    }

    /// Handle the outcome of waiting for `job_id`.
    ///
    /// A timeout is recorded in the timed-out list; any other backend error
    /// is returned unchanged.
    #[instrument(skip(self, outcome), fields(job = %job_id))]
    pub async fn handle(&mut self, job_id: &JobId, outcome: HalResult<JobResult>) -> SchedResult<HandlerOutcome> {
        fs::create_dir_all(self.layout.root()).await?;
        match outcome {
            Ok(result) => {
                self.log_callback(&result.status.to_string(), job_id).await?;
                let circuits = self.write_completed(&result).await?;
                info!(circuits, "job completed");
                Ok(HandlerOutcome::Completed { circuits })
            }
            Err(HalError::Timeout(_)) => {
                self.log_callback("TIMEOUT", job_id).await?;
                append_id(&self.layout.id_list(TIMED_OUT_LIST), job_id).await?;
                warn!("job timed out, recorded for re-fetch");
                Ok(HandlerOutcome::TimedOut)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn log_callback(&self, status: &str, job_id: &JobId) -> SchedResult<()> {
        let timestamp = Local::now().format("%a %b %e %H:%M:%S %Y");
        append_line(&self.layout.callback_log(), &format!("{timestamp}:{status} - id: {job_id}")).await
    }

    async fn write_completed(&self, result: &JobResult) -> SchedResult<usize> {
        self.layout.ensure_dirs().await?;
        for circuit in &result.circuits {
            let path = self
                .layout
                .raw_counts_file(&self.stem_of(&circuit.name), &circuit.date);
            fs::write(&path, serde_json::to_string(&circuit.counts)?).await?;
        }
        write_dump(&self.layout, result).await?;
        append_id(&self.layout.id_list(COMPLETED_LIST), &result.job_id).await?;
        Ok(result.circuits.len())
    }
}

/// Write the full result of a job to its API dump.
pub async fn write_dump(layout: &DataLayout, result: &JobResult) -> SchedResult<()> {
    fs::create_dir_all(layout.dumps_dir()).await?;
    let json = serde_json::to_string_pretty(result)?;
    fs::write(layout.dump_file(&result.job_id), json).await?;
    Ok(())
}

/// Read the API dump of a job.
pub async fn read_dump(layout: &DataLayout, job_id: &JobId) -> SchedResult<JobResult> {
    match fs::read_to_string(layout.dump_file(job_id)).await {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(crate::error::SchedError::DumpNotFound(job_id.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
