//! Processing of API dumps into statistics logs.

use rustc_hash::FxHashSet;
use tracing::{info, instrument, warn};

use ftdemo_hal::JobId;
use ftdemo_sched::{DataLayout, PROCESSED_LIST, append_id, read_dump, read_ids};

use crate::analyzer::{Analyzer, ResultRecord};
use crate::error::{AnalysisError, AnalysisResult};
use crate::log::append_stats;

/// Decode every circuit of one dump and append its statistics.
///
/// The whole dump is analyzed before anything is appended. Circuits whose
/// name matches no experiment, or without a single valid shot, are skipped
/// with a warning. Returns the number of records written.
#[instrument(skip(analyzer, layout), fields(job = %job_id))]
pub async fn process_dump(analyzer: &Analyzer, layout: &DataLayout, job_id: &JobId) -> AnalysisResult<usize> {
    let dump = read_dump(layout, job_id).await?;
    let mut decoded = Vec::with_capacity(dump.circuits.len());
    for circuit in &dump.circuits {
        let record = match ResultRecord::from_circuit(circuit, &dump.calibration, analyzer.catalog()) {
            Ok(record) => record,
            Err(AnalysisError::Catalog(e)) => {
                warn!(circuit = %circuit.name, error = %e, "unknown circuit, record skipped");
                continue;
            }
            Err(e) => return Err(e),
        };
        match analyzer.analyze(&record) {
            Ok(stats) => decoded.push(stats),
            Err(AnalysisError::NoValidShots(name)) => {
                warn!(circuit = %name, "no valid shots, record skipped");
            }
            Err(AnalysisError::Catalog(e)) => {
                warn!(circuit = %circuit.name, error = %e, "unknown circuit, record skipped");
            }
            Err(e) => return Err(e),
        }
    }
    for stats in &decoded {
        append_stats(layout, stats).await?;
    }
    Ok(decoded.len())
}

/// Process every dump listed in `list` that is not yet in the processed
/// list, recording each one once done. Returns the number of dumps
/// processed.
#[instrument(skip(analyzer, layout))]
pub async fn process_all_dumps(analyzer: &Analyzer, layout: &DataLayout, list: &str) -> AnalysisResult<usize> {
    let processed_path = layout.id_list(PROCESSED_LIST);
    let mut processed: FxHashSet<JobId> = read_ids(&processed_path).await?.into_iter().collect();
    let mut count = 0;
    for job_id in read_ids(&layout.id_list(list)).await? {
        if processed.contains(&job_id) {
            continue;
        }
        let records = process_dump(analyzer, layout, &job_id).await?;
        append_id(&processed_path, &job_id).await?;
        info!(job = %job_id, records, "dump processed");
        processed.insert(job_id);
        count += 1;
    }
    Ok(count)
}
