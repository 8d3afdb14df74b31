//! Append-only statistics logs, one JSON line per run.

use std::path::Path;

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use ftdemo_sched::DataLayout;

use crate::error::AnalysisResult;
use crate::stats::DecodedStats;

/// Records read back from one or more logs.
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    /// Well-formed records in file order.
    pub records: Vec<DecodedStats>,
    /// Lines that failed to parse.
    pub skipped: usize,
}

impl LoadedLog {
    fn merge(&mut self, other: LoadedLog) {
        self.records.extend(other.records);
        self.skipped += other.skipped;
    }
}

/// Append one run to the log of its circuit.
pub async fn append_stats(layout: &DataLayout, stats: &DecodedStats) -> AnalysisResult<()> {
    fs::create_dir_all(layout.processed_dir()).await?;
    let path = layout.stats_log(&stats.id.file_stem());
    let mut line = serde_json::to_string(stats)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Read one log, skipping malformed lines.
pub async fn read_log(path: &Path) -> AnalysisResult<LoadedLog> {
    let content = fs::read_to_string(path).await?;
    let mut loaded = LoadedLog::default();
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<DecodedStats>(line) {
            Ok(stats) => loaded.records.push(stats),
            Err(e) => {
                warn!(path = %path.display(), line = n + 1, error = %e, "skipping malformed record");
                loaded.skipped += 1;
            }
        }
    }
    Ok(loaded)
}

/// Read every log under the processed-data directory, in file name order.
///
/// A missing directory yields an empty result.
pub async fn read_all_logs(layout: &DataLayout) -> AnalysisResult<LoadedLog> {
    let dir = layout.processed_dir();
    let mut entries = match fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LoadedLog::default()),
        Err(e) => return Err(e.into()),
    };
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "jsonl") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut loaded = LoadedLog::default();
    for path in paths {
        loaded.merge(read_log(&path).await?);
    }
    Ok(loaded)
}
