//! On-disk data layout.
//!
//! ```text
//! <root>/
//!   callback.log                       one line per handled job
//!   completed.txt                      ids of completed jobs
//!   timed_out.txt                      ids still to re-fetch
//!   completed_timed_out.txt            ids re-fetched later
//!   processed.txt                      ids whose dumps were analyzed
//!   Raw_counts/<stem>_<date>.json      counts per circuit and run
//!   API_dumps/api_dump_<id>.json       full job results
//!   Processed_data/<stem>.jsonl        decoded statistics, one run per line
//!   Exports/                           .dat tables
//!   Plots/                             rendered figures
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ftdemo_hal::JobId;
use tokio::fs;

use crate::error::SchedResult;

/// Id list of completed jobs.
pub const COMPLETED_LIST: &str = "completed.txt";
/// Id list of timed-out jobs.
pub const TIMED_OUT_LIST: &str = "timed_out.txt";
/// Id list of processed dumps.
pub const PROCESSED_LIST: &str = "processed.txt";

/// File name of the list recording ids re-fetched from `list`.
pub fn refetched_name(list: &str) -> String {
    format!("completed_{list}")
}

/// Paths of every artifact under a data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create every directory of the layout.
    pub async fn ensure_dirs(&self) -> SchedResult<()> {
        for dir in [
            self.raw_counts_dir(),
            self.dumps_dir(),
            self.processed_dir(),
            self.exports_dir(),
            self.plots_dir(),
        ] {
            fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// The data root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Append-only callback log.
    pub fn callback_log(&self) -> PathBuf {
        self.root.join("callback.log")
    }

    /// An id list by file name, e.g. [`COMPLETED_LIST`].
    pub fn id_list(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Where ids re-fetched from the list `name` are recorded.
    pub fn refetched_list(&self, name: &str) -> PathBuf {
        self.root.join(refetched_name(name))
    }

    /// Directory of raw counts.
    pub fn raw_counts_dir(&self) -> PathBuf {
        self.root.join("Raw_counts")
    }

    /// Raw counts of one circuit in one run.
    pub fn raw_counts_file(&self, stem: &str, date: &DateTime<Utc>) -> PathBuf {
        self.raw_counts_dir()
            .join(format!("{stem}_{}.json", date.format("%Y-%m-%dT%H-%M-%S%.3f")))
    }

    /// Directory of API dumps.
    pub fn dumps_dir(&self) -> PathBuf {
        self.root.join("API_dumps")
    }

    /// Full job result of `job_id`.
    pub fn dump_file(&self, job_id: &JobId) -> PathBuf {
        self.dumps_dir().join(format!("api_dump_{job_id}.json"))
    }

    /// Directory of statistics logs.
    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("Processed_data")
    }

    /// Statistics log of one circuit.
    pub fn stats_log(&self, stem: &str) -> PathBuf {
        self.processed_dir().join(format!("{stem}.jsonl"))
    }

    /// Directory of exported tables.
    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("Exports")
    }

    /// Directory of rendered plots.
    pub fn plots_dir(&self) -> PathBuf {
        self.root.join("Plots")
    }
}
