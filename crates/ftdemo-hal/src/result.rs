//! Measurement results returned by a backend.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::job::{JobId, JobStatus};

/// Histogram of measured bitstrings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(FxHashMap<String, u64>);

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Occurrences of `bitstring`.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of recorded shots.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of distinct bitstrings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(bitstring, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The most frequent bitstring, if any.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.iter().max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bitstring, count) in iter {
            counts.insert(bitstring, count);
        }
        counts
    }
}

/// Result of one circuit in a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitResult {
    /// Name of the executed circuit.
    pub name: String,
    /// QASM source as executed.
    pub qasm: String,
    /// Measured histogram.
    pub counts: Counts,
    /// Completion time.
    pub date: DateTime<Utc>,
}

/// Result of a completed job, as dumped to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Job identifier.
    pub job_id: JobId,
    /// Final status.
    pub status: JobStatus,
    /// Shots per circuit.
    pub shots: u32,
    /// One entry per submitted circuit, in submission order.
    pub circuits: Vec<CircuitResult>,
    /// Device calibration at execution time.
    pub calibration: Calibration,
}

impl JobResult {
    /// Find the result of a circuit by name.
    pub fn circuit(&self, name: &str) -> Option<&CircuitResult> {
        self.circuits.iter().find(|c| c.name == name)
    }
}
