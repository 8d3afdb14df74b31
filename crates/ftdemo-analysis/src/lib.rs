//! Decoding, statistics and aggregation of demonstration results.
//!
//! Results flow through three stages:
//!
//! ```text
//!   API dump ──→ Analyzer ──→ stats log (.jsonl) ──→ Aggregation ──→ .dat / .svg
//!              (decode + stats)   (append-only)       (per family)
//! ```
//!
//! A bare result is read on its qubit pair; an encoded result is
//! post-selected on the codewords of the four-qubit code.
//!
//! ```rust
//! use chrono::Utc;
//! use ftdemo_analysis::{Analyzer, ResultRecord};
//! use ftdemo_catalog::{BitOrder, CircuitId, ExperimentCatalog, Mapping};
//! use ftdemo_hal::Calibration;
//!
//! let catalog = ExperimentCatalog::standard().unwrap();
//! let analyzer = Analyzer::new(catalog, Mapping::default(), BitOrder::QubitZeroFirst);
//! let record = ResultRecord {
//!     id: CircuitId::parse("bMX1|00>[1, 0]", analyzer.catalog()).unwrap(),
//!     counts: [("01000", 100)].into_iter().collect(),
//!     qasm_count: 6,
//!     calibration: Calibration::default(),
//!     date: Utc::now(),
//! };
//! let stats = analyzer.analyze(&record).unwrap();
//! assert_eq!(stats.counts.get("01"), Some(100));
//! assert_eq!(stats.stat_dist, 0.0);
//! ```

pub mod aggregate;
pub mod analyzer;
pub mod calibration;
pub mod decode;
pub mod error;
pub mod export;
pub mod log;
pub mod pipeline;
pub mod plot;
pub mod stats;
pub mod tdist;

pub use aggregate::{
    Aggregation, DEFAULT_CONFIDENCE, DiffPoint, DiffSeries, Family, FamilySummary, PointSummary, RawPoint, raw_points,
};
pub use analyzer::{Analyzer, ResultRecord};
pub use calibration::{CalibrationSummary, CouplingSummary, Estimate, QubitSummary, summarize_calibration};
pub use decode::{BareDecoder, DecodedCounts, Decoder, EncodedDecoder, OUTCOME_LABELS};
pub use error::{AnalysisError, AnalysisResult};
pub use log::{LoadedLog, append_stats, read_all_logs, read_log};
pub use pipeline::{process_all_dumps, process_dump};
pub use stats::{DecodedStats, RunContext, statistical_distance};
