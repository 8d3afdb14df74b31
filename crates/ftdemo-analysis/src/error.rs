//! Analysis error types.

use ftdemo_catalog::CatalogError;
use ftdemo_sched::SchedError;
use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised while decoding, aggregating or rendering results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// A record in which no shot decoded to a logical outcome.
    #[error("No valid shots in {0}")]
    NoValidShots(String),

    /// Circuit name or experiment lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Reading dumps or id lists failed.
    #[error("Data error: {0}")]
    Sched(#[from] SchedError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Family label not recognised, or absent from the data.
    #[error("Unknown family: '{0}'")]
    UnknownFamily(String),

    /// Confidence level outside `(0, 1)`.
    #[error("Invalid confidence level {0}: expected a value in (0, 1)")]
    InvalidConfidence(f64),

    /// Not enough records for the requested summary.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Rendering a figure failed.
    #[error("Plot error: {0}")]
    Plot(String),
}
