//! Error handling for result handling and persistence.

use ftdemo_hal::HalError;
use thiserror::Error;

/// Result type for scheduler operations.
pub type SchedResult<T> = Result<T, SchedError>;

/// Errors that can occur while handling job results.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SchedError {
    /// Backend error other than a wait timeout.
    #[error("Backend error: {0}")]
    Backend(#[from] HalError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An API dump does not exist.
    #[error("No API dump for job {0}")]
    DumpNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchedError::DumpNotFound("job-123".to_string());
        assert_eq!(err.to_string(), "No API dump for job job-123");

        let err: SchedError = HalError::JobCancelled.into();
        assert_eq!(err.to_string(), "Backend error: Job cancelled");
    }
}
