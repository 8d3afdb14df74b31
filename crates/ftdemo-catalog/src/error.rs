//! Catalog error types.
//!
//! Every variant is a configuration error: circuit generation stops at the
//! first one and no partial batch is returned.

use ftdemo_ir::IrError;
use thiserror::Error;

/// Errors raised while defining experiments or generating circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// Gate block key not present in the block catalog.
    #[error("Unknown gate block: '{0}'")]
    UnknownGateBlock(String),

    /// Initial state label not present in the state catalog.
    #[error("Unknown initial state: '{0}'")]
    UnknownState(String),

    /// Encoding version tag not recognised.
    #[error("Unknown encoding version: '{0}'")]
    UnknownVersion(String),

    /// Encoding version missing for `|00>` or given for another state.
    #[error("State {state} does not accept encoding version {version:?}")]
    VersionMismatch {
        /// Initial state label.
        state: String,
        /// The offending version tag, if any.
        version: Option<String>,
    },

    /// Qubit pair is out of range or not made of distinct qubits.
    #[error("Invalid qubit pair: {0}")]
    InvalidPair(String),

    /// Mapping is out of range or not injective.
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    /// Expected distribution is not a probability distribution.
    #[error("Invalid expected distribution for {label}: {reason}")]
    InvalidDistribution {
        /// Experiment label.
        label: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two experiments share the same canonical label.
    #[error("Duplicate experiment label: {0}")]
    DuplicateLabel(String),

    /// Two generated circuits share the same name.
    #[error("Duplicate circuit name in batch: {0}")]
    DuplicateName(String),

    /// No experiment matches the label recovered from a name.
    #[error("No experiment matches label '{0}'")]
    SpecNotFound(String),

    /// Circuit name does not follow the naming scheme.
    #[error("Cannot parse circuit name '{name}': {reason}")]
    InvalidName {
        /// The name being parsed.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Circuit construction failed.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
