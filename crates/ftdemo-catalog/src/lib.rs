//! Experiment catalog and circuit generation.
//!
//! Every experiment of the [`ExperimentCatalog`] is realized twice: as a bare
//! circuit on each [`QubitPair`], and as encoded circuits in the four-qubit
//! error-detecting code laid out by a [`Mapping`]. Each generated circuit
//! carries a [`CircuitId`] so that results can be decoded without parsing
//! names.
//!
//! ```rust
//! use ftdemo_catalog::{CatalogBuilder, ExperimentCatalog};
//!
//! let catalog = ExperimentCatalog::standard().unwrap();
//! let batch = CatalogBuilder::new().build(&catalog).unwrap();
//!
//! let entry = batch.get("eMX1|00>ftv1").unwrap();
//! assert_eq!(entry.id.label, "MX1|00>");
//! assert!(entry.circuit.to_qasm().starts_with("OPENQASM 2.0;"));
//! ```

pub mod block;
pub mod builder;
pub mod code;
pub mod error;
pub mod experiment;
pub mod id;
pub mod layout;
pub mod state;

pub use block::GateBlock;
pub use builder::{BareFold, CatalogBuilder, CatalogEntry, CircuitBatch, standard_batch};
pub use code::{CODEWORDS, CodewordTable};
pub use error::{CatalogError, CatalogResult};
pub use experiment::{ExperimentCatalog, ExperimentSpec, SpecId};
pub use id::{CircuitId, Variant, label_stem};
pub use layout::{BitOrder, Mapping, NUM_QUBITS, QubitPair, default_pairs};
pub use state::{EncodingVersion, InitialState};
