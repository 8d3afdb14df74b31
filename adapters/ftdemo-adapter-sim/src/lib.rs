//! Local simulator backend.
//!
//! A statevector simulator for the 5-qubit device with optional bit-flip
//! noise after every gate and at readout. Bitstrings are rendered with
//! classical bit 0 as the first character.
//!
//! ```ignore
//! use ftdemo_adapter_sim::{SimulatorBackend, SimulatorConfig};
//! use ftdemo_hal::{Backend, WaitPolicy};
//!
//! let backend = SimulatorBackend::new(SimulatorConfig::ideal(7));
//! let job = backend.submit(&circuits, 1024).await?;
//! let result = backend.wait(&job, WaitPolicy::default()).await?;
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEVICE_COUPLINGS, SimulatorBackend, SimulatorConfig};
pub use statevector::Statevector;
