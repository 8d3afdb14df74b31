//! Execution backend abstraction.
//!
//! Circuits are executed remotely in batches. A [`Backend`] accepts a batch,
//! reports its [`JobStatus`] and eventually returns a [`JobResult`] holding
//! one [`CircuitResult`] per circuit plus the device [`Calibration`] at
//! execution time.

pub mod backend;
pub mod calibration;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, WaitPolicy};
pub use calibration::{Calibration, CouplingCalibration, QubitCalibration};
pub use error::{HalError, HalResult};
pub use job::{JobId, JobStatus};
pub use result::{CircuitResult, Counts, JobResult};
