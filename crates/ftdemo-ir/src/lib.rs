//! Circuit representation for the fault-tolerance experiments
//!
//! The experiments only ever need a handful of Clifford gates on a fixed
//! 5-qubit register, so circuits are stored as a flat, ordered instruction
//! list rather than a DAG. Gate blocks are built as small sub-circuits and
//! composed with [`Circuit::extend`].
//!
//! # Example: Building a Bell pair on qubits 1 and 0
//!
//! ```rust
//! use ftdemo_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 5, 5);
//! circuit.h(QubitId(1)).unwrap();
//! circuit.cx(QubitId(1), QubitId(0)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.gate_count(), 2);
//! assert_eq!(circuit.op_count(), 7);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Z` | 1 | Pauli gates |
//! | `S` | 1 | Phase gate |
//! | `CX` | 2 | Controlled-NOT (CNOT) |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qasm;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qasm::{emit_qasm2, qasm_op_count};
pub use qubit::{ClbitId, QubitId};
