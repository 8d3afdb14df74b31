//! Gate set used by the experiment blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard gates with known semantics.
///
/// Only the Clifford gates the bare and encoded blocks are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardGate {
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Pauli-Z gate.
    Z,
    /// S gate (sqrt(Z)).
    S,
    /// Controlled-X (CNOT) gate, control first.
    CX,
}

impl StandardGate {
    /// Get the QASM name of this gate.
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::H => "h",
            StandardGate::X => "x",
            StandardGate::Z => "z",
            StandardGate::S => "s",
            StandardGate::CX => "cx",
        }
    }

    /// Get the number of qubits this gate acts on.
    pub fn num_qubits(&self) -> usize {
        match self {
            StandardGate::H | StandardGate::X | StandardGate::Z | StandardGate::S => 1,
            StandardGate::CX => 2,
        }
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_arity() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::S.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
    }

    #[test]
    fn test_gate_names() {
        assert_eq!(StandardGate::CX.to_string(), "cx");
        assert_eq!(StandardGate::Z.name(), "z");
    }
}
