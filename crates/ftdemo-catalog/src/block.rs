//! Gate blocks with bare and encoded realizations.
//!
//! | Block | Bare (pair `[a, b]`) | Encoded (mapping `m`) |
//! |-------|----------------------|-----------------------|
//! | `X1` | `x a` | `x m0; x m1` |
//! | `X2` | `x b` | `x m0; x m2` |
//! | `Z1` | `z a` | `z m1; z m3` |
//! | `Z2` | `z b` | `z m2; z m3` |
//! | `HHS` | `h a; h b` | `h m0..m3` |
//! | `CZ` | `h b; cx a,b; h b` | `s m0..m3` |
//!
//! On the encoded side `HHS` is a transversal Hadamard, which also swaps the
//! two logical qubits. The bare `HHS` does not swap, so the bare circuit
//! builder tracks the swap parity and exchanges the indices of later `X`/`Z`
//! blocks instead.

use std::fmt;
use std::str::FromStr;

use ftdemo_ir::Circuit;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::layout::{Mapping, NUM_QUBITS, QubitPair};

/// A named gate block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GateBlock {
    /// Logical X on qubit 1.
    X1,
    /// Logical X on qubit 2.
    X2,
    /// Logical Z on qubit 1.
    Z1,
    /// Logical Z on qubit 2.
    Z2,
    /// Hadamard on both logical qubits (with a logical swap when encoded).
    HHS,
    /// Controlled-Z between the logical qubits.
    CZ,
}

impl GateBlock {
    /// All blocks in catalog order.
    pub const ALL: [GateBlock; 6] = [
        GateBlock::X1,
        GateBlock::X2,
        GateBlock::Z1,
        GateBlock::Z2,
        GateBlock::HHS,
        GateBlock::CZ,
    ];

    /// The catalog key of this block.
    pub fn key(&self) -> &'static str {
        match self {
            GateBlock::X1 => "X1",
            GateBlock::X2 => "X2",
            GateBlock::Z1 => "Z1",
            GateBlock::Z2 => "Z2",
            GateBlock::HHS => "HHS",
            GateBlock::CZ => "CZ",
        }
    }

    /// Whether this block exchanges the logical roles of the bare pair.
    pub fn is_hadamard(&self) -> bool {
        matches!(self, GateBlock::HHS)
    }

    /// The single-qubit variant acting on the logical qubit that currently
    /// carries this block's index after `swaps` role exchanges.
    #[must_use]
    pub fn oriented(self, swaps: usize) -> Self {
        let flip = swaps % 2 == 1;
        match (self, flip) {
            (GateBlock::X1, true) => GateBlock::X2,
            (GateBlock::X2, true) => GateBlock::X1,
            (GateBlock::Z1, true) => GateBlock::Z2,
            (GateBlock::Z2, true) => GateBlock::Z1,
            (block, _) => block,
        }
    }

    /// Build the bare realization on `pair`.
    pub fn bare_circuit(self, pair: QubitPair) -> CatalogResult<Circuit> {
        let (a, b) = (pair.first(), pair.second());
        let mut circuit = Circuit::with_size(format!("b{}{pair}", self.key()), NUM_QUBITS, NUM_QUBITS);
        match self {
            GateBlock::X1 => {
                circuit.x(a)?;
            }
            GateBlock::X2 => {
                circuit.x(b)?;
            }
            GateBlock::Z1 => {
                circuit.z(a)?;
            }
            GateBlock::Z2 => {
                circuit.z(b)?;
            }
            GateBlock::HHS => {
                circuit.h(a)?.h(b)?;
            }
            GateBlock::CZ => {
                circuit.h(b)?.cx(a, b)?.h(b)?;
            }
        }
        Ok(circuit)
    }

    /// Build the encoded realization under `mapping`.
    pub fn encoded_circuit(self, mapping: &Mapping) -> CatalogResult<Circuit> {
        let m = mapping.roles();
        let mut circuit = Circuit::with_size(format!("e{}", self.key()), NUM_QUBITS, NUM_QUBITS);
        match self {
            GateBlock::X1 => {
                circuit.x(m[0])?.x(m[1])?;
            }
            GateBlock::X2 => {
                circuit.x(m[0])?.x(m[2])?;
            }
            GateBlock::Z1 => {
                circuit.z(m[1])?.z(m[3])?;
            }
            GateBlock::Z2 => {
                circuit.z(m[2])?.z(m[3])?;
            }
            GateBlock::HHS => {
                for q in m {
                    circuit.h(q)?;
                }
            }
            GateBlock::CZ => {
                for q in m {
                    circuit.s(q)?;
                }
            }
        }
        Ok(circuit)
    }
}

impl fmt::Display for GateBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GateBlock {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GateBlock::ALL
            .into_iter()
            .find(|block| block.key() == s)
            .ok_or_else(|| CatalogError::UnknownGateBlock(s.to_string()))
    }
}

impl TryFrom<String> for GateBlock {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GateBlock> for String {
    fn from(block: GateBlock) -> Self {
        block.key().to_string()
    }
}
