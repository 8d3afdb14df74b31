//! Physical layout: qubit pairs, the encoding mapping and bitstring order.

use std::fmt;
use std::str::FromStr;

use ftdemo_ir::QubitId;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Number of physical qubits on the device.
pub const NUM_QUBITS: u32 = 5;

/// Ordered pair of physical qubits carrying the two bare logical qubits.
///
/// `first` carries logical qubit 1 and `second` logical qubit 2 until an
/// `HHS` block swaps the roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[u32; 2]", into = "[u32; 2]")]
pub struct QubitPair([u32; 2]);

impl QubitPair {
    /// Create a pair of distinct on-device qubits.
    pub fn new(first: u32, second: u32) -> CatalogResult<Self> {
        if first >= NUM_QUBITS || second >= NUM_QUBITS {
            return Err(CatalogError::InvalidPair(format!(
                "[{first}, {second}] exceeds the {NUM_QUBITS}-qubit device"
            )));
        }
        if first == second {
            return Err(CatalogError::InvalidPair(format!(
                "[{first}, {second}] repeats a qubit"
            )));
        }
        Ok(Self([first, second]))
    }

    /// Qubit carrying logical qubit 1.
    pub fn first(&self) -> QubitId {
        QubitId(self.0[0])
    }

    /// Qubit carrying logical qubit 2.
    pub fn second(&self) -> QubitId {
        QubitId(self.0[1])
    }

    /// The pair with its roles exchanged.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self([self.0[1], self.0[0]])
    }

    /// Raw qubit indices.
    pub fn indices(&self) -> [u32; 2] {
        self.0
    }
}

impl fmt::Display for QubitPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.0[0], self.0[1])
    }
}

impl FromStr for QubitPair {
    type Err = CatalogError;

    /// Parse the `[a, b]` rendering.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CatalogError::InvalidPair(format!("cannot parse '{s}'"));
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(invalid)?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u32>());
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(a)), Some(Ok(b)), None) => Self::new(a, b),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<[u32; 2]> for QubitPair {
    type Error = CatalogError;

    fn try_from(value: [u32; 2]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1])
    }
}

impl From<QubitPair> for [u32; 2] {
    fn from(pair: QubitPair) -> Self {
        pair.0
    }
}

/// The pairs used on the 5-qubit device, one per directed coupling.
pub fn default_pairs() -> Vec<QubitPair> {
    [[1, 0], [2, 0], [2, 1], [2, 4], [3, 2], [3, 4]]
        .into_iter()
        .map(QubitPair)
        .collect()
}

/// Assignment of the four code roles to physical qubits.
///
/// The one physical qubit outside the mapping is the flag qubit; it must
/// read `0` for an encoded shot to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u32; 4]", into = "[u32; 4]")]
pub struct Mapping([u32; 4]);

impl Mapping {
    /// Create a mapping of four distinct on-device qubits.
    pub fn new(roles: [u32; 4]) -> CatalogResult<Self> {
        for (i, &q) in roles.iter().enumerate() {
            if q >= NUM_QUBITS {
                return Err(CatalogError::InvalidMapping(format!(
                    "{roles:?}: qubit {q} exceeds the {NUM_QUBITS}-qubit device"
                )));
            }
            if roles[..i].contains(&q) {
                return Err(CatalogError::InvalidMapping(format!(
                    "{roles:?}: qubit {q} assigned twice"
                )));
            }
        }
        Ok(Self(roles))
    }

    /// Physical qubit playing code role `role` (0..4).
    pub fn role(&self, role: usize) -> QubitId {
        QubitId(self.0[role])
    }

    /// Physical qubits in role order.
    pub fn roles(&self) -> [QubitId; 4] {
        self.0.map(QubitId)
    }

    /// The physical qubit not used by the code.
    pub fn flag_qubit(&self) -> QubitId {
        // Four distinct qubits out of five leave exactly one.
        let used: u32 = self.0.iter().map(|q| 1 << q).sum();
        QubitId((!used & ((1 << NUM_QUBITS) - 1)).trailing_zeros())
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self([3, 2, 1, 4])
    }
}

impl TryFrom<[u32; 4]> for Mapping {
    type Error = CatalogError;

    fn try_from(value: [u32; 4]) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Mapping> for [u32; 4] {
    fn from(mapping: Mapping) -> Self {
        mapping.0
    }
}

/// How a backend lays out measured bits in a bitstring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Character `i` is qubit `i`.
    #[default]
    QubitZeroFirst,
    /// Character `i` is qubit `n - 1 - i`.
    QubitZeroLast,
}

impl BitOrder {
    fn qubit_at(self, position: usize, width: usize) -> usize {
        match self {
            BitOrder::QubitZeroFirst => position,
            BitOrder::QubitZeroLast => width - 1 - position,
        }
    }

    /// Parse a bitstring into a mask with bit `q` set when qubit `q` read 1.
    ///
    /// Returns `None` for strings of the wrong width or with characters
    /// other than `0` and `1`.
    pub fn parse_mask(self, bits: &str, width: usize) -> Option<u32> {
        let bytes = bits.as_bytes();
        if bytes.len() != width {
            return None;
        }
        let mut mask = 0;
        for (position, &byte) in bytes.iter().enumerate() {
            match byte {
                b'0' => {}
                b'1' => mask |= 1 << self.qubit_at(position, width),
                _ => return None,
            }
        }
        Some(mask)
    }

    /// Render a mask as a bitstring of `width` characters.
    pub fn render(self, mask: u32, width: usize) -> String {
        (0..width)
            .map(|position| {
                if (mask >> self.qubit_at(position, width)) & 1 == 1 {
                    '1'
                } else {
                    '0'
                }
            })
            .collect()
    }
}
