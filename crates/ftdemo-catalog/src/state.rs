//! Initial states and their preparation circuits.

use std::fmt;
use std::str::FromStr;

use ftdemo_ir::{Circuit, QubitId};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::layout::{NUM_QUBITS, QubitPair};

/// Logical two-qubit input state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InitialState {
    /// `|00>`
    Zero,
    /// `|0+>`
    ZeroPlus,
    /// `|00>+|11>`
    Bell,
}

impl InitialState {
    /// All states in catalog order.
    pub const ALL: [InitialState; 3] = [InitialState::Zero, InitialState::ZeroPlus, InitialState::Bell];

    /// The label used in experiment labels and circuit names.
    pub fn label(&self) -> &'static str {
        match self {
            InitialState::Zero => "|00>",
            InitialState::ZeroPlus => "|0+>",
            InitialState::Bell => "|00>+|11>",
        }
    }

    /// Encoded preparation variants for this state.
    ///
    /// `|00>` has three fault-tolerance variants; the other states have a
    /// single untagged preparation, represented by `None`.
    pub fn versions(&self) -> Vec<Option<EncodingVersion>> {
        match self {
            InitialState::Zero => EncodingVersion::ALL.into_iter().map(Some).collect(),
            InitialState::ZeroPlus | InitialState::Bell => vec![None],
        }
    }

    /// Check that `version` is a valid variant tag for this state.
    pub fn check_version(&self, version: Option<EncodingVersion>) -> CatalogResult<()> {
        match (self, version) {
            (InitialState::Zero, Some(_)) | (InitialState::ZeroPlus | InitialState::Bell, None) => {
                Ok(())
            }
            _ => Err(CatalogError::VersionMismatch {
                state: self.label().to_string(),
                version: version.map(|v| v.tag().to_string()),
            }),
        }
    }

    /// Bare preparation on `pair`.
    pub fn bare_preparation(&self, pair: QubitPair) -> CatalogResult<Circuit> {
        let (a, b) = (pair.first(), pair.second());
        let mut circuit = Circuit::with_size(format!("b{}{pair}", self.label()), NUM_QUBITS, NUM_QUBITS);
        match self {
            InitialState::Zero => {}
            InitialState::ZeroPlus => {
                circuit.h(b)?;
            }
            InitialState::Bell => {
                circuit.h(a)?.cx(a, b)?;
            }
        }
        Ok(circuit)
    }

    /// Encoded preparation on fixed physical qubits.
    ///
    /// The preparations are tied to the device's coupling map and to the
    /// default mapping `[3, 2, 1, 4]`, with qubit 0 as the flag qubit.
    pub fn encoded_preparation(&self, version: Option<EncodingVersion>) -> CatalogResult<Circuit> {
        self.check_version(version)?;
        let tag = version.map(|v| v.tag()).unwrap_or_default();
        let mut c = Circuit::with_size(format!("e{}{tag}", self.label()), NUM_QUBITS, NUM_QUBITS);
        let q = QubitId;
        match (self, version) {
            (InitialState::Zero, Some(EncodingVersion::Ftv1)) => {
                c.h(q(2))?.cx(q(2), q(0))?.cx(q(2), q(1))?.h(q(2))?;
                c.h(q(3))?.cx(q(3), q(2))?.h(q(2))?.h(q(3))?;
                c.cx(q(2), q(4))?.cx(q(2), q(0))?;
            }
            (InitialState::Zero, Some(EncodingVersion::Nftv1)) => {
                c.h(q(3))?.cx(q(3), q(4))?.cx(q(3), q(2))?.cx(q(2), q(1))?;
            }
            (InitialState::Zero, Some(EncodingVersion::Ftv2)) => {
                c.h(q(3))?.cx(q(3), q(2))?.h(q(2))?.h(q(3))?;
                c.cx(q(2), q(1))?.cx(q(3), q(4))?.h(q(4))?;
                c.swap_directed(q(2), q(4))?;
                c.cx(q(2), q(0))?.cx(q(1), q(0))?.h(q(4))?;
            }
            (InitialState::ZeroPlus, None) => {
                c.h(q(1))?.h(q(3))?.cx(q(3), q(2))?;
                c.swap_directed(q(2), q(1))?;
                c.cx(q(2), q(4))?;
            }
            (InitialState::Bell, None) => {
                c.h(q(2))?.h(q(3))?.cx(q(2), q(1))?.cx(q(3), q(4))?;
            }
            // check_version rejected every other combination
            _ => {}
        }
        Ok(c)
    }
}

impl fmt::Display for InitialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InitialState {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InitialState::ALL
            .into_iter()
            .find(|state| state.label() == s)
            .ok_or_else(|| CatalogError::UnknownState(s.to_string()))
    }
}

impl TryFrom<String> for InitialState {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InitialState> for String {
    fn from(state: InitialState) -> Self {
        state.label().to_string()
    }
}

/// Variant of the encoded `|00>` preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingVersion {
    /// Fault-tolerant preparation using the flag qubit.
    Ftv1,
    /// Fault-tolerant preparation with a directed swap.
    Ftv2,
    /// Non-fault-tolerant preparation.
    Nftv1,
}

impl EncodingVersion {
    /// All versions in generation order.
    pub const ALL: [EncodingVersion; 3] = [EncodingVersion::Ftv1, EncodingVersion::Ftv2, EncodingVersion::Nftv1];

    /// Tag appended to encoded circuit names.
    pub fn tag(&self) -> &'static str {
        match self {
            EncodingVersion::Ftv1 => "ftv1",
            EncodingVersion::Ftv2 => "ftv2",
            EncodingVersion::Nftv1 => "nftv1",
        }
    }
}

impl fmt::Display for EncodingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EncodingVersion {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EncodingVersion::ALL
            .into_iter()
            .find(|v| v.tag() == s)
            .ok_or_else(|| CatalogError::UnknownVersion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_labels_round_trip() {
        for state in InitialState::ALL {
            assert_eq!(state.label().parse::<InitialState>().unwrap(), state);
        }
        assert!(matches!(
            "|11>".parse::<InitialState>(),
            Err(CatalogError::UnknownState(_))
        ));
    }

    #[test]
    fn test_versions() {
        assert_eq!(InitialState::Zero.versions().len(), 3);
        assert_eq!(InitialState::Bell.versions(), vec![None]);
        assert_eq!("nftv1".parse::<EncodingVersion>().unwrap(), EncodingVersion::Nftv1);
        assert!("ftv3".parse::<EncodingVersion>().is_err());
    }

    #[test]
    fn test_version_mismatch() {
        assert!(InitialState::Zero.encoded_preparation(None).is_err());
        assert!(matches!(
            InitialState::ZeroPlus.encoded_preparation(Some(EncodingVersion::Ftv1)),
            Err(CatalogError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_bare_preparations() {
        let pair = QubitPair::new(1, 0).unwrap();
        assert_eq!(InitialState::Zero.bare_preparation(pair).unwrap().gate_count(), 0);
        let plus = InitialState::ZeroPlus.bare_preparation(pair).unwrap();
        assert_eq!(plus.instructions()[0].qubits, vec![QubitId(0)]);
        let bell = InitialState::Bell.bare_preparation(pair).unwrap();
        assert_eq!(bell.gate_count(), 2);
        assert_eq!(bell.two_qubit_gate_count(), 1);
    }

    #[test]
    fn test_encoded_preparation_sizes() {
        let size = |state: InitialState, version| {
            let c = state.encoded_preparation(version).unwrap();
            (c.gate_count(), c.two_qubit_gate_count())
        };
        assert_eq!(size(InitialState::Zero, Some(EncodingVersion::Ftv1)), (10, 5));
        assert_eq!(size(InitialState::Zero, Some(EncodingVersion::Nftv1)), (4, 3));
        assert_eq!(size(InitialState::Zero, Some(EncodingVersion::Ftv2)), (17, 8));
        assert_eq!(size(InitialState::ZeroPlus, None), (11, 5));
        assert_eq!(size(InitialState::Bell, None), (4, 2));
    }
}
