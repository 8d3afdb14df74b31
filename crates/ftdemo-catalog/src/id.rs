//! Structured circuit identifiers.
//!
//! A [`CircuitId`] is created when a circuit is generated and travels with
//! its results, so decoding never has to take a name apart. Names stored by
//! older runs are still accepted through [`CircuitId::parse`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::experiment::{ExperimentCatalog, SpecId};
use crate::layout::QubitPair;
use crate::state::{EncodingVersion, InitialState};

/// How an experiment is realized on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Variant {
    /// Two physical qubits, no encoding.
    Bare {
        /// The physical pair.
        pair: QubitPair,
    },
    /// Four-qubit code plus flag qubit.
    Encoded {
        /// Preparation variant, present exactly for `|00>` experiments.
        version: Option<EncodingVersion>,
    },
}

impl Variant {
    /// `"bare"` or `"encoded"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Variant::Bare { .. } => "bare",
            Variant::Encoded { .. } => "encoded",
        }
    }
}

/// Filename-safe form of an experiment or state label.
///
/// `|` becomes `_`, `>` is dropped and `+` becomes `p`.
pub fn label_stem(label: &str) -> String {
    label
        .chars()
        .filter_map(|c| match c {
            '|' => Some('_'),
            '>' => None,
            '+' => Some('p'),
            other => Some(other),
        })
        .collect()
}

/// Identifier of one generated circuit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CircuitId {
    /// Experiment this circuit realizes.
    pub spec: SpecId,
    /// Canonical experiment label.
    pub label: String,
    /// Bare pair or encoding version.
    pub variant: Variant,
}

impl CircuitId {
    /// Identifier of a bare circuit.
    pub fn bare(spec: SpecId, label: impl Into<String>, pair: QubitPair) -> Self {
        Self {
            spec,
            label: label.into(),
            variant: Variant::Bare { pair },
        }
    }

    /// Identifier of an encoded circuit.
    pub fn encoded(spec: SpecId, label: impl Into<String>, version: Option<EncodingVersion>) -> Self {
        Self {
            spec,
            label: label.into(),
            variant: Variant::Encoded { version },
        }
    }

    /// Circuit name: `b<label><pair>` or `e<label>[version]`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Filename-safe stem of the name.
    ///
    /// The label goes through [`label_stem`]; the suffix is `_a-b` for bare
    /// circuits and `_<version>` for tagged encoded ones.
    pub fn file_stem(&self) -> String {
        let label = label_stem(&self.label);
        match self.variant {
            Variant::Bare { pair } => {
                let [a, b] = pair.indices();
                format!("b_{label}_{a}-{b}")
            }
            Variant::Encoded { version: Some(v) } => format!("e_{label}_{v}"),
            Variant::Encoded { version: None } => format!("e_{label}"),
        }
    }

    /// Recover an identifier from a legacy circuit name.
    ///
    /// The name must be `b` + label + `[a, b]` or `e` + label + optional
    /// version tag, and the label must match an experiment of `catalog`
    /// exactly.
    pub fn parse(name: &str, catalog: &ExperimentCatalog) -> CatalogResult<Self> {
        let invalid = |reason: &str| CatalogError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        let (id, encoded_version) = if let Some(rest) = name.strip_prefix('b') {
            let start = rest.rfind('[').ok_or_else(|| invalid("missing qubit pair"))?;
            let pair: QubitPair = rest[start..].parse()?;
            let label = &rest[..start];
            let spec = catalog
                .lookup(label)
                .ok_or_else(|| CatalogError::SpecNotFound(label.to_string()))?;
            (CircuitId::bare(spec, label, pair), None)
        } else if let Some(rest) = name.strip_prefix('e') {
            // nftv1 ends in ftv1, so it has to be tried first
            let (label, version) = [EncodingVersion::Nftv1, EncodingVersion::Ftv1, EncodingVersion::Ftv2]
                .into_iter()
                .find_map(|v| rest.strip_suffix(v.tag()).map(|label| (label, Some(v))))
                .unwrap_or((rest, None));
            let spec = catalog
                .lookup(label)
                .ok_or_else(|| CatalogError::SpecNotFound(label.to_string()))?;
            (CircuitId::encoded(spec, label, version), Some(version))
        } else {
            return Err(invalid("expected a 'b' or 'e' prefix"));
        };

        if let Some(version) = encoded_version {
            let state: InitialState = catalog
                .spec(id.spec)
                .map(|s| s.state())
                .ok_or_else(|| CatalogError::SpecNotFound(id.label.clone()))?;
            state.check_version(version)?;
        }
        Ok(id)
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant {
            Variant::Bare { pair } => write!(f, "b{}{pair}", self.label),
            Variant::Encoded { version } => {
                write!(f, "e{}", self.label)?;
                if let Some(v) = version {
                    write!(f, "{v}")?;
                }
                Ok(())
            }
        }
    }
}
