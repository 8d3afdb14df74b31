//! The static experiment catalog.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::block::GateBlock;
use crate::error::{CatalogError, CatalogResult};
use crate::state::InitialState;

/// Tolerance used when checking that an expected distribution sums to one.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-9;

/// Index of an experiment in its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecId(pub usize);

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One experiment: a logical input state, a sequence of gate blocks and the
/// ideal distribution over the four logical outcomes `00 01 10 11`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSpec {
    gates: Vec<GateBlock>,
    state: InitialState,
    expected: [f64; 4],
}

impl ExperimentSpec {
    /// Create a spec, validating the expected distribution.
    pub fn new(gates: Vec<GateBlock>, state: InitialState, expected: [f64; 4]) -> CatalogResult<Self> {
        let spec = Self {
            gates,
            state,
            expected,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Create a spec from catalog keys, e.g. `(["X1", "HHS"], "|00>", ...)`.
    pub fn parse(gates: &[&str], state: &str, expected: [f64; 4]) -> CatalogResult<Self> {
        let gates = gates
            .iter()
            .map(|key| key.parse())
            .collect::<CatalogResult<Vec<GateBlock>>>()?;
        Self::new(gates, state.parse()?, expected)
    }

    fn validate(&self) -> CatalogResult<()> {
        let invalid = |reason: String| CatalogError::InvalidDistribution {
            label: self.label(),
            reason,
        };
        if let Some(p) = self.expected.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(invalid(format!("entry {p} is not a probability")));
        }
        let total: f64 = self.expected.iter().sum();
        if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(invalid(format!("entries sum to {total}")));
        }
        Ok(())
    }

    /// Gate blocks in application order.
    pub fn gates(&self) -> &[GateBlock] {
        &self.gates
    }

    /// Logical input state.
    pub fn state(&self) -> InitialState {
        self.state
    }

    /// Ideal outcome distribution over `00 01 10 11`.
    pub fn expected(&self) -> [f64; 4] {
        self.expected
    }

    /// Canonical label: `M`, the gate keys in reverse order joined by `-`,
    /// then the state label.
    pub fn label(&self) -> String {
        let gates: Vec<&str> = self.gates.iter().rev().map(GateBlock::key).collect();
        format!("M{}{}", gates.join("-"), self.state.label())
    }

    /// Number of `HHS` blocks.
    pub fn hadamard_count(&self) -> usize {
        self.gates.iter().filter(|g| g.is_hadamard()).count()
    }

    /// Whether bare results are read on the reversed pair.
    ///
    /// An odd number of `HHS` blocks leaves the logical roles swapped on the
    /// bare pair.
    pub fn bare_reversed(&self) -> bool {
        self.hadamard_count() % 2 == 1
    }
}

/// Ordered set of experiments with a plotting order.
#[derive(Debug, Clone)]
pub struct ExperimentCatalog {
    specs: Vec<ExperimentSpec>,
    by_label: FxHashMap<String, SpecId>,
    /// Spec ids in x-axis order; position `i` is plotted at index `i + 1`.
    display_order: Vec<SpecId>,
}

const STANDARD: [(&[&str], &str, [f64; 4]); 20] = [
    (&["X1", "HHS", "CZ", "X2"], "|00>", [0.25; 4]),
    (&["HHS", "Z1", "CZ"], "|00>", [0.25; 4]),
    (&["HHS", "Z1", "Z2"], "|00>", [0.25; 4]),
    (&["HHS", "Z2", "CZ"], "|00>", [0.25; 4]),
    (&["Z2", "X2"], "|00>+|11>", [0.0, 0.5, 0.5, 0.0]),
    (&["X1", "Z2"], "|0+>", [0.0, 0.5, 0.0, 0.5]),
    (&["HHS", "Z1"], "|00>", [0.25; 4]),
    (&["HHS", "CZ"], "|00>", [0.25; 4]),
    (&["X1", "X2"], "|00>", [0.0, 0.0, 0.0, 1.0]),
    (&["HHS", "Z2"], "|00>", [0.25; 4]),
    (&["X1"], "|00>+|11>", [0.0, 0.5, 0.5, 0.0]),
    (&["X1"], "|0+>", [0.0, 0.5, 0.0, 0.5]),
    (&["HHS"], "|00>", [0.25; 4]),
    (&["Z2"], "|00>+|11>", [0.5, 0.0, 0.0, 0.5]),
    (&["Z2"], "|0+>", [0.5, 0.0, 0.5, 0.0]),
    (&["X1"], "|00>", [0.0, 1.0, 0.0, 0.0]),
    (&["X2"], "|00>", [0.0, 0.0, 1.0, 0.0]),
    (&[], "|00>+|11>", [0.5, 0.0, 0.0, 0.5]),
    (&[], "|0+>", [0.5, 0.0, 0.5, 0.0]),
    (&[], "|00>", [1.0, 0.0, 0.0, 0.0]),
];

/// Experiments ordered by the size of their bare circuits.
const STANDARD_DISPLAY_ORDER: [usize; 20] = [19, 18, 16, 15, 17, 14, 12, 11, 8, 13, 10, 9, 6, 5, 4, 2, 7, 3, 1, 0];

impl ExperimentCatalog {
    /// The 20-experiment catalog of the demonstration.
    pub fn standard() -> CatalogResult<Self> {
        let specs = STANDARD
            .iter()
            .map(|(gates, state, expected)| ExperimentSpec::parse(gates, state, *expected))
            .collect::<CatalogResult<Vec<_>>>()?;
        let mut catalog = Self::from_specs(specs)?;
        catalog.display_order = STANDARD_DISPLAY_ORDER.into_iter().map(SpecId).collect();
        Ok(catalog)
    }

    /// Build a catalog from arbitrary specs, displayed in the given order.
    pub fn from_specs(specs: Vec<ExperimentSpec>) -> CatalogResult<Self> {
        let mut by_label = FxHashMap::default();
        for (i, spec) in specs.iter().enumerate() {
            let label = spec.label();
            if by_label.insert(label.clone(), SpecId(i)).is_some() {
                return Err(CatalogError::DuplicateLabel(label));
            }
        }
        let display_order = (0..specs.len()).map(SpecId).collect();
        Ok(Self {
            specs,
            by_label,
            display_order,
        })
    }

    /// Number of experiments.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Find an experiment by its canonical label.
    pub fn lookup(&self, label: &str) -> Option<SpecId> {
        self.by_label.get(label).copied()
    }

    /// Get an experiment by id.
    pub fn spec(&self, id: SpecId) -> Option<&ExperimentSpec> {
        self.specs.get(id.0)
    }

    /// Iterate over experiments in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (SpecId, &ExperimentSpec)> {
        self.specs.iter().enumerate().map(|(i, s)| (SpecId(i), s))
    }

    /// 1-based x-axis position of an experiment.
    pub fn display_index(&self, id: SpecId) -> Option<usize> {
        self.display_order.iter().position(|&d| d == id).map(|p| p + 1)
    }

    /// Spec ids in x-axis order.
    pub fn display_order(&self) -> &[SpecId] {
        &self.display_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = ExperimentCatalog::standard().unwrap();
        assert_eq!(catalog.len(), 20);
        let first = catalog.spec(SpecId(0)).unwrap();
        assert_eq!(first.label(), "MX2-CZ-HHS-X1|00>");
        assert_eq!(catalog.lookup("MX1|00>"), Some(SpecId(15)));
        assert_eq!(catalog.lookup("M|00>"), Some(SpecId(19)));
        assert_eq!(catalog.lookup("MX3|00>"), None);
    }

    #[test]
    fn test_display_order_is_permutation() {
        let catalog = ExperimentCatalog::standard().unwrap();
        let mut ids: Vec<usize> = catalog.display_order().iter().map(|s| s.0).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..20).collect::<Vec<_>>());
        assert_eq!(catalog.display_index(SpecId(19)), Some(1));
        assert_eq!(catalog.display_index(SpecId(0)), Some(20));
    }

    #[test]
    fn test_hadamard_parity() {
        let catalog = ExperimentCatalog::standard().unwrap();
        assert!(catalog.spec(SpecId(12)).unwrap().bare_reversed());
        assert!(!catalog.spec(SpecId(15)).unwrap().bare_reversed());
    }

    #[test]
    fn test_distribution_validation() {
        let err = ExperimentSpec::parse(&["X1"], "|00>", [0.0, 0.9, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDistribution { .. }));
        assert!(ExperimentSpec::parse(&["X1"], "|00>", [-0.5, 1.5, 0.0, 0.0]).is_err());
        assert!(ExperimentSpec::parse(&["Y1"], "|00>", [1.0, 0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_duplicate_label() {
        let spec = ExperimentSpec::parse(&[], "|00>", [1.0, 0.0, 0.0, 0.0]).unwrap();
        assert!(matches!(
            ExperimentCatalog::from_specs(vec![spec.clone(), spec]),
            Err(CatalogError::DuplicateLabel(_))
        ));
    }
}
