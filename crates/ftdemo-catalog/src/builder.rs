//! Circuit batch generation.

use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};

use ftdemo_ir::Circuit;

use crate::block::GateBlock;
use crate::error::{CatalogError, CatalogResult};
use crate::experiment::{ExperimentCatalog, ExperimentSpec};
use crate::id::CircuitId;
use crate::layout::{Mapping, NUM_QUBITS, QubitPair, default_pairs};
use crate::state::EncodingVersion;

/// Accumulator threaded through the bare gate sequence.
///
/// Every `HHS` exchanges the logical roles of the pair; `X`/`Z` blocks that
/// follow resolve their index against the current parity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BareFold {
    /// Number of `HHS` blocks seen so far.
    pub swaps: usize,
}

impl BareFold {
    /// Resolve `block` against the current parity and advance the fold.
    pub fn step(self, block: GateBlock) -> (Self, GateBlock) {
        if block.is_hadamard() {
            (
                Self {
                    swaps: self.swaps + 1,
                },
                block,
            )
        } else {
            (self, block.oriented(self.swaps))
        }
    }
}

/// One generated circuit with its identifier.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Identifier carried through to decoding.
    pub id: CircuitId,
    /// The measured circuit.
    pub circuit: Circuit,
}

/// All circuits of a catalog, in generation order.
#[derive(Debug, Clone, Default)]
pub struct CircuitBatch {
    entries: Vec<CatalogEntry>,
    index: FxHashMap<String, usize>,
}

impl CircuitBatch {
    fn push(&mut self, entry: CatalogEntry) -> CatalogResult<()> {
        let name = entry.id.name();
        if self.index.contains_key(&name) {
            return Err(CatalogError::DuplicateName(name));
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Circuit names in generation order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.name()).collect()
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// All entries in generation order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of circuits.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Generates the bare and encoded circuits of every experiment.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    pairs: Vec<QubitPair>,
    mapping: Mapping,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self {
            pairs: default_pairs(),
            mapping: Mapping::default(),
        }
    }
}

impl CatalogBuilder {
    /// Create a builder for the default pairs and mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use these qubit pairs for bare circuits.
    #[must_use]
    pub fn with_pairs(mut self, pairs: Vec<QubitPair>) -> Self {
        self.pairs = pairs;
        self
    }

    /// Use this mapping for encoded gate blocks.
    #[must_use]
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Generate the full batch.
    ///
    /// Per experiment: one bare circuit per pair, then one encoded circuit
    /// per preparation variant. Fails on the first error without returning a
    /// partial batch.
    #[instrument(skip_all, fields(experiments = catalog.len(), pairs = self.pairs.len()))]
    pub fn build(&self, catalog: &ExperimentCatalog) -> CatalogResult<CircuitBatch> {
        let mut batch = CircuitBatch::default();
        for (spec_id, spec) in catalog.iter() {
            let label = spec.label();
            for &pair in &self.pairs {
                let id = CircuitId::bare(spec_id, label.clone(), pair);
                let circuit = self.bare_circuit(&id, spec, pair)?;
                batch.push(CatalogEntry { id, circuit })?;
            }
            for version in spec.state().versions() {
                let id = CircuitId::encoded(spec_id, label.clone(), version);
                let circuit = self.encoded_circuit(&id, spec, version)?;
                batch.push(CatalogEntry { id, circuit })?;
            }
            debug!(spec = %spec_id, %label, "generated experiment circuits");
        }
        info!(circuits = batch.len(), "circuit batch generated");
        Ok(batch)
    }

    fn bare_circuit(&self, id: &CircuitId, spec: &ExperimentSpec, pair: QubitPair) -> CatalogResult<Circuit> {
        let mut circuit = Circuit::with_size(id.name(), NUM_QUBITS, NUM_QUBITS);
        circuit.extend(&spec.state().bare_preparation(pair)?)?;
        let mut fold = BareFold::default();
        for &block in spec.gates() {
            let (next, resolved) = fold.step(block);
            circuit.extend(&resolved.bare_circuit(pair)?)?;
            fold = next;
        }
        circuit.measure_all()?;
        Ok(circuit)
    }

    fn encoded_circuit(
        &self,
        id: &CircuitId,
        spec: &ExperimentSpec,
        version: Option<EncodingVersion>,
    ) -> CatalogResult<Circuit> {
        let mut circuit = Circuit::with_size(id.name(), NUM_QUBITS, NUM_QUBITS);
        circuit.extend(&spec.state().encoded_preparation(version)?)?;
        for &block in spec.gates() {
            circuit.extend(&block.encoded_circuit(&self.mapping)?)?;
        }
        circuit.measure_all()?;
        Ok(circuit)
    }
}

/// Build the standard catalog with the given layout.
pub fn standard_batch(pairs: Vec<QubitPair>, mapping: Mapping) -> CatalogResult<(ExperimentCatalog, CircuitBatch)> {
    let catalog = ExperimentCatalog::standard()?;
    let batch = CatalogBuilder::new()
        .with_pairs(pairs)
        .with_mapping(mapping)
        .build(&catalog)?;
    Ok((catalog, batch))
}
