//! Turning one circuit result into [`DecodedStats`].

use chrono::{DateTime, Utc};
use tracing::debug;

use ftdemo_catalog::{BitOrder, CatalogError, CircuitId, CodewordTable, ExperimentCatalog, Mapping, Variant};
use ftdemo_hal::{Calibration, CircuitResult, Counts};

use crate::decode::{BareDecoder, DecodedCounts, Decoder, EncodedDecoder};
use crate::error::AnalysisResult;
use crate::stats::{DecodedStats, RunContext};

/// One circuit's measured result, ready for decoding.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    /// Circuit identifier.
    pub id: CircuitId,
    /// Measured histogram.
    pub counts: Counts,
    /// Operation count of the executed program.
    pub qasm_count: usize,
    /// Device calibration.
    pub calibration: Calibration,
    /// Completion time.
    pub date: DateTime<Utc>,
}

impl ResultRecord {
    /// Build a record from a backend result, recovering the identifier from
    /// the circuit name.
    pub fn from_circuit(
        result: &CircuitResult,
        calibration: &Calibration,
        catalog: &ExperimentCatalog,
    ) -> AnalysisResult<Self> {
        Ok(Self {
            id: CircuitId::parse(&result.name, catalog)?,
            counts: result.counts.clone(),
            qasm_count: ftdemo_ir::qasm_op_count(&result.qasm),
            calibration: calibration.clone(),
            date: result.date,
        })
    }
}

/// Decodes records against a catalog and a code layout.
#[derive(Debug, Clone)]
pub struct Analyzer {
    catalog: ExperimentCatalog,
    table: CodewordTable,
    order: BitOrder,
}

impl Analyzer {
    /// Analyzer for `catalog` with encoded circuits laid out by `mapping`.
    pub fn new(catalog: ExperimentCatalog, mapping: Mapping, order: BitOrder) -> Self {
        Self {
            catalog,
            table: CodewordTable::new(mapping),
            order,
        }
    }

    /// The experiment catalog.
    pub fn catalog(&self) -> &ExperimentCatalog {
        &self.catalog
    }

    /// Decode the counts of a record.
    pub fn decode(&self, record: &ResultRecord) -> AnalysisResult<DecodedCounts> {
        let spec = self
            .catalog
            .spec(record.id.spec)
            .ok_or_else(|| CatalogError::SpecNotFound(record.id.label.clone()))?;
        let decoded = match record.id.variant {
            Variant::Bare { pair } => BareDecoder::for_spec(spec, pair, self.order).decode(&record.counts),
            Variant::Encoded { .. } => EncodedDecoder::new(&self.table, self.order).decode(&record.counts),
        };
        Ok(decoded)
    }

    /// Decode a record and compute its statistics.
    pub fn analyze(&self, record: &ResultRecord) -> AnalysisResult<DecodedStats> {
        let spec = self
            .catalog
            .spec(record.id.spec)
            .ok_or_else(|| CatalogError::SpecNotFound(record.id.label.clone()))?;
        let counts = self.decode(record)?;
        debug!(
            circuit = %record.id,
            valid = counts.total_valid,
            err = counts.err,
            "decoded result"
        );
        DecodedStats::compute(
            RunContext {
                id: &record.id,
                raw_counts: &record.counts,
                qasm_count: record.qasm_count,
                expected: spec.expected(),
                calibration: &record.calibration,
                date: record.date,
            },
            counts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn analyzer() -> Analyzer {
        Analyzer::new(
            ExperimentCatalog::standard().unwrap(),
            Mapping::default(),
            BitOrder::QubitZeroFirst,
        )
    }

    fn record(name: &str, counts: &[(&str, u64)], analyzer: &Analyzer) -> ResultRecord {
        ResultRecord {
            id: CircuitId::parse(name, analyzer.catalog()).unwrap(),
            counts: counts.iter().map(|(b, c)| (*b, *c)).collect(),
            qasm_count: 0,
            calibration: Calibration::default(),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_bare_x1_example() {
        let analyzer = analyzer();
        let rec = record("bMX1|00>[1, 0]", &[("01000", 100)], &analyzer);
        let stats = analyzer.analyze(&rec).unwrap();
        assert_eq!(stats.counts.get("01"), Some(100));
        assert_eq!(stats.counts.total_valid, 100);
        assert_eq!(stats.expected, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(stats.stat_dist, 0.0);
    }

    #[test]
    fn test_encoded_post_selection() {
        let analyzer = analyzer();
        let rec = record("eM|00>ftv1", &[("00000", 60), ("10000", 30), ("11111", 10)], &analyzer);
        let stats = analyzer.analyze(&rec).unwrap();
        assert_eq!(stats.kind, "encoded");
        assert_eq!(stats.counts.buckets, [60, 0, 0, 0]);
        assert_eq!(stats.counts.err, 40);
        assert!((stats.post_selection_ratio - 0.6).abs() < 1e-12);
        assert_eq!(stats.stat_dist, 0.0);
    }

    #[test]
    fn test_all_shots_rejected() {
        let analyzer = analyzer();
        let rec = record("eM|00>ftv1", &[("10000", 30)], &analyzer);
        assert!(matches!(analyzer.analyze(&rec), Err(AnalysisError::NoValidShots(_))));
    }

    #[test]
    fn test_from_circuit_counts_operations() {
        let analyzer = analyzer();
        let result = CircuitResult {
            name: "bMX1|00>[1, 0]".into(),
            qasm: "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[5];\ncreg c[5];\nx q[1];\nmeasure q[0] -> c[0];\n".into(),
            counts: [("01000", 5)].into_iter().collect(),
            date: Utc::now(),
        };
        let rec = ResultRecord::from_circuit(&result, &Calibration::default(), analyzer.catalog()).unwrap();
        assert_eq!(rec.qasm_count, 2);
        assert!(matches!(rec.id.variant, Variant::Bare { .. }));
    }
}
