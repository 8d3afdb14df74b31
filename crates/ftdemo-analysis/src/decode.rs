//! Decoding of measured bitstrings into logical outcomes.
//!
//! A bare circuit reads the two qubits of its pair; every well-formed
//! bitstring decodes. An encoded circuit is post-selected on the codewords
//! of the four-qubit code, so most erroneous shots land in the error bucket.

use serde::{Deserialize, Serialize};

use ftdemo_catalog::{BitOrder, CodewordTable, ExperimentSpec, NUM_QUBITS, QubitPair};
use ftdemo_hal::Counts;

/// Logical outcome labels in bucket order.
pub const OUTCOME_LABELS: [&str; 4] = ["00", "01", "10", "11"];

/// Shot counts per logical outcome plus the error bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCounts {
    /// Counts of `00 01 10 11`.
    pub buckets: [u64; 4],
    /// Shots that decoded to no outcome.
    pub err: u64,
    /// Sum of `buckets`.
    pub total_valid: u64,
}

impl DecodedCounts {
    /// Record `count` shots of `outcome`, or errors when `None`.
    pub fn record(&mut self, outcome: Option<usize>, count: u64) {
        match outcome {
            Some(i) => {
                self.buckets[i] += count;
                self.total_valid += count;
            }
            None => self.err += count,
        }
    }

    /// All shots, valid or not.
    pub fn total(&self) -> u64 {
        self.total_valid + self.err
    }

    /// Count of the outcome labelled `label` (`"00"` ... `"11"`).
    pub fn get(&self, label: &str) -> Option<u64> {
        OUTCOME_LABELS
            .iter()
            .position(|l| *l == label)
            .map(|i| self.buckets[i])
    }
}

/// Maps a bitstring to a logical outcome index.
pub trait Decoder {
    /// Outcome (0..4) of `bitstring`, `None` for the error bucket.
    fn outcome(&self, bitstring: &str) -> Option<usize>;

    /// Decode a whole histogram.
    fn decode(&self, counts: &Counts) -> DecodedCounts {
        let mut decoded = DecodedCounts::default();
        for (bitstring, count) in counts.iter() {
            decoded.record(self.outcome(bitstring), count);
        }
        decoded
    }
}

/// Decoder for a bare circuit on a qubit pair.
///
/// The outcome is `2 * bit(pair[1]) + bit(pair[0])`, so the label reads
/// `bit(pair[1]) bit(pair[0])`.
#[derive(Debug, Clone, Copy)]
pub struct BareDecoder {
    pair: QubitPair,
    order: BitOrder,
}

impl BareDecoder {
    /// Decoder reading `pair` as given.
    pub fn new(pair: QubitPair, order: BitOrder) -> Self {
        Self { pair, order }
    }

    /// Decoder for `spec` run on `pair`; the pair is read reversed when the
    /// spec has an odd number of `HHS` blocks.
    pub fn for_spec(spec: &ExperimentSpec, pair: QubitPair, order: BitOrder) -> Self {
        let pair = if spec.bare_reversed() { pair.reversed() } else { pair };
        Self::new(pair, order)
    }

    /// The pair as read.
    pub fn pair(&self) -> QubitPair {
        self.pair
    }
}

impl Decoder for BareDecoder {
    fn outcome(&self, bitstring: &str) -> Option<usize> {
        let mask = self.order.parse_mask(bitstring, NUM_QUBITS as usize)?;
        let bit = |q: u32| ((mask >> q) & 1) as usize;
        let [first, second] = self.pair.indices();
        Some(2 * bit(second) + bit(first))
    }
}

/// Decoder for an encoded circuit.
#[derive(Debug, Clone, Copy)]
pub struct EncodedDecoder<'a> {
    table: &'a CodewordTable,
    order: BitOrder,
}

impl<'a> EncodedDecoder<'a> {
    /// Decoder looking bitstrings up in `table`.
    pub fn new(table: &'a CodewordTable, order: BitOrder) -> Self {
        Self { table, order }
    }
}

impl Decoder for EncodedDecoder<'_> {
    fn outcome(&self, bitstring: &str) -> Option<usize> {
        let mask = self.order.parse_mask(bitstring, NUM_QUBITS as usize)?;
        self.table.outcome_of(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftdemo_catalog::Mapping;

    fn pair(a: u32, b: u32) -> QubitPair {
        QubitPair::new(a, b).unwrap()
    }

    #[test]
    fn test_bare_outcome_label() {
        let decoder = BareDecoder::new(pair(1, 0), BitOrder::QubitZeroFirst);
        // qubit 1 reads 1, qubit 0 reads 0: label bit(0) bit(1) = "01"
        assert_eq!(decoder.outcome("01000"), Some(1));
        assert_eq!(decoder.outcome("10000"), Some(2));
        assert_eq!(decoder.outcome("11111"), Some(3));
        // other qubits are ignored
        assert_eq!(decoder.outcome("00111"), Some(0));
    }

    #[test]
    fn test_bare_malformed_goes_to_error() {
        let decoder = BareDecoder::new(pair(1, 0), BitOrder::QubitZeroFirst);
        let counts: Counts = [("01000", 10), ("0100", 3), ("01a00", 2)].into_iter().collect();
        let decoded = decoder.decode(&counts);
        assert_eq!(decoded.buckets, [0, 10, 0, 0]);
        assert_eq!(decoded.err, 5);
        assert_eq!(decoded.total(), 15);
    }

    #[test]
    fn test_bare_reversed_for_odd_hadamards() {
        let spec = ExperimentSpec::parse(&["HHS"], "|00>", [0.25; 4]).unwrap();
        let decoder = BareDecoder::for_spec(&spec, pair(1, 0), BitOrder::QubitZeroFirst);
        assert_eq!(decoder.pair(), pair(0, 1));
        assert_eq!(decoder.outcome("01000"), Some(2));

        let spec = ExperimentSpec::parse(&["X1"], "|00>", [0.0, 1.0, 0.0, 0.0]).unwrap();
        let decoder = BareDecoder::for_spec(&spec, pair(1, 0), BitOrder::QubitZeroFirst);
        assert_eq!(decoder.pair(), pair(1, 0));
    }

    #[test]
    fn test_encoded_default_mapping() {
        let table = CodewordTable::new(Mapping::default());
        let decoder = EncodedDecoder::new(&table, BitOrder::QubitZeroFirst);
        let counts: Counts = [("00000", 40), ("01111", 30), ("10000", 20), ("00110", 10)]
            .into_iter()
            .collect();
        let decoded = decoder.decode(&counts);
        assert_eq!(decoded.buckets, [70, 10, 0, 0]);
        assert_eq!(decoded.err, 20);
        assert_eq!(decoded.get("00"), Some(70));
        assert_eq!(decoded.get("xx"), None);
    }

    #[test]
    fn test_encoded_bit_order() {
        let table = CodewordTable::new(Mapping::default());
        let first = EncodedDecoder::new(&table, BitOrder::QubitZeroFirst);
        let last = EncodedDecoder::new(&table, BitOrder::QubitZeroLast);
        for outcome in 0..4 {
            for bits in table.bitstrings(outcome, BitOrder::QubitZeroLast) {
                assert_eq!(last.outcome(&bits), Some(outcome));
            }
            for bits in table.bitstrings(outcome, BitOrder::QubitZeroFirst) {
                assert_eq!(first.outcome(&bits), Some(outcome));
            }
        }
    }
}
