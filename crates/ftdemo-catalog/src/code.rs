//! Codewords of the four-qubit error-detecting code.

use rustc_hash::FxHashMap;

use crate::layout::{BitOrder, Mapping, NUM_QUBITS};

/// The two codewords of each logical outcome `00 01 10 11`, in code-role
/// order.
pub const CODEWORDS: [[[u8; 4]; 2]; 4] = [
    [[0, 0, 0, 0], [1, 1, 1, 1]],
    [[1, 1, 0, 0], [0, 0, 1, 1]],
    [[1, 0, 1, 0], [0, 1, 0, 1]],
    [[1, 0, 0, 1], [0, 1, 1, 0]],
];

/// Lookup from a physical measurement mask to the logical outcome it
/// encodes.
///
/// Codeword bit `j` sits on physical qubit `mapping[j]` and the flag qubit
/// must read `0`; every other mask is a detected error.
#[derive(Debug, Clone)]
pub struct CodewordTable {
    mapping: Mapping,
    table: FxHashMap<u32, usize>,
}

impl CodewordTable {
    /// Build the table for a mapping.
    pub fn new(mapping: Mapping) -> Self {
        let mut table = FxHashMap::default();
        for (outcome, words) in CODEWORDS.iter().enumerate() {
            for word in words {
                table.insert(Self::physical_mask(&mapping, word), outcome);
            }
        }
        Self { mapping, table }
    }

    fn physical_mask(mapping: &Mapping, word: &[u8; 4]) -> u32 {
        word.iter()
            .zip(mapping.roles())
            .filter(|(bit, _)| **bit == 1)
            .map(|(_, q)| 1 << q.0)
            .sum()
    }

    /// The mapping this table was built for.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Logical outcome (0..4) of a physical mask, `None` for a detected error.
    pub fn outcome_of(&self, mask: u32) -> Option<usize> {
        self.table.get(&mask).copied()
    }

    /// Physical masks of the two codewords of `outcome`.
    pub fn codewords(&self, outcome: usize) -> Vec<u32> {
        CODEWORDS
            .get(outcome)
            .map(|words| {
                words
                    .iter()
                    .map(|w| Self::physical_mask(&self.mapping, w))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Bitstrings of the two codewords of `outcome` as rendered by a backend.
    pub fn bitstrings(&self, outcome: usize, order: BitOrder) -> Vec<String> {
        self.codewords(outcome)
            .into_iter()
            .map(|mask| order.render(mask, NUM_QUBITS as usize))
            .collect()
    }
}
