//! Property tests for circuit naming and the codeword table.

use std::collections::HashSet;

use ftdemo_catalog::{
    CatalogBuilder, CircuitId, CodewordTable, EncodingVersion, ExperimentCatalog, InitialState,
    Mapping, QubitPair, Variant, default_pairs,
};
use proptest::prelude::*;

/// Any ordered pair of distinct device qubits.
fn arb_pair() -> impl Strategy<Value = QubitPair> {
    (0_u32..5, 0_u32..5)
        .prop_filter("distinct qubits", |(a, b)| a != b)
        .prop_map(|(a, b)| QubitPair::new(a, b).unwrap())
}

/// Any injective mapping of the four code roles.
fn arb_mapping() -> impl Strategy<Value = Mapping> {
    Just(vec![0_u32, 1, 2, 3, 4])
        .prop_shuffle()
        .prop_map(|q| Mapping::new([q[0], q[1], q[2], q[3]]).unwrap())
}

proptest! {
    #[test]
    fn bare_names_unique_and_round_trip(pairs in prop::collection::btree_set(arb_pair(), 1..=6)) {
        let catalog = ExperimentCatalog::standard().unwrap();
        let pairs: Vec<QubitPair> = pairs.into_iter().collect();
        let batch = CatalogBuilder::new().with_pairs(pairs).build(&catalog).unwrap();

        let names = batch.names();
        let unique: HashSet<&String> = names.iter().collect();
        prop_assert_eq!(unique.len(), names.len());

        for entry in batch.entries() {
            let parsed = CircuitId::parse(&entry.id.name(), &catalog).unwrap();
            prop_assert_eq!(&parsed, &entry.id);
        }
    }

    #[test]
    fn codewords_disjoint_for_any_mapping(mapping in arb_mapping()) {
        let table = CodewordTable::new(mapping);
        let mut seen = HashSet::new();
        for outcome in 0..4 {
            for mask in table.codewords(outcome) {
                prop_assert!(seen.insert(mask), "mask {mask:#07b} listed twice");
                prop_assert_eq!(table.outcome_of(mask), Some(outcome));
                prop_assert_eq!(mask & (1 << mapping.flag_qubit().0), 0);
            }
        }
        prop_assert_eq!(seen.len(), 8);
    }
}

#[test]
fn zero_state_generates_every_version() {
    let catalog = ExperimentCatalog::standard().unwrap();
    let batch = CatalogBuilder::new().build(&catalog).unwrap();

    for (spec_id, spec) in catalog.iter() {
        let versions: Vec<Option<EncodingVersion>> = batch
            .entries()
            .iter()
            .filter(|e| e.id.spec == spec_id)
            .filter_map(|e| match e.id.variant {
                Variant::Encoded { version } => Some(version),
                Variant::Bare { .. } => None,
            })
            .collect();

        if spec.state() == InitialState::Zero {
            assert_eq!(
                versions,
                vec![
                    Some(EncodingVersion::Ftv1),
                    Some(EncodingVersion::Ftv2),
                    Some(EncodingVersion::Nftv1)
                ]
            );
        } else {
            assert_eq!(versions, vec![None]);
        }
    }
}

#[test]
fn bare_pairs_follow_configuration() {
    let catalog = ExperimentCatalog::standard().unwrap();
    let batch = CatalogBuilder::new().build(&catalog).unwrap();
    let pairs: HashSet<QubitPair> = batch
        .entries()
        .iter()
        .filter_map(|e| match e.id.variant {
            Variant::Bare { pair } => Some(pair),
            Variant::Encoded { .. } => None,
        })
        .collect();
    assert_eq!(pairs, default_pairs().into_iter().collect());
}
