//! Property-based tests for fragment windows and pair records.

use proptest::prelude::*;

use std::collections::BTreeMap;

use neopairs::fragment::{resolve_fragments, FragmentRange};
use neopairs::mutation::{Mutation, MutationGroup};
use neopairs::pair::PeptidePairRecord;
use neopairs::types::CellFraction;

const STANDARD: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// (position, length, sequence length) with the position inside the sequence
fn window_inputs() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..=50, 1usize..=400)
        .prop_flat_map(|(length, sequence_length)| (1..=sequence_length, Just(length), Just(sequence_length)))
}

fn residue() -> impl Strategy<Value = u8> {
    proptest::sample::select(STANDARD.to_vec())
}

/// A native sequence plus substitutions (1-based position -> new residue) inside it
fn native_with_substitutions() -> impl Strategy<Value = (String, BTreeMap<usize, u8>)> {
    proptest::collection::vec(residue(), 1..120).prop_flat_map(|residues| {
        let length = residues.len();
        let native: String = residues.into_iter().map(char::from).collect();
        (Just(native), proptest::collection::btree_map(1..=length, residue(), 1..6))
    })
}

fn peptide_pair() -> impl Strategy<Value = (String, String)> {
    proptest::collection::vec(
        (residue(), residue()),
        1..30,
    )
    .prop_map(|residues| {
        let native = residues.iter().map(|(a, _)| *a as char).collect();
        let mutated = residues.iter().map(|(_, b)| *b as char).collect();
        (native, mutated)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every window has the requested length, covers the position and fits the sequence
    #[test]
    fn test_windows_cover_position((position, length, sequence_length) in window_inputs()) {
        for range in resolve_fragments(position, length, sequence_length) {
            prop_assert_eq!(range.span(), length);
            prop_assert!(range.contains(position));
            prop_assert!(range.lower >= 1);
            prop_assert!(range.upper <= sequence_length);
        }
    }

    /// The window count is bounded by the length and both termini
    #[test]
    fn test_window_count((position, length, sequence_length) in window_inputs()) {
        let ranges = resolve_fragments(position, length, sequence_length);
        let expected = if sequence_length < length {
            0
        } else {
            length
                .min(position)
                .min(sequence_length - position + 1)
                .min(sequence_length - length + 1)
        };
        prop_assert_eq!(ranges.len(), expected);
    }

    /// Windows come out strictly ascending, one residue apart
    #[test]
    fn test_windows_sorted((position, length, sequence_length) in window_inputs()) {
        let ranges = resolve_fragments(position, length, sequence_length);
        for pair in ranges.windows(2) {
            prop_assert_eq!(pair[1].lower, pair[0].lower + 1);
            prop_assert!(pair[0] < pair[1]);
        }
    }

    /// Mutating changes exactly the declared positions
    #[test]
    fn test_mutate_touches_only_declared_positions((native, substitutions) in native_with_substitutions()) {
        let mutations = substitutions.iter().map(|(&position, &mutated)| {
            let change = format!("{}{}{}", native.as_bytes()[position - 1] as char, position, mutated as char);
            Mutation::new("T", "G", None, change.parse().unwrap(), CellFraction::CLONAL)
        });
        let group = MutationGroup::new(mutations).unwrap();
        let mutated = group.mutate(&native).unwrap();

        prop_assert_eq!(mutated.len(), native.len());
        for (i, (before, after)) in native.bytes().zip(mutated.bytes()).enumerate() {
            match substitutions.get(&(i + 1)) {
                Some(&expected) => prop_assert_eq!(after, expected),
                None => prop_assert_eq!(after, before),
            }
        }
    }

    /// A pair line parses back to the record it was printed from
    #[test]
    fn test_pair_line_inverts(
        tumor in "[A-Z]{4}-[0-9]{2}",
        gene in "[A-Z][A-Z0-9]{1,7}",
        lower in 1usize..1000,
        (self_peptide, neo_peptide) in peptide_pair(),
    ) {
        let range = FragmentRange::new(lower, lower + self_peptide.len() - 1).unwrap();
        let record = PeptidePairRecord { tumor, gene, range, self_peptide, neo_peptide };
        let parsed: PeptidePairRecord = record.to_string().parse().unwrap();
        prop_assert_eq!(parsed, record);
    }
}
