//! Property-based tests for archipelago
//!
//! Uses proptest to verify invariants of the pure coordination pieces: age
//! aggregation, exchange rebuilding, and policy output well-formedness.

use std::collections::{BTreeMap, BTreeSet};

use archipelago::prelude::*;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Candidate {
    fitness: f64,
}

impl Individual for Candidate {
    fn fitness(&self) -> f64 {
        self.fitness
    }
}

fn population(fitnesses: &[f64]) -> Vec<Candidate> {
    fitnesses.iter().map(|&f| Candidate { fitness: f }).collect()
}

proptest! {
    // ==================== AgeTable Properties ====================

    #[test]
    fn age_table_average_is_sum_over_group_size(
        ages in prop::collection::btree_map(0usize..16, 0u64..1000, 1..16),
        group_size in 1usize..32,
    ) {
        let mut table = AgeTable::new();
        for (&rank, &age) in &ages {
            table.record(rank, age);
        }
        let expected = ages.values().sum::<u64>() as f64 / group_size as f64;
        prop_assert!((table.average(group_size) - expected).abs() < 1e-9);
    }

    #[test]
    fn age_table_keeps_latest_report_per_rank(
        reports in prop::collection::vec((0usize..8, 0u64..100), 1..64),
    ) {
        let mut table = AgeTable::new();
        let mut oracle: BTreeMap<usize, u64> = BTreeMap::new();
        for &(rank, age) in &reports {
            table.record(rank, age);
            oracle.insert(rank, age);
        }
        prop_assert_eq!(table.len(), oracle.len());
        let expected = oracle.values().sum::<u64>() as f64 / 8.0;
        prop_assert!((table.average(8) - expected).abs() < 1e-9);
    }

    // ==================== Exchange Rebuild Properties ====================

    #[test]
    fn merge_exchange_preserves_size_for_equal_swaps(
        pop in prop::collection::vec(0u32..1000, 1..40),
        raw_indices in prop::collection::btree_set(0usize..40, 0..10),
    ) {
        let donated: BTreeSet<usize> =
            raw_indices.into_iter().filter(|&i| i < pop.len()).collect();
        let incoming: Vec<u32> = (0..donated.len() as u32).map(|i| 5000 + i).collect();

        let next = merge_exchange(&pop, &donated, incoming.clone());
        prop_assert_eq!(next.len(), pop.len());

        // Survivors keep their island order and incoming are appended.
        let survivors: Vec<u32> = pop
            .iter()
            .enumerate()
            .filter(|(i, _)| !donated.contains(i))
            .map(|(_, v)| *v)
            .collect();
        prop_assert_eq!(&next[..survivors.len()], &survivors[..]);
        prop_assert_eq!(&next[survivors.len()..], &incoming[..]);
    }

    #[test]
    fn merge_exchange_conserves_pair_combined_size(
        pop_a in prop::collection::vec(0u32..1000, 1..30),
        pop_b in prop::collection::vec(1000u32..2000, 1..30),
        count in 0usize..30,
    ) {
        let swap = count.min(pop_a.len()).min(pop_b.len());
        let donated_a: BTreeSet<usize> = (0..swap).collect();
        let donated_b: BTreeSet<usize> = (0..swap).collect();
        let outgoing_a: Vec<u32> = donated_a.iter().map(|&i| pop_a[i]).collect();
        let outgoing_b: Vec<u32> = donated_b.iter().map(|&i| pop_b[i]).collect();

        let next_a = merge_exchange(&pop_a, &donated_a, outgoing_b);
        let next_b = merge_exchange(&pop_b, &donated_b, outgoing_a);

        prop_assert_eq!(next_a.len(), pop_a.len());
        prop_assert_eq!(next_b.len(), pop_b.len());

        let mut combined_before: Vec<u32> =
            pop_a.iter().chain(pop_b.iter()).copied().collect();
        let mut combined_after: Vec<u32> =
            next_a.iter().chain(next_b.iter()).copied().collect();
        combined_before.sort_unstable();
        combined_after.sort_unstable();
        prop_assert_eq!(combined_before, combined_after);
    }

    // ==================== Exchange Policy Properties ====================

    #[test]
    fn swap_best_output_is_well_formed(
        fits_a in prop::collection::vec(-100.0f64..100.0, 1..20),
        fits_b in prop::collection::vec(-100.0f64..100.0, 1..20),
        count in 0usize..25,
    ) {
        let pop_a = population(&fits_a);
        let pop_b = population(&fits_b);
        let (send_a, send_b) = SwapBest::new(count).assign_send_receive(&pop_a, &pop_b);

        prop_assert_eq!(send_a.len(), send_b.len());
        prop_assert!(send_a.iter().all(|&i| i < pop_a.len()));
        prop_assert!(send_b.iter().all(|&i| i < pop_b.len()));

        let unique_a: BTreeSet<usize> = send_a.iter().copied().collect();
        prop_assert_eq!(unique_a.len(), send_a.len());
        let unique_b: BTreeSet<usize> = send_b.iter().copied().collect();
        prop_assert_eq!(unique_b.len(), send_b.len());
    }

    #[test]
    fn swap_best_selects_no_worse_than_the_rest(
        fits in prop::collection::vec(-100.0f64..100.0, 2..20),
        count in 1usize..10,
    ) {
        let pop = population(&fits);
        let (selected, _) = SwapBest::new(count).assign_send_receive(&pop, &pop);
        let chosen: BTreeSet<usize> = selected.iter().copied().collect();

        let worst_chosen = chosen
            .iter()
            .map(|&i| pop[i].fitness())
            .fold(f64::NEG_INFINITY, f64::max);
        let best_left_behind = (0..pop.len())
            .filter(|i| !chosen.contains(i))
            .map(|i| pop[i].fitness())
            .fold(f64::INFINITY, f64::min);

        prop_assert!(worst_chosen <= best_left_behind);
    }
}
