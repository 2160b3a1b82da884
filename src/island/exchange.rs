//! Pluggable migration exchange policies
//!
//! During migration the initiator of a pair sees both populations and asks a
//! policy which individuals each side donates. The policy is injected by the
//! caller; the coordination layer only invokes it.

use crate::island::traits::Individual;

/// Strategy deciding which individuals move in a migration pair
///
/// Given the two populations of an exchanging pair, returns the indices each
/// side must donate: `(a_to_send, b_to_send)`. The decision must be a pure
/// function of the two populations; both sides of the exchange rely on the
/// initiator computing it once.
///
/// Per-side population sizes are conserved by the exchange exactly when the
/// two index sets have equal cardinality; policies are expected to uphold
/// that. Duplicate indices are collapsed before the swap.
pub trait ExchangePolicy<I: Individual> {
    /// Assign the donate-index sets for an exchanging pair
    fn assign_send_receive(&self, island_a: &[I], island_b: &[I]) -> (Vec<usize>, Vec<usize>);
}

impl<I: Individual, F> ExchangePolicy<I> for F
where
    F: Fn(&[I], &[I]) -> (Vec<usize>, Vec<usize>),
{
    fn assign_send_receive(&self, island_a: &[I], island_b: &[I]) -> (Vec<usize>, Vec<usize>) {
        self(island_a, island_b)
    }
}

/// Swap each side's `count` fittest individuals
///
/// Crossing the current champions over keeps both islands exposed to the
/// other's search direction. The count is clamped so both sets stay equal in
/// size even for lopsided populations.
#[derive(Clone, Copy, Debug)]
pub struct SwapBest {
    /// How many individuals each side donates
    pub count: usize,
}

impl SwapBest {
    /// Create a policy swapping the `count` best of each side
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    fn best_indices<I: Individual>(population: &[I], count: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..population.len()).collect();
        indices.sort_by(|&a, &b| population[a].fitness().total_cmp(&population[b].fitness()));
        indices.truncate(count);
        indices
    }
}

impl<I: Individual> ExchangePolicy<I> for SwapBest {
    fn assign_send_receive(&self, island_a: &[I], island_b: &[I]) -> (Vec<usize>, Vec<usize>) {
        let count = self.count.min(island_a.len()).min(island_b.len());
        (
            Self::best_indices(island_a, count),
            Self::best_indices(island_b, count),
        )
    }
}
