//! Pairwise migration between islands
//!
//! Each round the coordinator shuffles the ranks into a random order and
//! broadcasts it; adjacent positions form exchange pairs. Within a pair the
//! rank at the even position initiates: it sees both populations, asks the
//! injected [`ExchangePolicy`] which individuals move, and tells its partner
//! what to donate. Both sides then swap synchronously and rebuild their
//! populations.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::archipelago::{Archipelago, COORDINATOR};
use crate::comm::{Communicator, Rank, Tag};
use crate::error::{ArchipelagoError, ArchipelagoResult};
use crate::island::{ExchangePolicy, Island};

impl<C, I> Archipelago<C, I>
where
    C: Communicator,
    I: Island,
{
    /// Run one migration round
    ///
    /// Callable at any point between stepping phases. With an odd group
    /// size, the rank at the last position of the shuffle sits the round
    /// out. Population sizes are conserved on both sides whenever `policy`
    /// returns equal-cardinality donate sets.
    pub fn migrate<P>(&mut self, policy: &P) -> ArchipelagoResult<()>
    where
        P: ExchangePolicy<I::Individual>,
    {
        let assignment = self.draw_partner_assignment()?;
        let rank = self.comm.rank();
        let position = assignment
            .iter()
            .position(|&r| r == rank)
            .ok_or(ArchipelagoError::RankNotInAssignment { rank })?;

        if position % 2 == 0 {
            match assignment.get(position + 1) {
                Some(&partner) => self.initiate_exchange(partner, policy),
                None => {
                    trace!(rank, "unpaired this round, sitting out");
                    Ok(())
                }
            }
        } else {
            self.follow_exchange(assignment[position - 1])
        }
    }

    /// Draw this round's pairing permutation and agree on it group-wide
    ///
    /// The coordinator shuffles `[0, N)` uniformly and broadcasts the
    /// result, so every rank observes the identical permutation.
    pub fn draw_partner_assignment(&mut self) -> ArchipelagoResult<Vec<Rank>> {
        let assignment = if self.comm.rank() == COORDINATOR {
            let mut ranks: Vec<Rank> = (0..self.comm.size()).collect();
            ranks.shuffle(&mut self.rng);
            Some(ranks)
        } else {
            None
        };
        Ok(self.comm.broadcast(assignment, COORDINATOR)?)
    }

    /// Initiator side: collect the partner's population, run the policy,
    /// and send the partner its donate set
    fn initiate_exchange<P>(&mut self, partner: Rank, policy: &P) -> ArchipelagoResult<()>
    where
        P: ExchangePolicy<I::Individual>,
    {
        let partner_population: Vec<I::Individual> = self.comm.recv(partner, Tag::Migration)?;
        let (to_donate, partner_donates) =
            policy.assign_send_receive(self.island.population(), &partner_population);
        debug!(
            partner,
            donating = to_donate.len(),
            receiving = partner_donates.len(),
            "exchange sets assigned"
        );
        self.comm.send(&partner_donates, partner, Tag::Migration)?;
        self.swap_individuals(partner, &to_donate)
    }

    /// Partner side: ship the population over and wait for the verdict
    fn follow_exchange(&mut self, partner: Rank) -> ArchipelagoResult<()> {
        let population = self.island.population().to_vec();
        self.comm.send(&population, partner, Tag::Migration)?;
        let to_donate: Vec<usize> = self.comm.recv(partner, Tag::Migration)?;
        self.swap_individuals(partner, &to_donate)
    }

    /// Swap the donated individuals with `partner` and rebuild the
    /// population
    fn swap_individuals(&mut self, partner: Rank, donate: &[usize]) -> ArchipelagoResult<()> {
        let population = self.island.population();
        let donated: BTreeSet<usize> = donate.iter().copied().collect();

        let mut outgoing = Vec::with_capacity(donated.len());
        for &index in &donated {
            let individual =
                population
                    .get(index)
                    .ok_or(ArchipelagoError::ExchangeIndexOutOfRange {
                        index,
                        len: population.len(),
                    })?;
            outgoing.push(individual.clone());
        }

        let incoming: Vec<I::Individual> =
            self.comm.send_receive(&outgoing, partner, Tag::Migration)?;
        let next = merge_exchange(population, &donated, incoming);
        self.island.load_population(next);
        Ok(())
    }
}

/// Rebuild a population after an exchange: survivors in island order,
/// followed by the received individuals
pub fn merge_exchange<T: Clone>(
    population: &[T],
    donated: &BTreeSet<usize>,
    incoming: Vec<T>,
) -> Vec<T> {
    let mut next: Vec<T> = population
        .iter()
        .enumerate()
        .filter(|(index, _)| !donated.contains(index))
        .map(|(_, individual)| individual.clone())
        .collect();
    next.extend(incoming);
    next
}
