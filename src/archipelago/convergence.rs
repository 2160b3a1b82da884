//! Group-wide convergence detection
//!
//! Every rank contributes its island champion; the coordinator picks the
//! group minimum by fitness and broadcasts a single yes/no decision so all
//! ranks act on the same verdict. The selected individual itself stays at
//! the coordinator.

use tracing::debug;

use crate::archipelago::{Archipelago, COORDINATOR};
use crate::comm::{Communicator, Rank};
use crate::error::{ArchipelagoError, ArchipelagoResult};
use crate::island::{Individual, Island};

/// Where the selected best individual lives
///
/// Only the coordinator rank materializes the group best; every other rank
/// gets an explicit marker instead of a best-effort guess, keeping the API
/// total on all ranks.
#[derive(Clone, Debug, PartialEq)]
pub enum BestIndividual<T> {
    /// The group minimum, held at the coordinator
    Available(T),
    /// This rank is not the coordinator and does not hold the individual
    NotCoordinator {
        /// The local rank the result was requested from
        rank: Rank,
    },
}

impl<T> BestIndividual<T> {
    /// The individual, if this rank holds it
    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available(individual) => Some(individual),
            Self::NotCoordinator { .. } => None,
        }
    }

    /// Unwrap the individual or fail with an explicit coordinator-only error
    pub fn require(self) -> ArchipelagoResult<T> {
        match self {
            Self::Available(individual) => Ok(individual),
            Self::NotCoordinator { rank } => Err(ArchipelagoError::NotCoordinator { rank }),
        }
    }
}

/// Immutable result of one convergence check
///
/// Recomputed from scratch on every call; nothing is cached between checks.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergenceReport<T> {
    converged: bool,
    best: BestIndividual<T>,
}

impl<T> ConvergenceReport<T> {
    /// Whether the group best met the tolerance; identical on every rank
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// The selected best individual, coordinator-only
    pub fn best(&self) -> &BestIndividual<T> {
        &self.best
    }

    /// Consume the report, yielding the best-individual marker
    pub fn into_best(self) -> BestIndividual<T> {
        self.best
    }
}

impl<C, I> Archipelago<C, I>
where
    C: Communicator,
    I: Island,
{
    /// Decide group-wide whether the best fitness found meets the tolerance
    ///
    /// Gathers every island's champion at the coordinator, selects the
    /// minimum fitness (stable tie-break: the lowest reporting rank wins),
    /// and broadcasts the boolean decision to the whole group.
    pub fn check_convergence(
        &self,
        error_tolerance: f64,
    ) -> ArchipelagoResult<ConvergenceReport<I::Individual>> {
        let local_best = self.island.best_individual();
        let gathered = self.comm.gather(local_best, COORDINATOR)?;

        let (decision, best) = match gathered {
            Some(mut champions) => {
                champions.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
                let best = champions
                    .into_iter()
                    .next()
                    .ok_or(ArchipelagoError::EmptyGroup)?;
                let converged = best.fitness() <= error_tolerance;
                debug!(
                    best_fitness = best.fitness(),
                    error_tolerance, converged, "selected group best"
                );
                (Some(converged), BestIndividual::Available(best))
            }
            None => (
                None,
                BestIndividual::NotCoordinator {
                    rank: self.comm.rank(),
                },
            ),
        };

        let converged = self.comm.broadcast(decision, COORDINATOR)?;
        Ok(ConvergenceReport { converged, best })
    }
}
