//! Archipelago coordination
//!
//! This module provides the [`Archipelago`] type: one rank's handle on the
//! distributed island group, tying together generational stepping, age
//! synchronization, migration, and convergence detection. Every public
//! operation issues the same sequence of collective calls on every rank;
//! calling them in different orders on different ranks deadlocks the group,
//! so a driver must run the identical call sequence everywhere.

pub mod age_sync;
pub mod convergence;
pub mod migration;
pub mod stepping;

pub use age_sync::{AgeReport, AgeTable};
pub use convergence::{BestIndividual, ConvergenceReport};
pub use migration::merge_exchange;
pub use stepping::StepMode;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::comm::{Communicator, Rank};
use crate::error::{ArchipelagoError, ArchipelagoResult};
use crate::island::Island;

/// The rank that aggregates age reports, draws pairings, and selects the
/// group best
pub const COORDINATOR: Rank = 0;

/// One rank's view of the distributed island group
///
/// Owns the local island and this rank's communicator endpoint. The group
/// has exactly one island per rank, fixed for the process lifetime.
pub struct Archipelago<C, I> {
    pub(crate) comm: C,
    pub(crate) island: I,
    pub(crate) archipelago_age: u64,
    pub(crate) rng: StdRng,
}

impl<C, I> Archipelago<C, I>
where
    C: Communicator,
    I: Island,
{
    /// Create an archipelago member with an entropy-seeded RNG
    pub fn new(comm: C, island: I) -> ArchipelagoResult<Self> {
        Self::with_rng(comm, island, StdRng::from_entropy())
    }

    /// Create an archipelago member with a deterministic RNG seed
    ///
    /// Only the coordinator's RNG influences group behavior (it draws the
    /// migration pairings), but seeding every rank keeps runs reproducible.
    pub fn with_seed(comm: C, island: I, seed: u64) -> ArchipelagoResult<Self> {
        Self::with_rng(comm, island, StdRng::seed_from_u64(seed))
    }

    /// Create an archipelago member with an explicit RNG
    pub fn with_rng(comm: C, island: I, rng: StdRng) -> ArchipelagoResult<Self> {
        if comm.size() == 0 {
            return Err(ArchipelagoError::EmptyGroup);
        }
        Ok(Self {
            comm,
            island,
            archipelago_age: 0,
            rng,
        })
    }

    /// This member's rank
    pub fn rank(&self) -> Rank {
        self.comm.rank()
    }

    /// Number of islands in the group (one per rank)
    pub fn num_islands(&self) -> usize {
        self.comm.size()
    }

    /// Whether this member is the coordinator rank
    pub fn is_coordinator(&self) -> bool {
        self.comm.rank() == COORDINATOR
    }

    /// Completed step batches, accumulated locally
    pub fn archipelago_age(&self) -> u64 {
        self.archipelago_age
    }

    /// The local island
    pub fn island(&self) -> &I {
        &self.island
    }

    /// Mutable access to the local island
    pub fn island_mut(&mut self) -> &mut I {
        &mut self.island
    }

    /// The underlying communicator endpoint
    pub fn communicator(&self) -> &C {
        &self.comm
    }

    /// Consume the member, returning the local island
    pub fn into_island(self) -> I {
        self.island
    }
}
