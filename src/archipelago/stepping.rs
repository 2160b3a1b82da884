//! Generational stepping
//!
//! Drives the local island through a batch of generations, either fully
//! independently or loosely synchronized against the group-average age
//! reported through the coordinator.

use tracing::trace;

use crate::archipelago::age_sync::{
    discard_age_reports, drain_age_reports, AgeReport, AgeTable,
};
use crate::archipelago::{Archipelago, COORDINATOR};
use crate::comm::{Communicator, Tag};
use crate::error::ArchipelagoResult;
use crate::island::Island;

/// How a stepping phase is paced across the group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepMode {
    /// Step the local island with no cross-rank communication
    Independent,
    /// Step one generation at a time, reporting local age every
    /// `sync_interval` generations and stopping once the broadcast group
    /// average reaches the phase target
    ///
    /// A `sync_interval` of 0 is treated as 1 (report every generation).
    Synchronized {
        /// Local generations between age reports
        sync_interval: u64,
    },
}

impl<C, I> Archipelago<C, I>
where
    C: Communicator,
    I: Island,
{
    /// Run one stepping phase of `num_steps` generations
    ///
    /// In synchronized mode the phase ends with a flush of leftover age
    /// reports and a barrier, so the next phase starts with an empty
    /// age-report mailbox and every rank at the same epoch boundary.
    /// Advances `archipelago_age` by `num_steps` on return; the counter is
    /// local bookkeeping, not itself synchronized.
    pub fn step_generations(&mut self, num_steps: u64, mode: StepMode) -> ArchipelagoResult<()> {
        match mode {
            StepMode::Independent => {
                for _ in 0..num_steps {
                    self.island.step();
                }
            }
            StepMode::Synchronized { sync_interval } => {
                self.synchronized_stepping(num_steps, sync_interval.max(1))?;
                self.flush_age_reports()?;
            }
        }
        self.archipelago_age += num_steps;
        Ok(())
    }

    /// Step until the broadcast group-average age reaches the phase target
    fn synchronized_stepping(
        &mut self,
        num_steps: u64,
        sync_interval: u64,
    ) -> ArchipelagoResult<()> {
        let target_age = (self.archipelago_age + num_steps) as f64;
        let mut ages = AgeTable::new();
        let mut average_age = self.archipelago_age as f64;

        while average_age < target_age {
            if self.island.generational_age() % sync_interval == 0 {
                if self.comm.rank() == COORDINATOR {
                    ages.record(COORDINATOR, self.island.generational_age());
                    drain_age_reports(&self.comm, &mut ages)?;
                    average_age = ages.average(self.comm.size());
                    trace!(average_age, target_age, "aggregated age reports");
                } else {
                    let report = AgeReport {
                        rank: self.comm.rank(),
                        age: self.island.generational_age(),
                    };
                    // Fire and forget; stepping continues without an ack, but
                    // the ticket is observed before the report goes out of
                    // scope.
                    let ticket =
                        self.comm
                            .send_nonblocking(&report, COORDINATOR, Tag::AgeReport)?;
                    ticket.wait()?;
                }
            }

            // The average is rebroadcast every local generation whether or
            // not the coordinator recomputed it, which makes each iteration
            // a group-wide rendezvous. Known tension with the non-blocking
            // intent; the observed cadence is kept.
            let value = (self.comm.rank() == COORDINATOR).then_some(average_age);
            average_age = self.comm.broadcast(value, COORDINATOR)?;

            self.island.step();
        }
        Ok(())
    }

    /// Leave no age report of the finished phase unconsumed
    ///
    /// The leading barrier makes every in-flight report visible at the
    /// coordinator before the drain; the trailing one keeps peers from
    /// entering the next phase and reporting into a mailbox that is being
    /// drained.
    fn flush_age_reports(&self) -> ArchipelagoResult<()> {
        self.comm.barrier()?;
        if self.comm.rank() == COORDINATOR {
            let discarded = discard_age_reports(&self.comm)?;
            if discarded > 0 {
                trace!(discarded, "dropped age reports from finished phase");
            }
        }
        self.comm.barrier()?;
        Ok(())
    }
}
