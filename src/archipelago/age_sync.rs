//! Age aggregation for loosely synchronized stepping
//!
//! Ranks report their local generational age to the coordinator with
//! fire-and-forget sends; the coordinator folds whatever has already arrived
//! into an [`AgeTable`] and averages it over the whole group. Entries that
//! have not been refreshed this round are stale, and that is fine: the
//! average is a stopping signal, not an exact census.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::comm::{Communicator, Rank, Tag};
use crate::error::CommResult;

/// One rank's generational-age report to the coordinator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeReport {
    /// Reporting rank
    pub rank: Rank,
    /// The island's local generational age at send time
    pub age: u64,
}

/// Last known generational age per rank, kept by the coordinator
///
/// Later reports overwrite earlier ones; a rank that has not reported since
/// the last round keeps its previous entry. One fresh table is used per
/// synchronized phase.
#[derive(Clone, Debug, Default)]
pub struct AgeTable {
    ages: BTreeMap<Rank, u64>,
}

impl AgeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `rank`'s latest known age, replacing any earlier entry
    pub fn record(&mut self, rank: Rank, age: u64) {
        self.ages.insert(rank, age);
    }

    /// Number of ranks that have reported at least once
    pub fn len(&self) -> usize {
        self.ages.len()
    }

    /// Whether no rank has reported yet
    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    /// Group-average age: the sum of known entries over the full group size
    ///
    /// Ranks that have never reported contribute nothing to the sum but
    /// still count in the divisor, so the average under-estimates until the
    /// first full round of reports. `group_size` is at least 1 for any
    /// constructed archipelago.
    pub fn average(&self, group_size: usize) -> f64 {
        debug_assert!(group_size > 0);
        let total: u64 = self.ages.values().sum();
        total as f64 / group_size as f64
    }
}

/// Fold every already-arrived age report into `table` without waiting
pub(crate) fn drain_age_reports<C: Communicator>(
    comm: &C,
    table: &mut AgeTable,
) -> CommResult<()> {
    while let Some(source) = comm.probe(Tag::AgeReport)? {
        let report: AgeReport = comm.recv(source, Tag::AgeReport)?;
        table.record(report.rank, report.age);
    }
    Ok(())
}

/// Consume and drop every already-arrived age report, returning the count
pub(crate) fn discard_age_reports<C: Communicator>(comm: &C) -> CommResult<usize> {
    let mut discarded = 0;
    while let Some(source) = comm.probe(Tag::AgeReport)? {
        let _: AgeReport = comm.recv(source, Tag::AgeReport)?;
        discarded += 1;
    }
    Ok(discarded)
}
