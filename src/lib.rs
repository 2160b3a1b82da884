//! # archipelago
//!
//! Distributed coordination for island-model evolutionary search.
//!
//! A fixed group of worker ranks, each owning one island (sub-population),
//! cooperates through collective operations to run generations in loosely
//! bounded lockstep, periodically exchange individuals to preserve
//! diversity, and agree group-wide on when the search has converged. The
//! evolutionary operators inside an island stay outside this crate: an
//! island is anything implementing the [`island::Island`] trait, and which
//! individuals migrate is decided by an injected
//! [`island::ExchangePolicy`].
//!
//! ## Coordination model
//!
//! - **Stepping** runs a batch of generations per rank, either fully
//!   independently or paced by a staleness-tolerant group-average age
//!   aggregated at the coordinator rank.
//! - **Migration** pairs ranks by a broadcast random permutation and swaps
//!   individuals symmetrically within each pair.
//! - **Convergence** gathers every island's champion, selects the group
//!   minimum by fitness, and broadcasts one decision all ranks share.
//!
//! The group is fail-stop: no timeouts, no recovery, no membership changes.
//! Every public operation issues one fixed sequence of collective calls on
//! every rank; drivers must invoke the same operations in the same order
//! everywhere.
//!
//! ## Quick start
//!
//! An external driver owns the loop: it sequences stepping, migration, and
//! convergence checks identically on every rank.
//!
//! ```rust,ignore
//! use archipelago::prelude::*;
//!
//! // One endpoint per rank; move each onto its own worker.
//! let endpoints = LocalGroup::endpoints(4)?;
//! for comm in endpoints {
//!     let island = MyIsland::seeded(comm.rank());
//!     let mut member = Archipelago::new(comm, island)?;
//!     loop {
//!         member.step_generations(25, StepMode::Synchronized { sync_interval: 10 })?;
//!         member.migrate(&SwapBest::new(2))?;
//!         if member.check_convergence(1e-3)?.is_converged() {
//!             break;
//!         }
//!     }
//! }
//! ```

pub mod archipelago;
pub mod comm;
pub mod error;
pub mod island;

pub use archipelago::{Archipelago, COORDINATOR};
pub use error::{ArchipelagoError, ArchipelagoResult, CommError, CommResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::archipelago::age_sync::*;
    pub use crate::archipelago::convergence::*;
    pub use crate::archipelago::migration::merge_exchange;
    pub use crate::archipelago::stepping::StepMode;
    pub use crate::archipelago::{Archipelago, COORDINATOR};
    pub use crate::comm::prelude::*;
    pub use crate::error::*;
    pub use crate::island::prelude::*;
}
