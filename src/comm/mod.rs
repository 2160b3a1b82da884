//! Communication substrate
//!
//! This module provides the group-communication contract consumed by the
//! coordination layer and an in-process implementation of it.

pub mod local;
pub mod traits;

pub use traits::{Communicator, Message, Rank, SendTicket, Tag};

pub mod prelude {
    pub use super::local::*;
    pub use super::traits::*;
}
