//! Island collaborators
//!
//! This module provides the Island and Individual abstractions plus the
//! pluggable migration exchange policy.

pub mod exchange;
pub mod traits;

pub use exchange::{ExchangePolicy, SwapBest};
pub use traits::{Individual, Island};

pub mod prelude {
    pub use super::exchange::*;
    pub use super::traits::*;
}
