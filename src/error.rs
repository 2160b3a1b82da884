//! Error types for archipelago
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::comm::Rank;

/// Error type for communication substrate failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommError {
    /// A group must contain at least one rank
    #[error("Communicator group is empty")]
    EmptyGroup,

    /// A rank outside the group was addressed
    #[error("Rank {rank} out of range for group of size {size}")]
    InvalidRank { rank: Rank, size: usize },

    /// A peer endpoint dropped out of the group
    #[error("Rank {rank} disconnected from the group")]
    Disconnected { rank: Rank },

    /// The broadcast root was called without a value to distribute
    #[error("Broadcast root {root} supplied no value")]
    MissingBroadcastValue { root: Rank },

    /// Message encoding or decoding failed
    #[error("Message codec error: {0}")]
    Codec(String),
}

/// Top-level error type for coordination operations
#[derive(Debug, Error)]
pub enum ArchipelagoError {
    /// Communication substrate error
    #[error("Communication error: {0}")]
    Comm(#[from] CommError),

    /// The archipelago requires at least one island
    #[error("Archipelago requires a non-empty rank group")]
    EmptyGroup,

    /// A coordinator-only result was requested from another rank
    #[error("Result is only held by the coordinator rank (requested from rank {rank})")]
    NotCoordinator { rank: Rank },

    /// The broadcast partner assignment did not contain the local rank
    #[error("Rank {rank} missing from partner assignment")]
    RankNotInAssignment { rank: Rank },

    /// An exchange policy named an individual that does not exist
    #[error("Exchange index {index} out of range for population of {len}")]
    ExchangeIndexOutOfRange { index: usize, len: usize },
}

/// Result type alias for coordination operations
pub type ArchipelagoResult<T> = Result<T, ArchipelagoError>;

/// Result type alias for substrate operations
pub type CommResult<T> = Result<T, CommError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comm_error_display() {
        let err = CommError::InvalidRank { rank: 7, size: 4 };
        assert_eq!(err.to_string(), "Rank 7 out of range for group of size 4");

        let err = CommError::Disconnected { rank: 2 };
        assert_eq!(err.to_string(), "Rank 2 disconnected from the group");

        let err = CommError::Codec("truncated payload".to_string());
        assert_eq!(err.to_string(), "Message codec error: truncated payload");
    }

    #[test]
    fn test_archipelago_error_display() {
        let err = ArchipelagoError::NotCoordinator { rank: 3 };
        assert_eq!(
            err.to_string(),
            "Result is only held by the coordinator rank (requested from rank 3)"
        );

        let err = ArchipelagoError::ExchangeIndexOutOfRange { index: 12, len: 10 };
        assert_eq!(
            err.to_string(),
            "Exchange index 12 out of range for population of 10"
        );
    }

    #[test]
    fn test_archipelago_error_from_comm_error() {
        let comm_err = CommError::EmptyGroup;
        let err: ArchipelagoError = comm_err.into();
        assert!(matches!(err, ArchipelagoError::Comm(_)));
    }
}
