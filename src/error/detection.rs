//! This module contains errors that a detector can fail with.
//!
//! These errors never abort a whole analysis run. The detector runner records
//! them against the failing detector and carries on with the others.

use thiserror::Error;

use crate::error::container;

/// Errors that occur while running a single detector.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("Path enumeration exceeded the limit of {limit} paths")]
    PathLimitExceeded { limit: usize },

    #[error("The dataflow analysis did not converge within {iterations} iterations")]
    FixpointDidNotConverge { iterations: usize },

    #[error("Detection was stopped by the watchdog")]
    StoppedByWatchdog,

    #[error("Detector error: {_0}")]
    Other(String),
}

impl Error {
    /// Constructs an otherwise-unclassified detector error with `message`.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// A detection error with an associated line in the listing.
pub type LocatedError = container::Located<Error>;

/// The result type for detectors and the analyses they share.
pub type Result<T> = std::result::Result<T, LocatedError>;

impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, line: u32) -> Self::Located {
        container::Located {
            location: line,
            payload:  self,
        }
    }
}
