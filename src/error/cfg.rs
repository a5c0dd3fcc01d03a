//! This module contains the error type for the construction of the control
//! flow graph.

use thiserror::Error;

use crate::error::container;

/// Errors that indicate the instruction stream cannot be turned into a
/// well-formed control-flow graph.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The branch target {label:?} does not resolve to any instruction")]
    UnresolvedLabel { label: String },

    #[error("The call to {label:?} has no instruction to return to")]
    MissingReturnSite { label: String },

    #[error("Cannot build a control-flow graph from an empty instruction stream")]
    EmptyInstructionStream,
}

/// A CFG error with an associated line in the listing.
pub type LocatedError = container::Located<Error>;

/// The result type for the CFG builder.
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
