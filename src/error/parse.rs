//! This module contains the error types that pertain to parsing a TEAL
//! listing into [`crate::instruction::Instruction`]s.

use thiserror::Error;

use crate::{error::container, field::FieldCategory};

/// The error produced by the field parsers when a name does not correspond to
/// any field in the requested category.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{name:?} is not a valid {category} field")]
pub struct UnknownFieldError {
    /// The category of field that was being parsed.
    pub category: FieldCategory,

    /// The offending name.
    pub name: String,
}

impl UnknownFieldError {
    /// Constructs a new unknown field error for `name` in `category`.
    #[must_use]
    pub fn new(category: FieldCategory, name: impl Into<String>) -> Self {
        let name = name.into();
        Self { category, name }
    }
}

/// Errors that occur while turning source lines into instructions.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("{_0:?} is not a known TEAL opcode")]
    UnknownMnemonic(String),

    #[error("`{mnemonic}` expects {expected} operand(s) but {found} were provided")]
    WrongOperandCount {
        mnemonic: String,
        expected: String,
        found:    usize,
    },

    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),

    #[error("{operand:?} is not a valid integer")]
    InvalidInteger { operand: String },

    #[error("Operand {operand:?} is outside the valid range {min}..={max}")]
    OperandOutOfRange { operand: String, min: i64, max: u64 },

    #[error("{literal:?} is not a valid byte literal")]
    InvalidBytes { literal: String },

    #[error("Unterminated string literal")]
    UnterminatedString,

    #[error("{_0:?} is not a valid pragma")]
    InvalidPragma(String),

    #[error("The version pragma must come before any instruction")]
    MisplacedPragma,

    #[error("TEAL version {_0} is not supported")]
    UnsupportedVersion(u64),

    #[error("The label {_0:?} is defined more than once")]
    DuplicateLabel(String),

    #[error("Labels cannot be empty")]
    EmptyLabel,

    #[error("The field {field} must be accessed with an array index")]
    MissingArrayIndex { field: String },

    #[error("The field {field} is not an array and cannot be indexed")]
    UnexpectedArrayIndex { field: String },

    #[error("The listing contains no instructions")]
    EmptyListing,
}

/// A parse error with an associated line in the listing.
pub type LocatedError = container::Located<Error>;

/// The result type for functions that may return parse errors.
pub type Result<T> = std::result::Result<T, LocatedError>;

/// Make it possible to attach locations to these errors.
impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, line: u32) -> Self::Located {
        container::Located {
            location: line,
            payload:  self,
        }
    }
}
