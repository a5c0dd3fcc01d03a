//! This module contains the primary error type for the analyzer's interface.
//! It also re-exports the more specific error types that are
//! subsystem-specific.

pub mod cfg;
pub mod container;
pub mod detection;
pub mod parse;

pub use parse::UnknownFieldError;
use thiserror::Error;

/// The interface result type for the library.
///
/// Any function considered to be part of the public interface of the library
/// should return this result type. Subsystems return the more-specific child
/// error types as appropriate.
pub type Result<T> = std::result::Result<T, Errors>;

/// The interface error type for the library.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// Errors that come from parsing the listing.
    #[error(transparent)]
    Parse(#[from] parse::Error),

    /// Errors that come from building the control-flow graph.
    #[error(transparent)]
    MalformedCfg(#[from] cfg::Error),

    /// Errors from a detector.
    #[error(transparent)]
    Detection(#[from] detection::Error),

    /// An unknown error, represented as a string.
    #[error("Unknown Error: {_0:?}")]
    Other(String),
}

impl Error {
    /// Constructs an unknown error with the provided `message`.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, line: u32) -> Self::Located {
        container::Located {
            location: line,
            payload:  self,
        }
    }
}

/// A library error with an associated source line.
pub type LocatedError = container::Located<Error>;

/// A container of errors that may occur in the analyzer.
pub type Errors = container::Errors<LocatedError>;

/// Implements the conversions from a subsystem's located error (and its
/// container) into the library-level ones by re-wrapping the payload.
macro_rules! rewrap_located {
    ($module:ident) => {
        impl From<$module::LocatedError> for LocatedError {
            fn from(value: $module::LocatedError) -> Self {
                Self {
                    location: value.location,
                    payload:  Error::from(value.payload),
                }
            }
        }

        impl From<$module::LocatedError> for Errors {
            fn from(value: $module::LocatedError) -> Self {
                let re_wrapped: LocatedError = value.into();
                re_wrapped.into()
            }
        }
    };
}

rewrap_located!(parse);
rewrap_located!(cfg);
rewrap_located!(detection);

#[cfg(test)]
mod test {
    use crate::error::{
        cfg,
        container::Locatable,
        parse,
        Error,
        Errors,
    };

    #[test]
    fn rewraps_subsystem_errors_keeping_the_line() {
        let located = cfg::Error::UnresolvedLabel {
            label: "nowhere".into(),
        }
        .locate(4);
        let errors: Errors = located.into();

        assert_eq!(errors.len(), 1);
        let error = &errors.payloads()[0];
        assert_eq!(error.location, 4);
        assert!(matches!(error.payload, Error::MalformedCfg(_)));
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let error = parse::Error::from(parse::UnknownFieldError::new(
            crate::field::FieldCategory::Global,
            "Bogus",
        ));
        assert_eq!(
            error.to_string(),
            "\"Bogus\" is not a valid global field"
        );
    }
}
