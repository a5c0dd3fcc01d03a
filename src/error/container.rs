//! This module contains the generic containers used to attach source
//! locations to errors and to aggregate many errors into one.

use std::fmt::Formatter;

use thiserror::Error;

/// An error that is localised to a particular line in the TEAL listing.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Located<E>
where
    E: Clone,
{
    /// The 1-based source line on which the error occurred.
    ///
    /// A location of `0` means that the error is not attributable to any
    /// single line of the listing.
    pub location: u32,

    /// The error data
    pub payload: E,
}

impl<E> Located<E>
where
    E: Clone,
{
    /// Gets the source line at which the error occurred.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.location
    }
}

/// Displays the error prefixed by the line of the listing where it occurred.
impl<E> std::fmt::Display for Located<E>
where
    E: std::fmt::Display + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {}]: {}", self.location, self.payload)
    }
}

/// A trait for types that can have a source line attached to them.
pub trait Locatable
where
    Self: Sized,
{
    /// The return type with the attached source line.
    type Located;

    /// Attach the source `line` to the error.
    fn locate(self, line: u32) -> Self::Located;
}

/// A blanket implementation that allows for attaching a location to any result.
impl<T, E> Locatable for Result<T, E>
where
    E: std::error::Error + Clone,
{
    type Located = Result<T, Located<E>>;

    fn locate(self, line: u32) -> Self::Located {
        self.map_err(|e| Located {
            location: line,
            payload:  e,
        })
    }
}

/// An error that is a collection of errors, in the order in which they were
/// added.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Errors<E> {
    payloads: Vec<E>,
}

impl<E> Errors<E> {
    /// Creates a new container for errors.
    #[must_use]
    pub fn new() -> Self {
        let payloads = vec![];
        Self { payloads }
    }

    /// Gets the errors contained within this error.
    #[must_use]
    pub fn payloads(&self) -> &[E] {
        self.payloads.as_slice()
    }

    /// Gets the length of the errors container.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Checks if the errors container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Errors<E>
where
    E: std::error::Error,
{
    /// Adds the provided `error` to the container.
    pub fn add(&mut self, error: E) {
        self.payloads.push(error);
    }
}

impl<E> Default for Errors<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Allow conversion from any error type to a container of errors.
impl<E> From<E> for Errors<E>
where
    E: std::error::Error,
{
    fn from(value: E) -> Self {
        let mut errors = Self::default();
        errors.add(value);
        errors
    }
}

/// Displays the errors in the sequence in which they occur in the container.
///
/// It has a header specifying how many errors occurred, and then prints one
/// error per line after that.
impl<E> std::fmt::Display for Errors<E>
where
    E: std::fmt::Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.payloads.is_empty() {
            write!(f, "Encountered no errors")?;
        } else {
            writeln!(f, "Encountered {} errors:", self.payloads.len())?;
            for error in &self.payloads {
                writeln!(f, "{error}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::error::{
        container::{Errors, Locatable, Located},
        parse,
    };

    #[test]
    fn wraps_a_single_error_with_its_line() {
        let located = Located {
            location: 3,
            payload:  parse::Error::EmptyLabel,
        };
        let errors: Errors<Located<parse::Error>> = Errors::from(located);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.payloads()[0].line(), 3);
        assert!(errors.to_string().starts_with("Encountered 1 errors:\n[line 3]: "));
    }

    #[test]
    fn renders_line_prefix() {
        let result: Result<(), parse::Error> = Err(parse::Error::EmptyLabel);
        let error = result.locate(12).expect_err("Was not an error");

        assert!(error.to_string().starts_with("[line 12]: "));
    }
}
