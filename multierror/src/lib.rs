//! Combine several errors into a single reportable error.
//!
//! [`wrap`] collapses a list of errors:
//!
//! - no errors: `None`
//! - one error: that error, returned as-is
//! - two or more: a [`MultiError`] whose message is `"[e1, e2, ...]"`
//!
//! ```
//! use giztoy_multierror::{wrap, BoxError};
//!
//! let none: Vec<BoxError> = Vec::new();
//! assert!(wrap(none).is_none());
//!
//! let err = wrap(["disk full", "timeout"]).unwrap();
//! assert_eq!(err.to_string(), "[disk full, timeout]");
//! ```

use std::error::Error;
use std::slice;
use std::vec;

use thiserror::Error;

/// Boxed error type accepted and returned by this crate.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Collapses `errs` into at most one error.
///
/// Returns `None` for an empty input and the single error unchanged for a
/// one-element input. Two or more errors are bundled into a [`MultiError`].
pub fn wrap<I, E>(errs: I) -> Option<BoxError>
where
    I: IntoIterator<Item = E>,
    E: Into<BoxError>,
{
    errs.into_iter().collect::<MultiError>().flatten()
}

/// Several errors bundled into one.
///
/// Displays as `"[e1, e2, ...]"`, joining each error's message with `", "`
/// in insertion order.
#[derive(Debug, Default, Error)]
#[error("[{}]", join_messages(.errors))]
pub struct MultiError {
    errors: Vec<BoxError>,
}

fn join_messages(errors: &[BoxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl MultiError {
    /// Creates an empty MultiError.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error.
    pub fn push<E: Into<BoxError>>(&mut self, err: E) {
        self.errors.push(err.into());
    }

    /// Returns the number of wrapped errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if no errors have been added.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the wrapped errors in insertion order.
    pub fn errors(&self) -> &[BoxError] {
        &self.errors
    }

    /// Iterates over the wrapped errors in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, BoxError> {
        self.errors.iter()
    }

    /// Consumes the MultiError, returning the wrapped errors.
    pub fn into_errors(self) -> Vec<BoxError> {
        self.errors
    }

    /// Returns `None`, the only error, or `self` boxed, for zero, one, or
    /// more wrapped errors respectively.
    pub fn flatten(mut self) -> Option<BoxError> {
        match self.errors.len() {
            0 => None,
            1 => self.errors.pop(),
            _ => Some(Box::new(self)),
        }
    }
}

impl<E: Into<BoxError>> FromIterator<E> for MultiError {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        MultiError {
            errors: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<E: Into<BoxError>> Extend<E> for MultiError {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.errors.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for MultiError {
    type Item = BoxError;
    type IntoIter = vec::IntoIter<BoxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a BoxError;
    type IntoIter = slice::Iter<'a, BoxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
