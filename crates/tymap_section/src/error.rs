use alloc::string::{String, ToString};
use core::fmt::Display;

use thiserror::Error;

// -----------------------------------------------------------------------------
// SectionError

/// Errors raised while converting values to or from a [`Section`](crate::Section).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SectionError {
    #[error("{0}")]
    Custom(String),

    #[error("section map key must be a string, found {0}")]
    KeyMustBeAString(&'static str),

    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("integer {0} does not fit in a section integer")]
    IntegerOutOfRange(String),
}

impl serde_core::ser::Error for SectionError {
    #[cold]
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

impl serde_core::de::Error for SectionError {
    #[cold]
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}
