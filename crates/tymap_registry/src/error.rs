use alloc::string::String;

use thiserror::Error;

use crate::Type;

// -----------------------------------------------------------------------------
// RegistryError

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("no type registered under the path `{0}`")]
    TypeNotFound(String),

    #[error("type path `{path}` is already registered, cannot register it again for a different type")]
    DuplicatePath {
        path: &'static str,
        existing: Type,
        incoming: Type,
    },

    #[error("value stored under `{expected}` is not a `{expected}`")]
    TypeMismatch { expected: &'static str },
}
