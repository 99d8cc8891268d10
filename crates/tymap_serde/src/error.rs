use alloc::string::String;

use thiserror::Error;
use tymap_registry::RegistryError;
use tymap_section::SectionError;

// -----------------------------------------------------------------------------
// PolyMapError

/// Errors raised while converting a [`TypeMap`](tymap_registry::TypeMap)
/// to or from its serialized form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PolyMapError {
    /// The type path does not carry the prefix and suffix of an [`AffixCodec`](crate::AffixCodec).
    #[error("type path `{name}` does not start with `{prefix}` and end with `{suffix}`")]
    AffixMismatch {
        name: String,
        prefix: String,
        suffix: String,
    },

    /// No type could be resolved from the key.
    #[error("key `{0}` does not resolve to any registered type")]
    UnresolvedKey(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The factory has no serializer for the type.
    #[error("type `{0}` has no registered serializer")]
    UnregisteredType(String),

    /// A value is not an instance of the type it is stored under.
    #[error("value is not an instance of `{0}`")]
    TypeMismatch(String),

    #[error(transparent)]
    Section(#[from] SectionError),
}
