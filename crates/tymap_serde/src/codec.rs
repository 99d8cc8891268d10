use alloc::borrow::Cow;

use tymap_registry::{Bound, RegistryError, Type, TypeRegistry};

use crate::PolyMapError;

// -----------------------------------------------------------------------------
// TypeLoader

/// Loads a type from its full type path.
pub trait TypeLoader {
    /// Fails with [`RegistryError::TypeNotFound`] if no type has this path.
    fn load_type_by_name(&self, type_path: &str) -> Result<Type, RegistryError>;
}

impl<B: ?Sized + Bound> TypeLoader for TypeRegistry<B> {
    #[inline]
    fn load_type_by_name(&self, type_path: &str) -> Result<Type, RegistryError> {
        TypeRegistry::load_type_by_name(self, type_path)
    }
}

impl<L: ?Sized + TypeLoader> TypeLoader for &L {
    #[inline]
    fn load_type_by_name(&self, type_path: &str) -> Result<Type, RegistryError> {
        (**self).load_type_by_name(type_path)
    }
}

// -----------------------------------------------------------------------------
// FailurePolicy

/// What deserialization does with an entry that cannot be read back.
///
/// An entry fails when its key does not resolve to a type, when the type
/// has no serializer, or when its section is malformed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Drop the entry with a warning, the call still succeeds with fewer entries.
    Lossy,
    /// Abort the whole call with the first entry error.
    Strict,
}

impl FailurePolicy {
    #[inline]
    pub const fn is_lossy(self) -> bool {
        matches!(self, Self::Lossy)
    }
}

// -----------------------------------------------------------------------------
// KeyCodec

/// Converts a type to the string key of its entry, and back.
///
/// See [`AliasCodec`](crate::AliasCodec) and [`AffixCodec`](crate::AffixCodec).
pub trait KeyCodec {
    /// Returns the key of the entry holding a `ty` value.
    fn encode(&self, ty: &Type) -> Result<Cow<'_, str>, PolyMapError>;

    /// Resolves a key produced by [`encode`](Self::encode).
    ///
    /// Fails with [`PolyMapError::UnresolvedKey`] if no type can be determined.
    fn decode(&self, key: &str, loader: &dyn TypeLoader) -> Result<Type, PolyMapError>;

    /// The failure policy used by default when deserializing with this codec.
    fn failure_policy(&self) -> FailurePolicy;
}

impl<C: ?Sized + KeyCodec> KeyCodec for &C {
    #[inline]
    fn encode(&self, ty: &Type) -> Result<Cow<'_, str>, PolyMapError> {
        (**self).encode(ty)
    }

    #[inline]
    fn decode(&self, key: &str, loader: &dyn TypeLoader) -> Result<Type, PolyMapError> {
        (**self).decode(key, loader)
    }

    #[inline]
    fn failure_policy(&self) -> FailurePolicy {
        (**self).failure_policy()
    }
}
