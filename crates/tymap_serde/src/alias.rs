use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

use tymap_registry::{Bound, Type, TypePath, TypeRegistry};
use tymap_utils::TypeIdMap;
use tymap_utils::hash::HashMap;

use crate::{FailurePolicy, KeyCodec, PolyMapError, TypeLoader};

// -----------------------------------------------------------------------------
// AliasProvider

/// A bidirectional mapping between types and short aliases.
///
/// Empty aliases are treated as absent.
pub trait AliasProvider {
    fn alias_for(&self, ty: &Type) -> Option<Cow<'_, str>>;

    fn type_for(&self, alias: &str) -> Option<Type>;
}

impl<P: ?Sized + AliasProvider> AliasProvider for &P {
    #[inline]
    fn alias_for(&self, ty: &Type) -> Option<Cow<'_, str>> {
        (**self).alias_for(ty)
    }

    #[inline]
    fn type_for(&self, alias: &str) -> Option<Type> {
        (**self).type_for(alias)
    }
}

// -----------------------------------------------------------------------------
// AliasTable

/// An explicit alias table.
///
/// Each type has at most one alias and each alias names one type.
/// Registering an alias again moves it to the new type.
///
/// # Examples
///
/// ```
/// use tymap_registry::{impl_type_path, Type};
/// use tymap_serde::{AliasProvider, AliasTable};
///
/// struct Window;
/// impl_type_path!(Window as "app::ui::Window");
///
/// let table = AliasTable::new().with::<Window>("window");
/// let ty = Type::of::<Window>();
///
/// assert_eq!(table.alias_for(&ty).as_deref(), Some("window"));
/// assert_eq!(table.type_for("window"), Some(ty));
/// assert_eq!(table.type_for("app::ui::Window"), None);
/// ```
#[derive(Default, Clone)]
pub struct AliasTable {
    aliases: TypeIdMap<String>,
    types: HashMap<String, Type>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alias of `ty`, replacing its previous alias.
    ///
    /// If `alias` already named another type, that type loses it.
    pub fn insert(&mut self, ty: Type, alias: impl Into<String>) -> &mut Self {
        let alias = alias.into();

        if let Some(previous) = self.aliases.remove(&ty.id()) {
            self.types.remove(&previous);
        }
        if let Some(other) = self.types.insert(alias.clone(), ty)
            && other != ty
        {
            log::debug!("alias `{alias}` moved from `{other}` to `{ty}`");
            self.aliases.remove(&other.id());
        }
        self.aliases.insert(ty.id(), alias);
        self
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<T: TypePath>(mut self, alias: impl Into<String>) -> Self {
        self.insert(Type::of::<T>(), alias);
        self
    }

    /// Removes the alias of `ty`, returns it if any.
    pub fn remove(&mut self, ty: &Type) -> Option<String> {
        let alias = self.aliases.remove(&ty.id())?;
        self.types.remove(&alias);
        Some(alias)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl AliasProvider for AliasTable {
    fn alias_for(&self, ty: &Type) -> Option<Cow<'_, str>> {
        self.aliases
            .get(&ty.id())
            .filter(|alias| !alias.is_empty())
            .map(|alias| Cow::Borrowed(alias.as_str()))
    }

    fn type_for(&self, alias: &str) -> Option<Type> {
        if alias.is_empty() {
            return None;
        }
        self.types.get(alias).copied()
    }
}

impl fmt::Debug for AliasTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.types.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// ShortNames

/// Aliases every type of a registry by its short type name.
///
/// A short name shared by several registered types is ambiguous, these
/// types get no alias and keep their full type path as key.
pub struct ShortNames<'r, B: ?Sized> {
    registry: &'r TypeRegistry<B>,
}

impl<'r, B: ?Sized + Bound> ShortNames<'r, B> {
    #[inline]
    pub const fn new(registry: &'r TypeRegistry<B>) -> Self {
        Self { registry }
    }
}

impl<B: ?Sized> Clone for ShortNames<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized> Copy for ShortNames<'_, B> {}

impl<B: ?Sized + Bound> AliasProvider for ShortNames<'_, B> {
    fn alias_for(&self, ty: &Type) -> Option<Cow<'_, str>> {
        let meta = self.registry.get_with_type_name(ty.name())?;
        (meta.ty() == ty).then_some(Cow::Borrowed(ty.name()))
    }

    fn type_for(&self, alias: &str) -> Option<Type> {
        self.registry
            .get_with_type_name(alias)
            .map(|meta| *meta.ty())
    }
}

impl<B: ?Sized + Bound> fmt::Debug for ShortNames<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShortNames").field(self.registry).finish()
    }
}

// -----------------------------------------------------------------------------
// AliasCodec

/// A [`KeyCodec`] using the aliases of an optional [`AliasProvider`].
///
/// - Encoding uses the alias of the type, or its full type path if the
///   provider has none.
/// - Decoding uses the type of the alias, or loads the key as a full type path.
///
/// Two types may encode to the same key, for example an alias that is also
/// the type path of another type. The later entry then overwrites the earlier
/// one in the serialized form, this is not detected.
///
/// The default failure policy is [`FailurePolicy::Lossy`].
#[derive(Clone, Debug)]
pub struct AliasCodec<P = AliasTable> {
    provider: Option<P>,
}

impl AliasCodec {
    /// Creates a codec without provider, keys are always full type paths.
    #[inline]
    pub const fn new() -> Self {
        Self { provider: None }
    }
}

impl<P> AliasCodec<P> {
    #[inline]
    pub const fn with_provider(provider: P) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    #[inline]
    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }
}

impl<P> Default for AliasCodec<P> {
    #[inline]
    fn default() -> Self {
        Self { provider: None }
    }
}

impl<P: AliasProvider> KeyCodec for AliasCodec<P> {
    fn encode(&self, ty: &Type) -> Result<Cow<'_, str>, PolyMapError> {
        if let Some(provider) = &self.provider {
            match provider.alias_for(ty) {
                Some(alias) if !alias.is_empty() => return Ok(alias),
                _ => log::debug!("no alias for `{ty}`, using its type path"),
            }
        }
        Ok(Cow::Borrowed(ty.path()))
    }

    fn decode(&self, key: &str, loader: &dyn TypeLoader) -> Result<Type, PolyMapError> {
        if let Some(provider) = &self.provider {
            if let Some(ty) = provider.type_for(key) {
                return Ok(ty);
            }
            log::debug!("`{key}` is not an alias, loading it as a type path");
        }
        loader.load_type_by_name(key).map_err(|e| {
            log::debug!("AliasCodec::decode -> {e}");
            PolyMapError::UnresolvedKey(key.into())
        })
    }

    #[inline]
    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Lossy
    }
}

// -----------------------------------------------------------------------------
// Tests
