use alloc::string::ToString;
use core::any::TypeId;
use core::fmt;

use serde_core::de::DeserializeOwned;
use serde_core::ser::Serialize;
use tymap_utils::TypeIdMap;
use tymap_utils::hash::{HashMap, HashSet};

use crate::{Bound, RegistryError, Type, TypeMeta, Upcast};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of the candidate types of the bound `B`.
///
/// This is the explicit replacement of loading types by name through
/// reflection: only registered types can be resolved from their path.
///
/// Types are indexed by:
/// - [`TypeId`], see [`get`](Self::get).
/// - full type path, see [`get_with_type_path`](Self::get_with_type_path).
/// - short type name, see [`get_with_type_name`](Self::get_with_type_name),
///   only while no other registered type shares it.
///
/// # Example
///
/// ```
/// use core::any::Any;
/// use serde::{Deserialize, Serialize};
/// use tymap_registry::{impl_type_path, RegistryError, TypeRegistry};
///
/// #[derive(Serialize, Deserialize)]
/// struct Foo;
/// impl_type_path!(Foo as "my_crate::Foo");
///
/// let mut registry = TypeRegistry::<dyn Any>::new();
/// assert!(registry.register::<Foo>());
/// assert!(!registry.register::<Foo>());
///
/// let ty = registry.load_type_by_name("my_crate::Foo").unwrap();
/// assert!(ty.is::<Foo>());
///
/// assert_eq!(
///     registry.load_type_by_name("my_crate::Bar"),
///     Err(RegistryError::TypeNotFound("my_crate::Bar".into())),
/// );
/// ```
pub struct TypeRegistry<B: ?Sized> {
    type_meta_table: TypeIdMap<TypeMeta<B>>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    type_name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
}

impl<B: ?Sized + Bound> Default for TypeRegistry<B> {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized + Bound> TypeRegistry<B> {
    /// Creates an empty [`TypeRegistry`].
    pub fn new() -> Self {
        Self {
            type_meta_table: TypeIdMap::new(),
            type_path_to_id: HashMap::default(),
            type_name_to_id: HashMap::default(),
            ambiguous_names: HashSet::default(),
        }
    }

    // # Validity
    // The type must **not** already exist, and its path must be free.
    fn add_new_type_indices(&mut self, ty: &Type) {
        let type_name = ty.name();

        if !self.ambiguous_names.contains(type_name) {
            if self.type_name_to_id.contains_key(type_name) {
                self.type_name_to_id.remove(type_name);
                self.ambiguous_names.insert(type_name);
            } else {
                self.type_name_to_id.insert(type_name, ty.id());
            }
        }

        self.type_path_to_id.insert(ty.path(), ty.id());
    }

    /// Registers `T` if it has not been registered yet.
    ///
    /// - Returns `Ok(true)` if `T` was added.
    /// - Returns `Ok(false)` if `T` was already registered.
    /// - Returns [`RegistryError::DuplicatePath`] if another type already
    ///   uses the type path of `T`, leaving the registry unchanged.
    pub fn try_register<T>(&mut self) -> Result<bool, RegistryError>
    where
        T: Upcast<B> + Serialize + DeserializeOwned,
    {
        let incoming = Type::of::<T>();
        if self.type_meta_table.contains(&incoming.id()) {
            return Ok(false);
        }

        if let Some(existing) = self.get_with_type_path(incoming.path()) {
            return Err(RegistryError::DuplicatePath {
                path: incoming.path(),
                existing: *existing.ty(),
                incoming,
            });
        }

        self.add_new_type_indices(&incoming);
        self.type_meta_table.insert(incoming.id(), TypeMeta::of::<T>());
        log::trace!("registered `{incoming}`");
        Ok(true)
    }

    /// Registers `T` if it has not been registered yet, returns whether it was added.
    ///
    /// A type whose path is already used by another type is ignored with a warning,
    /// use [`try_register`](Self::try_register) to handle this case.
    pub fn register<T>(&mut self) -> bool
    where
        T: Upcast<B> + Serialize + DeserializeOwned,
    {
        match self.try_register::<T>() {
            Ok(added) => added,
            Err(e) => {
                log::warn!("TypeRegistry::register -> {e}");
                false
            }
        }
    }

    /// Registers every type submitted with [`auto_register!`](crate::auto_register)
    /// for the bound `B`.
    ///
    /// Returns `true` if static registration works on the current platform,
    /// always `false` without the `auto_register` feature. Calling it again
    /// is cheap, already registered types are skipped.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            crate::auto_register::register_types(self)
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Whether the type with given [`TypeId`] has been registered in this registry.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.type_meta_table.contains(&type_id)
    }

    /// Returns the [`TypeMeta`] of the type with the given [`TypeId`].
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta<B>> {
        self.type_meta_table.get(&type_id)
    }

    /// Returns the [`TypeMeta`] of the type with the given full type path.
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeMeta<B>> {
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns the [`TypeMeta`] of the type with the given short type name.
    ///
    /// Returns `None` if the name is ambiguous or unknown.
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&TypeMeta<B>> {
        match self.type_name_to_id.get(type_name) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns `true` if the given type name matches multiple registered types.
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    /// Resolves a full type path to a registered [`Type`].
    ///
    /// Fails with [`RegistryError::TypeNotFound`] for unknown paths.
    pub fn load_type_by_name(&self, type_path: &str) -> Result<Type, RegistryError> {
        match self.get_with_type_path(type_path) {
            Some(meta) => Ok(*meta.ty()),
            None => Err(RegistryError::TypeNotFound(type_path.to_string())),
        }
    }

    /// Returns an iterator over the [`TypeMeta`]s of the registered types.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta<B>> {
        self.type_meta_table.values()
    }

    /// Returns the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.type_meta_table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_meta_table.is_empty()
    }
}

impl<B: ?Sized> fmt::Debug for TypeRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_path_to_id.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

#[cfg(feature = "std")]
pub use arc::TypeRegistryArc;

#[cfg(feature = "std")]
mod arc {
    use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

    use super::TypeRegistry;
    use crate::Bound;

    /// A shared [`TypeRegistry`] behind a read-write lock.
    ///
    /// Lock poisoning is ignored, the registry holds no invariant
    /// that a panicking writer could break halfway.
    pub struct TypeRegistryArc<B: ?Sized> {
        /// The wrapped [`TypeRegistry`].
        pub internal: Arc<RwLock<TypeRegistry<B>>>,
    }

    impl<B: ?Sized + Bound> TypeRegistryArc<B> {
        pub fn new(registry: TypeRegistry<B>) -> Self {
            Self {
                internal: Arc::new(RwLock::new(registry)),
            }
        }

        /// Takes a read lock on the underlying [`TypeRegistry`].
        pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry<B>> {
            self.internal.read().unwrap_or_else(PoisonError::into_inner)
        }

        /// Takes a write lock on the underlying [`TypeRegistry`].
        pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry<B>> {
            self.internal
                .write()
                .unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl<B: ?Sized> Clone for TypeRegistryArc<B> {
        fn clone(&self) -> Self {
            Self {
                internal: Arc::clone(&self.internal),
            }
        }
    }

    impl<B: ?Sized + Bound> Default for TypeRegistryArc<B> {
        fn default() -> Self {
            Self::new(TypeRegistry::new())
        }
    }

    impl<B: ?Sized> core::fmt::Debug for TypeRegistryArc<B> {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            let registry = self.internal.read().unwrap_or_else(PoisonError::into_inner);
            core::fmt::Debug::fmt(&*registry, f)
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::{Any, TypeId};

    use serde::{Deserialize, Serialize};

    use super::TypeRegistry;
    use crate::{RegistryError, Type};

    mod foo {
        #[derive(serde::Serialize, serde::Deserialize)]
        pub struct Item;
        crate::impl_type_path!(Item);
    }

    mod bar {
        #[derive(serde::Serialize, serde::Deserialize)]
        pub struct Item;
        crate::impl_type_path!(Item);
    }

    #[derive(Serialize, Deserialize)]
    struct Impostor;
    crate::impl_type_path!(Impostor as "tymap_registry::registry::tests::foo::Item");

    #[test]
    fn short_names_become_ambiguous() {
        let mut registry = TypeRegistry::<dyn Any>::new();
        registry.register::<foo::Item>();
        assert!(registry.get_with_type_name("Item").is_some());

        registry.register::<bar::Item>();
        assert!(registry.is_ambiguous("Item"));
        assert!(registry.get_with_type_name("Item").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut registry = TypeRegistry::<dyn Any>::new();
        registry.register::<foo::Item>();

        let err = registry.try_register::<Impostor>().unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicatePath {
                path: "tymap_registry::registry::tests::foo::Item",
                existing: Type::of::<foo::Item>(),
                incoming: Type::of::<Impostor>(),
            }
        );
        assert!(!registry.register::<Impostor>());
        assert!(!registry.contains(TypeId::of::<Impostor>()));
    }

    #[test]
    fn load_type_by_name() {
        let mut registry = TypeRegistry::<dyn Any>::default();
        registry.register::<bar::Item>();

        let ty = registry
            .load_type_by_name("tymap_registry::registry::tests::bar::Item")
            .unwrap();
        assert!(ty.is::<bar::Item>());
        assert!(matches!(
            registry.load_type_by_name("bar::Item"),
            Err(RegistryError::TypeNotFound(_))
        ));
    }

    #[cfg(feature = "std")]
    #[test]
    fn shared_registry() {
        let shared = super::TypeRegistryArc::<dyn Any + Send + Sync>::default();
        shared.write().register::<foo::Item>();
        let clone = shared.clone();
        assert!(clone.read().contains(TypeId::of::<foo::Item>()));
    }
}
