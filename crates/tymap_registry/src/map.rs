use alloc::boxed::Box;
use core::any::TypeId;
use core::fmt;

use tymap_utils::TypeIdIndexMap;

use crate::{Bound, RegistryError, Type, Upcast};

// -----------------------------------------------------------------------------
// TypeMap

/// A polymorphic heterogeneous container.
///
/// Maps each type tag to exactly one value of that type, every value
/// being viewed through the common upper bound `B`.
///
/// Entries keep their insertion order. Inserting a value whose type is
/// already present replaces the old value in place.
///
/// # Examples
///
/// ```
/// use core::any::Any;
/// use tymap_registry::{impl_type_path, TypeMap};
///
/// struct Window(u32);
/// impl_type_path!(Window);
///
/// struct Title(&'static str);
/// impl_type_path!(Title);
///
/// let mut map = TypeMap::<dyn Any>::new();
/// map.insert(Window(1));
/// map.insert(Title("hello"));
/// assert!(map.insert(Window(2)).is_some());
///
/// let names: Vec<_> = map.types().map(|ty| ty.name()).collect();
/// assert_eq!(names, ["Window", "Title"]);
/// assert_eq!(map.get::<Window>().unwrap().0, 2);
/// ```
pub struct TypeMap<B: ?Sized> {
    entries: TypeIdIndexMap<(Type, Box<B>)>,
}

impl<B: ?Sized + Bound> Default for TypeMap<B> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized + Bound> TypeMap<B> {
    /// Creates an empty [`TypeMap`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: TypeIdIndexMap::new(),
        }
    }

    /// Inserts a value under its own type, returns the replaced value if any.
    pub fn insert<T: Upcast<B>>(&mut self, value: T) -> Option<Box<B>> {
        self.insert_boxed(Box::new(value))
    }

    /// Inserts a boxed value under its own type, returns the replaced value if any.
    pub fn insert_boxed<T: Upcast<B>>(&mut self, value: Box<T>) -> Option<Box<B>> {
        let ty = Type::of::<T>();
        self.entries
            .insert(ty.id(), (ty, <T as Upcast<B>>::upcast(value)))
            .map(|(_, old)| old)
    }

    /// Inserts an already erased value under the given type tag.
    ///
    /// Fails with [`RegistryError::TypeMismatch`] if the value is not an
    /// instance of the tag, leaving the map unchanged.
    pub fn insert_dyn(&mut self, ty: Type, value: Box<B>) -> Result<Option<Box<B>>, RegistryError> {
        if value.as_any().type_id() != ty.id() {
            return Err(RegistryError::TypeMismatch {
                expected: ty.path(),
            });
        }
        Ok(self.entries.insert(ty.id(), (ty, value)).map(|(_, old)| old))
    }

    /// Returns a reference to the value of type `T`.
    pub fn get<T: Upcast<B>>(&self) -> Option<&T> {
        self.get_dyn(TypeId::of::<T>())?.as_any().downcast_ref::<T>()
    }

    /// Returns a mutable reference to the value of type `T`.
    pub fn get_mut<T: Upcast<B>>(&mut self) -> Option<&mut T> {
        self.get_dyn_mut(TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Returns the value stored under the given type, viewed through the bound.
    #[inline]
    pub fn get_dyn(&self, type_id: TypeId) -> Option<&B> {
        self.entries.get(&type_id).map(|(_, value)| &**value)
    }

    #[inline]
    pub fn get_dyn_mut(&mut self, type_id: TypeId) -> Option<&mut B> {
        self.entries.get_mut(&type_id).map(|(_, value)| &mut **value)
    }

    /// Removes and returns the value of type `T`.
    ///
    /// The remaining entries keep their relative order.
    pub fn remove<T: Upcast<B>>(&mut self) -> Option<T> {
        let (_, value) = self.entries.shift_remove(&TypeId::of::<T>())?;
        value.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Whether a value of type `T` is present.
    #[inline]
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains(&TypeId::of::<T>())
    }

    /// Whether a value of the given type is present.
    #[inline]
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.entries.contains(&type_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// An iterator over the entries in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Type, &B)> {
        self.entries.values().map(|(ty, value)| (*ty, &**value))
    }

    /// An iterator over the stored types in insertion order.
    pub fn types(&self) -> impl ExactSizeIterator<Item = Type> + '_ {
        self.entries.values().map(|(ty, _)| *ty)
    }
}

impl<B: ?Sized> fmt::Debug for TypeMap<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.values().map(|(ty, _)| ty))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
