use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to the stable path and name of a type.
///
/// Provide a stable alternative to [`core::any::type_name`], whose output is
/// not guaranteed across compiler versions. The type path is the fully
/// qualified name used when no shorter key is available, so it should not
/// be duplicated by different types.
///
/// We guarantee that these names do not have the prefix `::`.
/// Users should also ensure this when manually implementing it.
///
/// # Implementation
///
/// Use [`impl_type_path!`](crate::impl_type_path):
///
/// ```
/// use tymap_registry::{impl_type_path, TypePath};
///
/// mod model {
///     pub struct Plain;
///     tymap_registry::impl_type_path!(Plain);
/// }
///
/// // Stable path, survives moving the definition.
/// struct Pinned;
/// impl_type_path!(Pinned as "pkg::model::PinnedConfig");
///
/// assert!(model::Plain::type_path().ends_with("model::Plain"));
/// assert_eq!(Pinned::type_path(), "pkg::model::PinnedConfig");
/// assert_eq!(Pinned::type_name(), "PinnedConfig");
/// assert_eq!(Pinned::module_path(), Some("pkg::model"));
/// ```
///
/// Or manually:
///
/// ```
/// use tymap_registry::TypePath;
///
/// struct Foo;
///
/// impl TypePath for Foo {
///     fn type_path() -> &'static str { "my_crate::foo::Foo" }
///     fn type_name() -> &'static str { "Foo" }
///     fn module_path() -> Option<&'static str> { Some("my_crate::foo") }
/// }
/// ```
pub trait TypePath: 'static {
    /// Returns the fully qualified path of the type, e.g. `"pkg::model::NetworkConfig"`.
    fn type_path() -> &'static str;

    /// Returns the last segment of the path, e.g. `"NetworkConfig"`.
    ///
    /// This name allows for duplication.
    fn type_name() -> &'static str;

    /// Optional module path where the type is defined.
    fn module_path() -> Option<&'static str> {
        None
    }
}

/// Splits a type path into its module path and type name.
///
/// ```
/// use tymap_registry::split_type_path;
///
/// assert_eq!(split_type_path("a::b::C"), (Some("a::b"), "C"));
/// assert_eq!(split_type_path("C"), (None, "C"));
/// ```
pub const fn split_type_path(path: &'static str) -> (Option<&'static str>, &'static str) {
    let bytes = path.as_bytes();
    let mut i = bytes.len();
    while i >= 2 {
        if bytes[i - 1] == b':' && bytes[i - 2] == b':' {
            let (module, name) = path.split_at(i);
            let (module, _) = module.split_at(i - 2);
            return (Some(module), name);
        }
        i -= 1;
    }
    (None, path)
}

/// Implements [`TypePath`] for a local type.
///
/// - `impl_type_path!(Foo)`: the path is the invoking module path plus `Foo`.
/// - `impl_type_path!(Foo as "pkg::model::FooConfig")`: the given path, whose
///   last segment becomes the type name.
///
/// See [`TypePath`] for examples.
#[macro_export]
macro_rules! impl_type_path {
    ($ty:ident) => {
        impl $crate::TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                ::core::concat!(::core::module_path!(), "::", ::core::stringify!($ty))
            }

            #[inline]
            fn type_name() -> &'static str {
                ::core::stringify!($ty)
            }

            #[inline]
            fn module_path() -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(::core::module_path!())
            }
        }
    };
    ($ty:ty as $path:literal) => {
        impl $crate::TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                $path
            }

            #[inline]
            fn type_name() -> &'static str {
                $crate::split_type_path($path).1
            }

            #[inline]
            fn module_path() -> ::core::option::Option<&'static str> {
                $crate::split_type_path($path).0
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Type

/// A copyable handle of a registered type.
///
/// Equality and hashing only consider the [`TypeId`].
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use tymap_registry::{impl_type_path, Type};
///
/// struct Foo;
/// impl_type_path!(Foo as "my_crate::Foo");
///
/// let ty = Type::of::<Foo>();
/// assert_eq!(ty.id(), TypeId::of::<Foo>());
/// assert_eq!(ty.path(), "my_crate::Foo");
/// assert_eq!(ty.to_string(), "my_crate::Foo");
/// assert!(ty.is::<Foo>());
/// ```
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: &'static str,
    name: &'static str,
    module_path: Option<&'static str>,
}

impl Type {
    /// Creates a new [`Type`] from a type that implements [`TypePath`].
    #[inline]
    pub fn of<T: TypePath + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: T::type_path(),
            name: T::type_name(),
            module_path: T::module_path(),
        }
    }

    /// Returns the [`TypeId`] of the type.
    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// See [`TypePath::type_path`].
    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// See [`TypePath::type_name`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// See [`TypePath::module_path`].
    #[inline(always)]
    pub const fn module_path(&self) -> Option<&'static str> {
        self.module_path
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Type").field(&self.path).finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

// -----------------------------------------------------------------------------
// Tests
