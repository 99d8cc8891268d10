use core::any::Any;

// -----------------------------------------------------------------------------
// AutoRegistration

/// A statically submitted registration, see [`auto_register!`](crate::auto_register).
///
/// The registration function receives the registry as `&mut dyn Any` and
/// only acts on the `TypeRegistry<B>` of its own bound.
pub struct AutoRegistration {
    register: Option<fn(&mut dyn Any)>,
}

impl AutoRegistration {
    #[inline]
    pub const fn new(register: fn(&mut dyn Any)) -> Self {
        Self {
            register: Some(register),
        }
    }
}

inventory::collect!(AutoRegistration);

// Always collected when `inventory` works on the current platform.
inventory::submit! {
    AutoRegistration { register: None }
}

/// Runs every submitted registration against `registry`.
///
/// Returns `false` if static registration is unsupported on this platform.
pub(crate) fn register_types(registry: &mut dyn Any) -> bool {
    let mut available = false;
    for submission in inventory::iter::<AutoRegistration> {
        match submission.register {
            Some(register) => register(registry),
            None => available = true,
        }
    }
    available
}

/// Submits types for [`TypeRegistry::auto_register`](crate::TypeRegistry::auto_register).
///
/// ```
/// use core::any::{Any, TypeId};
/// use serde::{Deserialize, Serialize};
/// use tymap_registry::{auto_register, impl_type_path, TypeRegistry};
///
/// #[derive(Serialize, Deserialize)]
/// struct Foo;
/// impl_type_path!(Foo);
///
/// auto_register!(dyn Any => Foo);
///
/// let mut registry = TypeRegistry::<dyn Any>::new();
/// if registry.auto_register() {
///     assert!(registry.contains(TypeId::of::<Foo>()));
/// }
/// ```
#[macro_export]
macro_rules! auto_register {
    ($bound:ty => $($ty:ty),+ $(,)?) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::AutoRegistration::new(|registry| {
                if let ::core::option::Option::Some(registry) =
                    registry.downcast_mut::<$crate::TypeRegistry<$bound>>()
                {
                    $( registry.register::<$ty>(); )+
                }
            })
        }
    };
}

// -----------------------------------------------------------------------------
// Tests
