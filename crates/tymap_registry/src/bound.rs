use alloc::boxed::Box;
use core::any::Any;

use crate::TypePath;

// -----------------------------------------------------------------------------
// Bound

/// The common upper bound `B` of the values stored in a [`TypeMap`].
///
/// Implemented on trait objects (`dyn Trait`) to reach the concrete value
/// behind them. The trait must have [`Any`] as a supertrait, then
/// [`impl_bound!`] writes the implementation:
///
/// ```
/// use core::any::Any;
/// use tymap_registry::{impl_bound, Bound};
///
/// pub trait Plugin: Any {}
/// impl_bound!(dyn Plugin);
///
/// struct Foo;
/// impl Plugin for Foo {}
///
/// let plugin: Box<dyn Plugin> = Box::new(Foo);
/// assert!(plugin.as_any().is::<Foo>());
/// ```
///
/// `dyn Any`, `dyn Any + Send` and `dyn Any + Send + Sync` are bounds already.
///
/// [`TypeMap`]: crate::TypeMap
/// [`impl_bound!`]: crate::impl_bound
pub trait Bound: 'static {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Implements [`Bound`] for trait objects whose trait has [`Any`] as a supertrait.
#[macro_export]
macro_rules! impl_bound {
    ($($bound:ty),+ $(,)?) => {$(
        impl $crate::Bound for $bound {
            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            #[inline]
            fn into_any(
                self: $crate::__macro_exports::Box<Self>,
            ) -> $crate::__macro_exports::Box<dyn ::core::any::Any> {
                self
            }
        }
    )+};
}

impl_bound!(dyn Any, dyn Any + Send, dyn Any + Send + Sync);

// -----------------------------------------------------------------------------
// Upcast

/// Conversion of a concrete type into the upper bound `B`.
///
/// Only types implementing `Upcast<B>` can be stored in a `TypeMap<B>`
/// or registered in a `TypeRegistry<B>`. Use [`impl_upcast!`] to implement it:
///
/// ```
/// use core::any::Any;
/// use tymap_registry::{impl_bound, impl_type_path, impl_upcast, Upcast};
///
/// pub trait Plugin: Any {
///     fn name(&self) -> &str;
/// }
/// impl_bound!(dyn Plugin);
///
/// struct Foo;
/// impl_type_path!(Foo);
/// impl_upcast!(dyn Plugin => Foo);
///
/// impl Plugin for Foo {
///     fn name(&self) -> &str { "foo" }
/// }
///
/// let plugin = <Foo as Upcast<dyn Plugin>>::upcast(Box::new(Foo));
/// assert_eq!(plugin.name(), "foo");
/// ```
///
/// Every [`TypePath`] type upcasts to `dyn Any` and its `Send`/`Sync` variants.
///
/// [`impl_upcast!`]: crate::impl_upcast
pub trait Upcast<B: ?Sized + Bound>: TypePath + Sized {
    fn upcast(self: Box<Self>) -> Box<B>;

    fn upcast_ref(&self) -> &B;

    fn upcast_mut(&mut self) -> &mut B;
}

/// Implements [`Upcast`] from each listed type to the bound.
#[macro_export]
macro_rules! impl_upcast {
    ($bound:ty => $($ty:ty),+ $(,)?) => {$(
        impl $crate::Upcast<$bound> for $ty {
            #[inline]
            fn upcast(
                self: $crate::__macro_exports::Box<Self>,
            ) -> $crate::__macro_exports::Box<$bound> {
                self
            }

            #[inline]
            fn upcast_ref(&self) -> &$bound {
                self
            }

            #[inline]
            fn upcast_mut(&mut self) -> &mut $bound {
                self
            }
        }
    )+};
}

impl<T: TypePath> Upcast<dyn Any> for T {
    #[inline]
    fn upcast(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    fn upcast_ref(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn upcast_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: TypePath + Send> Upcast<dyn Any + Send> for T {
    #[inline]
    fn upcast(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    #[inline]
    fn upcast_ref(&self) -> &(dyn Any + Send) {
        self
    }

    #[inline]
    fn upcast_mut(&mut self) -> &mut (dyn Any + Send) {
        self
    }
}

impl<T: TypePath + Send + Sync> Upcast<dyn Any + Send + Sync> for T {
    #[inline]
    fn upcast(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    #[inline]
    fn upcast_ref(&self) -> &(dyn Any + Send + Sync) {
        self
    }

    #[inline]
    fn upcast_mut(&mut self) -> &mut (dyn Any + Send + Sync) {
        self
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use core::any::Any;

    use super::{Bound, Upcast};

    pub trait Shape: Any {
        fn area(&self) -> u32;
    }
    crate::impl_bound!(dyn Shape);

    struct Square(u32);
    crate::impl_type_path!(Square);
    crate::impl_upcast!(dyn Shape => Square);

    impl Shape for Square {
        fn area(&self) -> u32 {
            self.0 * self.0
        }
    }

    #[test]
    fn upcast_then_downcast() {
        let shape = <Square as Upcast<dyn Shape>>::upcast(Box::new(Square(3)));
        assert_eq!(shape.area(), 9);
        assert!(shape.as_any().is::<Square>());

        let square = shape.into_any().downcast::<Square>().unwrap();
        assert_eq!(square.0, 3);
    }

    #[test]
    fn any_is_a_bound() {
        let mut value = <Square as Upcast<dyn Any + Send + Sync>>::upcast(Box::new(Square(2)));
        assert!(value.as_any_mut().downcast_mut::<Square>().is_some());
    }
}
