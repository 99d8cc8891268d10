use alloc::boxed::Box;
use alloc::format;
use core::fmt;

use serde_core::de::{DeserializeOwned, Deserializer};
use serde_core::ser::{Error as _, Serialize, Serializer};

use crate::{Bound, Type, Upcast};

// -----------------------------------------------------------------------------
// TypeMeta

type SerializeFn<B> = fn(value: &B) -> Option<&dyn erased_serde::Serialize>;

type DeserializeFn<B> = fn(
    deserializer: &mut dyn erased_serde::Deserializer<'_>,
) -> Result<Box<B>, erased_serde::Error>;

/// Registration record of one candidate type of the bound `B`.
///
/// Stores the [`Type`] handle and function pointers generated for the
/// concrete type, which dispatch `serde` calls through the type tag rather
/// than through the value.
///
/// # Examples
///
/// ```
/// use core::any::Any;
/// use serde::{Deserialize, Serialize};
/// use tymap_registry::{impl_type_path, TypeMeta, Upcast};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Point {
///     x: i32,
/// }
/// impl_type_path!(Point);
///
/// let meta = TypeMeta::<dyn Any>::of::<Point>();
///
/// let value = <Point as Upcast<dyn Any>>::upcast(Box::new(Point { x: 1 }));
/// let text = meta.serialize(&*value, &mut serde_json::Serializer::new(Vec::new()));
/// assert!(text.is_ok());
///
/// let mut de = serde_json::Deserializer::from_str(r#"{"x":5}"#);
/// let back = meta.deserialize(&mut de).unwrap();
/// assert_eq!(back.downcast_ref::<Point>(), Some(&Point { x: 5 }));
/// ```
pub struct TypeMeta<B: ?Sized> {
    ty: Type,
    serialize: SerializeFn<B>,
    deserialize: DeserializeFn<B>,
}

impl<B: ?Sized + Bound> TypeMeta<B> {
    /// Creates the [`TypeMeta`] of `T`.
    pub fn of<T>() -> Self
    where
        T: Upcast<B> + Serialize + DeserializeOwned,
    {
        Self {
            ty: Type::of::<T>(),
            serialize: |value| {
                value
                    .as_any()
                    .downcast_ref::<T>()
                    .map(|value| value as &dyn erased_serde::Serialize)
            },
            deserialize: |deserializer| {
                let value: T = erased_serde::deserialize(deserializer)?;
                Ok(<T as Upcast<B>>::upcast(Box::new(value)))
            },
        }
    }

    /// Returns the [`Type`] handle.
    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns `true` if `value` is an instance of this type.
    #[inline]
    pub fn accepts(&self, value: &B) -> bool {
        (self.serialize)(value).is_some()
    }

    /// Serializes `value` with the `Serialize` implementation of this type.
    ///
    /// Fails without touching the serializer if `value` is not an instance
    /// of this type.
    pub fn serialize<S: Serializer>(&self, value: &B, serializer: S) -> Result<S::Ok, S::Error> {
        match (self.serialize)(value) {
            Some(value) => value.serialize(serializer),
            None => Err(S::Error::custom(format!(
                "value is not an instance of `{}`",
                self.ty.path(),
            ))),
        }
    }

    /// Deserializes an instance of this type, boxed as the bound.
    pub fn deserialize<'de, D: Deserializer<'de>>(&self, deserializer: D) -> Result<Box<B>, D::Error> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        (self.deserialize)(&mut erased).map_err(<D::Error as serde_core::de::Error>::custom)
    }
}

impl<B: ?Sized> Clone for TypeMeta<B> {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty,
            serialize: self.serialize,
            deserialize: self.deserialize,
        }
    }
}

impl<B: ?Sized> fmt::Debug for TypeMeta<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMeta").field("ty", &self.ty).finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use core::any::Any;

    use serde::{Deserialize, Serialize};

    use super::TypeMeta;
    use crate::Upcast;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Alpha {
        value: u8,
    }
    crate::impl_type_path!(Alpha);

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Beta(u8);
    crate::impl_type_path!(Beta);

    #[test]
    fn serialize_through_tag() {
        let meta = TypeMeta::<dyn Any>::of::<Alpha>();
        let value = <Alpha as Upcast<dyn Any>>::upcast(Box::new(Alpha { value: 4 }));

        let mut out = String::new();
        let mut ser = ron::Serializer::new(&mut out, None).unwrap();
        meta.serialize(&*value, &mut ser).unwrap();
        assert_eq!(out, "(value:4)");
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let meta = TypeMeta::<dyn Any>::of::<Alpha>();
        let other = <Beta as Upcast<dyn Any>>::upcast(Box::new(Beta(1)));

        assert!(!meta.accepts(&*other));
        let err = meta
            .serialize(&*other, serde_json::value::Serializer)
            .unwrap_err();
        assert!(err.to_string().contains("is not an instance of"));
    }

    #[test]
    fn deserialize_boxes_as_bound() {
        let meta = TypeMeta::<dyn Any>::of::<Beta>();
        let mut de = ron::Deserializer::from_str("(9)").unwrap();
        let value = meta.deserialize(&mut de).unwrap();
        assert_eq!(value.downcast_ref::<Beta>(), Some(&Beta(9)));
    }
}
