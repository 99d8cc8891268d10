use alloc::boxed::Box;

use tymap_registry::{Bound, Type, TypeMeta, TypeRegistry};
use tymap_section::{Section, SectionOptions, SectionSerializer};

use crate::PolyMapError;

// -----------------------------------------------------------------------------
// TypeSerializer

/// Converts values of one type to and from a [`Section`].
pub trait TypeSerializer<B: ?Sized> {
    /// Serializes `value`, which must be an instance of the bound type.
    fn serialize(&self, value: &B) -> Result<Section, PolyMapError>;

    fn deserialize(&self, section: Section) -> Result<Box<B>, PolyMapError>;
}

// -----------------------------------------------------------------------------
// SerializerFactory

/// Produces the [`TypeSerializer`] of a type.
///
/// [`TypeRegistry`] is a factory for every registered type, using their
/// `serde` implementations.
pub trait SerializerFactory<B: ?Sized> {
    /// Fails with [`PolyMapError::UnregisteredType`] for unknown types.
    fn serializer_for(
        &self,
        ty: &Type,
        options: &SectionOptions,
    ) -> Result<Box<dyn TypeSerializer<B> + '_>, PolyMapError>;
}

impl<B: ?Sized, F: ?Sized + SerializerFactory<B>> SerializerFactory<B> for &F {
    #[inline]
    fn serializer_for(
        &self,
        ty: &Type,
        options: &SectionOptions,
    ) -> Result<Box<dyn TypeSerializer<B> + '_>, PolyMapError> {
        (**self).serializer_for(ty, options)
    }
}

struct MetaSerializer<'a, B: ?Sized> {
    meta: &'a TypeMeta<B>,
    options: SectionOptions,
}

impl<B: ?Sized + Bound> TypeSerializer<B> for MetaSerializer<'_, B> {
    fn serialize(&self, value: &B) -> Result<Section, PolyMapError> {
        if !self.meta.accepts(value) {
            return Err(PolyMapError::TypeMismatch(self.meta.ty().path().into()));
        }
        Ok(self.meta.serialize(value, SectionSerializer::new(&self.options))?)
    }

    fn deserialize(&self, section: Section) -> Result<Box<B>, PolyMapError> {
        Ok(self.meta.deserialize(section)?)
    }
}

impl<B: ?Sized + Bound> SerializerFactory<B> for TypeRegistry<B> {
    fn serializer_for(
        &self,
        ty: &Type,
        options: &SectionOptions,
    ) -> Result<Box<dyn TypeSerializer<B> + '_>, PolyMapError> {
        match self.get(ty.id()) {
            Some(meta) => Ok(Box::new(MetaSerializer {
                meta,
                options: *options,
            })),
            None => Err(PolyMapError::UnregisteredType(ty.path().into())),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use core::any::Any;

    use serde::{Deserialize, Serialize};
    use tymap_registry::{Type, TypeRegistry, Upcast};
    use tymap_section::{Section, SectionMap, SectionOptions};

    use super::SerializerFactory;
    use crate::PolyMapError;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Limits {
        max: u32,
        label: Option<String>,
    }
    tymap_registry::impl_type_path!(Limits);

    #[derive(Serialize, Deserialize)]
    struct Unused;
    tymap_registry::impl_type_path!(Unused);

    fn registry() -> TypeRegistry<dyn Any> {
        let mut registry = TypeRegistry::new();
        registry.register::<Limits>();
        registry
    }

    #[test]
    fn serializes_through_the_tag() {
        let registry = registry();
        let options = SectionOptions::new().with_output_nulls(true);
        let serializer = registry
            .serializer_for(&Type::of::<Limits>(), &options)
            .unwrap();

        let value = <Limits as Upcast<dyn Any>>::upcast(Box::new(Limits { max: 3, label: None }));
        let section = serializer.serialize(&*value).unwrap();

        let mut expected = SectionMap::new();
        expected.insert("max", 3u32);
        expected.insert("label", Section::Null);
        assert_eq!(section, Section::Map(expected));

        let back = serializer.deserialize(section).unwrap();
        assert_eq!(
            back.downcast_ref::<Limits>(),
            Some(&Limits { max: 3, label: None })
        );
    }

    #[test]
    fn rejects_other_values() {
        let registry = registry();
        let serializer = registry
            .serializer_for(&Type::of::<Limits>(), &SectionOptions::default())
            .unwrap();

        let other = <Unused as Upcast<dyn Any>>::upcast(Box::new(Unused));
        assert!(matches!(
            serializer.serialize(&*other),
            Err(PolyMapError::TypeMismatch(_))
        ));
        assert!(matches!(
            serializer.deserialize(Section::from("text")),
            Err(PolyMapError::Section(_))
        ));
        assert!(matches!(
            registry.serializer_for(&Type::of::<Unused>(), &SectionOptions::default()),
            Err(PolyMapError::UnregisteredType(_))
        ));
    }
}
