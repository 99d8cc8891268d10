use alloc::string::String;
use alloc::vec;

use serde_core::de::value::StringDeserializer;
use serde_core::de::{self, DeserializeOwned, IntoDeserializer, Visitor};
use serde_core::forward_to_deserialize_any;

use crate::{Section, SectionError, SectionMap};

// -----------------------------------------------------------------------------
// from_section

/// Deserializes a value out of an owned [`Section`].
///
/// Accepts the shapes produced by [`to_section`](crate::to_section); enum
/// values may be a plain string (unit variants) or a single-entry map.
///
/// # Examples
///
/// ```
/// use serde::Deserialize;
/// use tymap_section::{from_section, Section, SectionMap};
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Limits {
///     max: u16,
///     soft: Option<u16>,
/// }
///
/// let map: SectionMap = [("max", 10)].into_iter().collect();
/// let limits: Limits = from_section(Section::Map(map)).unwrap();
/// assert_eq!(limits, Limits { max: 10, soft: None });
/// ```
pub fn from_section<T: DeserializeOwned>(section: Section) -> Result<T, SectionError> {
    T::deserialize(section)
}

impl<'de> IntoDeserializer<'de, SectionError> for Section {
    type Deserializer = Self;

    #[inline]
    fn into_deserializer(self) -> Self {
        self
    }
}

// -----------------------------------------------------------------------------
// Deserializer

impl<'de> de::Deserializer<'de> for Section {
    type Error = SectionError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, SectionError> {
        match self {
            Section::Null => visitor.visit_unit(),
            Section::Bool(b) => visitor.visit_bool(b),
            Section::Int(i) => visitor.visit_i64(i),
            Section::UInt(u) => visitor.visit_u64(u),
            Section::Float(f) => visitor.visit_f64(f),
            Section::String(s) => visitor.visit_string(s),
            Section::Seq(items) => {
                let len = items.len();
                let mut seq = SeqDeserializer {
                    iter: items.into_iter(),
                };
                let value = visitor.visit_seq(&mut seq)?;
                match seq.iter.len() {
                    0 => Ok(value),
                    _ => Err(de::Error::invalid_length(len, &"fewer elements in sequence")),
                }
            }
            Section::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, SectionError> {
        match self {
            Section::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    #[inline]
    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, SectionError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, SectionError> {
        match self {
            Section::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Section::Map(map) if map.len() == 1 => {
                let mut iter = map.into_iter();
                match iter.next() {
                    Some((variant, value)) => visitor.visit_enum(EnumDeserializer {
                        variant,
                        value: Some(value),
                    }),
                    None => Err(de::Error::invalid_length(0, &"a single-entry map")),
                }
            }
            other => Err(SectionError::UnexpectedType {
                expected: "string or single-entry map",
                found: other.kind(),
            }),
        }
    }

    #[inline]
    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, SectionError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier
    }
}

// -----------------------------------------------------------------------------
// Sequences

struct SeqDeserializer {
    iter: vec::IntoIter<Section>,
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = SectionError;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, SectionError> {
        match self.iter.next() {
            Some(value) => seed.deserialize(value).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

// -----------------------------------------------------------------------------
// Maps

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Section>,
    value: Option<Section>,
}

impl MapDeserializer {
    fn new(map: SectionMap) -> Self {
        Self {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = SectionError;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, SectionError> {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(MapKeyDeserializer { key }).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, SectionError> {
        match self.value.take() {
            Some(value) => seed.deserialize(value),
            None => Err(de::Error::custom("map value requested before its key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Map keys are strings, but integer and boolean keys were rendered
/// into strings by the serializer and are parsed back on request.
struct MapKeyDeserializer {
    key: String,
}

macro_rules! deserialize_parsed_key {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, SectionError> {
            match self.key.parse::<$ty>() {
                Ok(value) => visitor.$visit(value),
                Err(_) => visitor.visit_string(self.key),
            }
        }
    )*};
}

impl<'de> de::Deserializer<'de> for MapKeyDeserializer {
    type Error = SectionError;

    #[inline]
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, SectionError> {
        visitor.visit_string(self.key)
    }

    deserialize_parsed_key! {
        deserialize_bool => visit_bool: bool,
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
    }

    #[inline]
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, SectionError> {
        visitor.visit_some(self)
    }

    #[inline]
    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, SectionError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, SectionError> {
        visitor.visit_enum(EnumDeserializer {
            variant: self.key,
            value: None,
        })
    }

    forward_to_deserialize_any! {
        i128 u128 f32 f64 char str string bytes byte_buf unit unit_struct
        seq tuple tuple_struct map struct identifier ignored_any
    }
}

// -----------------------------------------------------------------------------
// Enums

struct EnumDeserializer {
    variant: String,
    value: Option<Section>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = SectionError;
    type Variant = VariantDeserializer;

    fn variant_seed<V: de::DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, VariantDeserializer), SectionError> {
        let deserializer: StringDeserializer<SectionError> = self.variant.into_deserializer();
        let variant = seed.deserialize(deserializer)?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Section>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = SectionError;

    fn unit_variant(self) -> Result<(), SectionError> {
        match self.value {
            None | Some(Section::Null) => Ok(()),
            Some(other) => Err(SectionError::UnexpectedType {
                expected: "unit variant",
                found: other.kind(),
            }),
        }
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, SectionError> {
        match self.value {
            Some(value) => seed.deserialize(value),
            None => Err(SectionError::UnexpectedType {
                expected: "newtype variant",
                found: "unit variant",
            }),
        }
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, SectionError> {
        match self.value {
            Some(seq @ Section::Seq(_)) => de::Deserializer::deserialize_any(seq, visitor),
            Some(other) => Err(SectionError::UnexpectedType {
                expected: "tuple variant",
                found: other.kind(),
            }),
            None => Err(SectionError::UnexpectedType {
                expected: "tuple variant",
                found: "unit variant",
            }),
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, SectionError> {
        match self.value {
            Some(Section::Map(map)) => visitor.visit_map(MapDeserializer::new(map)),
            Some(other) => Err(SectionError::UnexpectedType {
                expected: "struct variant",
                found: other.kind(),
            }),
            None => Err(SectionError::UnexpectedType {
                expected: "struct variant",
                found: "unit variant",
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use serde::{Deserialize, Serialize};

    use super::from_section;
    use crate::{Section, SectionError, SectionMap, SectionOptions, to_section};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    enum Mode {
        Off,
        Fixed(u8),
        Pair(u8, u8),
        Range { low: u8, high: u8 },
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Worker {
        name: String,
        modes: Vec<Mode>,
        weights: BTreeMap<u16, f64>,
        limit: Option<u32>,
        id: (u8, char),
    }

    #[test]
    fn round_trip_through_section() {
        let mut weights = BTreeMap::new();
        weights.insert(3, 0.5);
        let worker = Worker {
            name: "w".into(),
            modes: vec![
                Mode::Off,
                Mode::Fixed(1),
                Mode::Pair(1, 2),
                Mode::Range { low: 0, high: 9 },
            ],
            weights,
            limit: None,
            id: (7, 'x'),
        };

        let section = to_section(&worker, &SectionOptions::default()).unwrap();
        let back: Worker = from_section(section).unwrap();
        assert_eq!(back, worker);
    }

    #[test]
    fn integer_out_of_range_is_an_error() {
        let map: SectionMap = [("low", 300), ("high", 1)].into_iter().collect();
        let mut outer = SectionMap::new();
        outer.insert("Range", map);
        assert!(from_section::<Mode>(Section::Map(outer)).is_err());
    }

    #[test]
    fn enum_from_wrong_shape() {
        let err = from_section::<Mode>(Section::Int(1)).unwrap_err();
        assert_eq!(
            err,
            SectionError::UnexpectedType {
                expected: "string or single-entry map",
                found: "integer",
            }
        );
    }

    #[test]
    fn missing_field_is_reported() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Required {
            value: u8,
        }

        let err = from_section::<Required>(Section::Map(SectionMap::new())).unwrap_err();
        assert!(matches!(err, SectionError::Custom(msg) if msg.contains("value")));
    }
}
