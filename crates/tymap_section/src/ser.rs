use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::Cell;

use serde_core::ser::{self, Impossible, Serialize};

use crate::{Section, SectionError, SectionMap, SectionOptions};

// -----------------------------------------------------------------------------
// to_section

/// Serializes any `serde` value into a [`Section`].
///
/// See [`SectionSerializer`] for the mapping rules.
///
/// # Examples
///
/// ```
/// use serde::Serialize;
/// use tymap_section::{to_section, Section, SectionOptions};
///
/// #[derive(Serialize)]
/// struct Database {
///     url: String,
///     pool: Option<u32>,
/// }
///
/// let db = Database { url: "sqlite://".into(), pool: None };
///
/// let section = to_section(&db, &SectionOptions::default()).unwrap();
/// assert!(section.get("pool").is_none());
///
/// let options = SectionOptions::new().with_output_nulls(true);
/// let section = to_section(&db, &options).unwrap();
/// assert_eq!(section.get("pool"), Some(&Section::Null));
/// ```
pub fn to_section<T>(value: &T, options: &SectionOptions) -> Result<Section, SectionError>
where
    T: ?Sized + Serialize,
{
    value.serialize(SectionSerializer::new(options))
}

// -----------------------------------------------------------------------------
// SectionSerializer

/// A `serde` serializer producing [`Section`] trees.
///
/// | Rust value                      | Section                           |
/// |---------------------------------|-----------------------------------|
/// | `bool`, integers, floats        | `Bool`, `Int`/`UInt`, `Float`     |
/// | `char`, `str`, `String`         | `String`                          |
/// | `()`, `None`, unit structs      | `Null`                            |
/// | sequences, tuples, bytes        | `Seq`                             |
/// | maps, structs                   | `Map` (field order)               |
/// | unit variant                    | `String(variant)`                 |
/// | other variants                  | `Map { variant: payload }`        |
///
/// Map keys must serialize to strings, booleans or integers.
///
/// Only struct fields holding `None` are left out, see
/// [`SectionOptions::output_nulls`]. Unit fields are always written.
#[derive(Clone, Copy, Debug)]
pub struct SectionSerializer<'a> {
    options: &'a SectionOptions,
    // Set by `serialize_none` while serializing a struct field.
    absent: Option<&'a Cell<bool>>,
}

impl<'a> SectionSerializer<'a> {
    #[inline]
    pub const fn new(options: &'a SectionOptions) -> Self {
        Self {
            options,
            absent: None,
        }
    }

    #[inline]
    fn field<'b>(self, absent: &'b Cell<bool>) -> SectionSerializer<'b>
    where
        'a: 'b,
    {
        SectionSerializer {
            options: self.options,
            absent: Some(absent),
        }
    }

    // Values nested in a field never make the field absent.
    #[inline]
    fn nested(self) -> Self {
        Self {
            options: self.options,
            absent: None,
        }
    }
}

fn single_entry(variant: &'static str, value: Section) -> Section {
    let mut map = SectionMap::with_capacity(1);
    map.insert(variant, value);
    Section::Map(map)
}

impl<'a> ser::Serializer for SectionSerializer<'a> {
    type Ok = Section;
    type Error = SectionError;

    type SerializeSeq = SerializeSeq<'a>;
    type SerializeTuple = SerializeSeq<'a>;
    type SerializeTupleStruct = SerializeSeq<'a>;
    type SerializeTupleVariant = SerializeTupleVariant<'a>;
    type SerializeMap = SerializeMap<'a>;
    type SerializeStruct = SerializeStruct<'a>;
    type SerializeStructVariant = SerializeStructVariant<'a>;

    #[inline]
    fn serialize_bool(self, v: bool) -> Result<Section, SectionError> {
        Ok(Section::Bool(v))
    }

    #[inline]
    fn serialize_i8(self, v: i8) -> Result<Section, SectionError> {
        Ok(Section::Int(v as i64))
    }

    #[inline]
    fn serialize_i16(self, v: i16) -> Result<Section, SectionError> {
        Ok(Section::Int(v as i64))
    }

    #[inline]
    fn serialize_i32(self, v: i32) -> Result<Section, SectionError> {
        Ok(Section::Int(v as i64))
    }

    #[inline]
    fn serialize_i64(self, v: i64) -> Result<Section, SectionError> {
        Ok(Section::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Section, SectionError> {
        if let Ok(v) = i64::try_from(v) {
            Ok(Section::Int(v))
        } else if let Ok(v) = u64::try_from(v) {
            Ok(Section::UInt(v))
        } else {
            Err(SectionError::IntegerOutOfRange(v.to_string()))
        }
    }

    #[inline]
    fn serialize_u8(self, v: u8) -> Result<Section, SectionError> {
        Ok(Section::Int(v as i64))
    }

    #[inline]
    fn serialize_u16(self, v: u16) -> Result<Section, SectionError> {
        Ok(Section::Int(v as i64))
    }

    #[inline]
    fn serialize_u32(self, v: u32) -> Result<Section, SectionError> {
        Ok(Section::Int(v as i64))
    }

    #[inline]
    fn serialize_u64(self, v: u64) -> Result<Section, SectionError> {
        Ok(Section::from_u64(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Section, SectionError> {
        match u64::try_from(v) {
            Ok(v) => Ok(Section::from_u64(v)),
            Err(_) => Err(SectionError::IntegerOutOfRange(v.to_string())),
        }
    }

    #[inline]
    fn serialize_f32(self, v: f32) -> Result<Section, SectionError> {
        Ok(Section::Float(v as f64))
    }

    #[inline]
    fn serialize_f64(self, v: f64) -> Result<Section, SectionError> {
        Ok(Section::Float(v))
    }

    #[inline]
    fn serialize_char(self, v: char) -> Result<Section, SectionError> {
        Ok(Section::String(v.to_string()))
    }

    #[inline]
    fn serialize_str(self, v: &str) -> Result<Section, SectionError> {
        Ok(Section::String(v.into()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Section, SectionError> {
        Ok(Section::Seq(v.iter().map(|b| Section::Int(*b as i64)).collect()))
    }

    #[inline]
    fn serialize_none(self) -> Result<Section, SectionError> {
        if let Some(absent) = self.absent {
            absent.set(true);
        }
        Ok(Section::Null)
    }

    #[inline]
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Section, SectionError> {
        value.serialize(self.nested())
    }

    #[inline]
    fn serialize_unit(self) -> Result<Section, SectionError> {
        Ok(Section::Null)
    }

    #[inline]
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Section, SectionError> {
        Ok(Section::Null)
    }

    #[inline]
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Section, SectionError> {
        Ok(Section::String(variant.into()))
    }

    #[inline]
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Section, SectionError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Section, SectionError> {
        Ok(single_entry(variant, value.serialize(self.nested())?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeSeq<'a>, SectionError> {
        Ok(SerializeSeq {
            ser: self.nested(),
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeSeq<'a>, SectionError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeSeq<'a>, SectionError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant<'a>, SectionError> {
        Ok(SerializeTupleVariant {
            variant,
            inner: self.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap<'a>, SectionError> {
        Ok(SerializeMap {
            ser: self.nested(),
            map: SectionMap::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeStruct<'a>, SectionError> {
        Ok(SerializeStruct {
            ser: self.nested(),
            map: SectionMap::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant<'a>, SectionError> {
        Ok(SerializeStructVariant {
            variant,
            inner: self.serialize_struct(name, len)?,
        })
    }
}

// -----------------------------------------------------------------------------
// Compound serializers

#[doc(hidden)]
pub struct SerializeSeq<'a> {
    ser: SectionSerializer<'a>,
    items: Vec<Section>,
}

impl ser::SerializeSeq for SerializeSeq<'_> {
    type Ok = Section;
    type Error = SectionError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SectionError> {
        self.items.push(value.serialize(self.ser)?);
        Ok(())
    }

    fn end(self) -> Result<Section, SectionError> {
        Ok(Section::Seq(self.items))
    }
}

impl ser::SerializeTuple for SerializeSeq<'_> {
    type Ok = Section;
    type Error = SectionError;

    #[inline]
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SectionError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    #[inline]
    fn end(self) -> Result<Section, SectionError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeSeq<'_> {
    type Ok = Section;
    type Error = SectionError;

    #[inline]
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SectionError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    #[inline]
    fn end(self) -> Result<Section, SectionError> {
        ser::SerializeSeq::end(self)
    }
}

#[doc(hidden)]
pub struct SerializeTupleVariant<'a> {
    variant: &'static str,
    inner: SerializeSeq<'a>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant<'_> {
    type Ok = Section;
    type Error = SectionError;

    #[inline]
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SectionError> {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<Section, SectionError> {
        Ok(single_entry(self.variant, Section::Seq(self.inner.items)))
    }
}

#[doc(hidden)]
pub struct SerializeMap<'a> {
    ser: SectionSerializer<'a>,
    map: SectionMap,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap<'_> {
    type Ok = Section;
    type Error = SectionError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), SectionError> {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SectionError> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| <SectionError as ser::Error>::custom("map value without a key"))?;
        self.map.insert(key, value.serialize(self.ser)?);
        Ok(())
    }

    fn end(self) -> Result<Section, SectionError> {
        Ok(Section::Map(self.map))
    }
}

#[doc(hidden)]
pub struct SerializeStruct<'a> {
    ser: SectionSerializer<'a>,
    map: SectionMap,
}

impl ser::SerializeStruct for SerializeStruct<'_> {
    type Ok = Section;
    type Error = SectionError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SectionError> {
        let absent = Cell::new(false);
        let value = value.serialize(self.ser.field(&absent))?;
        if !absent.get() || self.ser.options.output_nulls {
            self.map.insert(key, value);
        }
        Ok(())
    }

    fn end(self) -> Result<Section, SectionError> {
        Ok(Section::Map(self.map))
    }
}

#[doc(hidden)]
pub struct SerializeStructVariant<'a> {
    variant: &'static str,
    inner: SerializeStruct<'a>,
}

impl ser::SerializeStructVariant for SerializeStructVariant<'_> {
    type Ok = Section;
    type Error = SectionError;

    #[inline]
    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SectionError> {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Section, SectionError> {
        Ok(single_entry(self.variant, Section::Map(self.inner.map)))
    }
}

// -----------------------------------------------------------------------------
// KeySerializer

/// Renders map keys, scalars only.
struct KeySerializer;

macro_rules! key_to_string {
    ($($method:ident: $ty:ty),* $(,)?) => {$(
        #[inline]
        fn $method(self, v: $ty) -> Result<String, SectionError> {
            Ok(v.to_string())
        }
    )*};
}

macro_rules! key_unsupported {
    ($($method:ident => $kind:literal),* $(,)?) => {$(
        fn $method(self) -> Result<String, SectionError> {
            Err(SectionError::KeyMustBeAString($kind))
        }
    )*};
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = SectionError;

    type SerializeSeq = Impossible<String, SectionError>;
    type SerializeTuple = Impossible<String, SectionError>;
    type SerializeTupleStruct = Impossible<String, SectionError>;
    type SerializeTupleVariant = Impossible<String, SectionError>;
    type SerializeMap = Impossible<String, SectionError>;
    type SerializeStruct = Impossible<String, SectionError>;
    type SerializeStructVariant = Impossible<String, SectionError>;

    key_to_string! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_char: char,
        serialize_str: &str,
    }

    key_unsupported! {
        serialize_none => "null",
        serialize_unit => "unit",
    }

    fn serialize_f32(self, _v: f32) -> Result<String, SectionError> {
        Err(SectionError::KeyMustBeAString("float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String, SectionError> {
        Err(SectionError::KeyMustBeAString("float"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, SectionError> {
        Err(SectionError::KeyMustBeAString("bytes"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<String, SectionError> {
        value.serialize(self)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, SectionError> {
        Err(SectionError::KeyMustBeAString("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, SectionError> {
        Ok(variant.into())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, SectionError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, SectionError> {
        Err(SectionError::KeyMustBeAString("enum variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, SectionError> {
        Err(SectionError::KeyMustBeAString("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, SectionError> {
        Err(SectionError::KeyMustBeAString("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, SectionError> {
        Err(SectionError::KeyMustBeAString("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, SectionError> {
        Err(SectionError::KeyMustBeAString("enum variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, SectionError> {
        Err(SectionError::KeyMustBeAString("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, SectionError> {
        Err(SectionError::KeyMustBeAString("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, SectionError> {
        Err(SectionError::KeyMustBeAString("enum variant"))
    }
}

// -----------------------------------------------------------------------------
// Tests
