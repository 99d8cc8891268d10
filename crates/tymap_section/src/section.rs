use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde_core::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_core::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::SectionMap;

// -----------------------------------------------------------------------------
// Section

/// A node of the serialized document tree.
///
/// Integers are normalized: every value that fits in an `i64` is stored as
/// [`Section::Int`], only larger unsigned values use [`Section::UInt`].
/// This keeps trees equal after a pass through self-describing formats.
///
/// # Examples
///
/// ```
/// use tymap_section::{Section, SectionMap};
///
/// let mut map = SectionMap::new();
/// map.insert("port", 8080_u16);
/// map.insert("hosts", vec![Section::from("a"), Section::from("b")]);
///
/// let section = Section::Map(map);
/// assert_eq!(section.get("port").and_then(Section::as_i64), Some(8080));
/// assert_eq!(section.kind(), "map");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Section {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Seq(Vec<Section>),
    Map(SectionMap),
}

impl Section {
    /// A short, human readable name of the node kind, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Section::Null => "null",
            Section::Bool(_) => "boolean",
            Section::Int(_) | Section::UInt(_) => "integer",
            Section::Float(_) => "float",
            Section::String(_) => "string",
            Section::Seq(_) => "sequence",
            Section::Map(_) => "map",
        }
    }

    /// Normalized integer constructor, see [`Section`].
    #[inline]
    pub const fn from_u64(value: u64) -> Self {
        if value <= i64::MAX as u64 {
            Section::Int(value as i64)
        } else {
            Section::UInt(value)
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Section::Null)
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Section::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub const fn as_i64(&self) -> Option<i64> {
        match *self {
            Section::Int(i) => Some(i),
            Section::UInt(u) if u <= i64::MAX as u64 => Some(u as i64),
            _ => None,
        }
    }

    pub const fn as_u64(&self) -> Option<u64> {
        match *self {
            Section::Int(i) if i >= 0 => Some(i as u64),
            Section::UInt(u) => Some(u),
            _ => None,
        }
    }

    pub const fn as_f64(&self) -> Option<f64> {
        match *self {
            Section::Float(f) => Some(f),
            Section::Int(i) => Some(i as f64),
            Section::UInt(u) => Some(u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Section::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Section]> {
        match self {
            Section::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&SectionMap> {
        match self {
            Section::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut SectionMap> {
        match self {
            Section::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` if this node is a map.
    pub fn get(&self, key: &str) -> Option<&Section> {
        self.as_map().and_then(|map| map.get(key))
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Section {
            #[inline]
            fn from(value: $ty) -> Self {
                Section::Int(value as i64)
            }
        }
    )*};
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Section {
            #[inline]
            fn from(value: $ty) -> Self {
                Section::from_u64(value as u64)
            }
        }
    )*};
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Section {
    #[inline]
    fn from(value: bool) -> Self {
        Section::Bool(value)
    }
}

impl From<f32> for Section {
    #[inline]
    fn from(value: f32) -> Self {
        Section::Float(value as f64)
    }
}

impl From<f64> for Section {
    #[inline]
    fn from(value: f64) -> Self {
        Section::Float(value)
    }
}

impl From<&str> for Section {
    #[inline]
    fn from(value: &str) -> Self {
        Section::String(value.into())
    }
}

impl From<String> for Section {
    #[inline]
    fn from(value: String) -> Self {
        Section::String(value)
    }
}

impl From<Vec<Section>> for Section {
    #[inline]
    fn from(value: Vec<Section>) -> Self {
        Section::Seq(value)
    }
}

impl From<SectionMap> for Section {
    #[inline]
    fn from(value: SectionMap) -> Self {
        Section::Map(value)
    }
}

impl<T: Into<Section>> From<Option<T>> for Section {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Section::Null,
        }
    }
}

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Section::Null => serializer.serialize_unit(),
            Section::Bool(b) => serializer.serialize_bool(*b),
            Section::Int(i) => serializer.serialize_i64(*i),
            Section::UInt(u) => serializer.serialize_u64(*u),
            Section::Float(f) => serializer.serialize_f64(*f),
            Section::String(s) => serializer.serialize_str(s),
            Section::Seq(seq) => {
                let mut state = serializer.serialize_seq(Some(seq.len()))?;
                for item in seq {
                    state.serialize_element(item)?;
                }
                state.end()
            }
            Section::Map(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Deserialize

struct SectionVisitor;

impl<'de> Visitor<'de> for SectionVisitor {
    type Value = Section;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any section value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Section, E> {
        Ok(Section::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Section, E> {
        Ok(Section::Int(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Section, E> {
        Ok(Section::from_u64(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Section, E> {
        Ok(Section::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Section, E> {
        Ok(Section::String(v.into()))
    }

    fn visit_string<E>(self, v: String) -> Result<Section, E> {
        Ok(Section::String(v))
    }

    fn visit_unit<E>(self) -> Result<Section, E> {
        Ok(Section::Null)
    }

    fn visit_none<E>(self) -> Result<Section, E> {
        Ok(Section::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Section, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Section, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Section, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1024));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Section::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Section, A::Error> {
        let mut map = SectionMap::with_capacity(access.size_hint().unwrap_or(0).min(1024));
        while let Some((key, value)) = access.next_entry::<String, Section>()? {
            map.insert(key, value);
        }
        Ok(Section::Map(map))
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SectionVisitor)
    }
}

// -----------------------------------------------------------------------------
// Tests
