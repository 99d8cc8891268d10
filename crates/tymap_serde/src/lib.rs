#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod affix;
mod alias;
mod codec;
mod driver;
mod error;
mod factory;

// -----------------------------------------------------------------------------
// Exports

pub use affix::AffixCodec;
pub use alias::{AliasCodec, AliasProvider, AliasTable, ShortNames};
pub use codec::{FailurePolicy, KeyCodec, TypeLoader};
pub use driver::{PolyMapSerializer, SerializedForm};
pub use error::PolyMapError;
pub use factory::{SerializerFactory, TypeSerializer};
