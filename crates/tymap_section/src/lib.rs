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

mod de;
mod error;
mod map;
mod options;
mod section;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use de::from_section;
pub use error::SectionError;
pub use map::SectionMap;
pub use options::SectionOptions;
pub use section::Section;
pub use ser::{SectionSerializer, to_section};
