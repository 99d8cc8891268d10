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

mod bound;
mod error;
mod map;
mod meta;
mod path;
mod registry;

#[cfg(feature = "auto_register")]
mod auto_register;

/// Without the `auto_register` feature, submissions are discarded.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! auto_register {
    ($($tt:tt)*) => {};
}

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Exports

pub use bound::{Bound, Upcast};
pub use error::RegistryError;
pub use map::TypeMap;
pub use meta::TypeMeta;
pub use path::{Type, TypePath, split_type_path};
pub use registry::TypeRegistry;

#[cfg(feature = "std")]
pub use registry::TypeRegistryArc;
