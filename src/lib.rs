#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use tymap_registry as registry;
pub use tymap_section as section;
pub use tymap_serde as serde;
pub use tymap_utils as utils;
