//! Items referenced by the exported macros, not public API.

pub use alloc::boxed::Box;

#[cfg(feature = "auto_register")]
pub use crate::auto_register::AutoRegistration;

#[cfg(feature = "auto_register")]
pub use inventory;
