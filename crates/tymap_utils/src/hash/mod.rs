//! Provide hash containers, re-exports *hashbrown* and *foldhash*.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{KeyHashState, KeyHasher};
pub use hasher::{TypeIdHashState, TypeIdHasher};

/// A [`hashbrown::HashMap`] using [`KeyHashState`] by default.
///
/// Create it with `HashMap::default()`, the `new` constructor of
/// `hashbrown` is only available for its own default hasher.
pub type HashMap<K, V, S = KeyHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`KeyHashState`] by default.
pub type HashSet<T, S = KeyHashState> = hashbrown::HashSet<T, S>;

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;
