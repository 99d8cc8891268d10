//! Hash states of the containers.
//!
//! - [`KeyHashState`]: `foldhash` with a seed of our own, for string keys
//!   such as type paths, aliases and section keys.
//! - [`TypeIdHashState`]: keeps the bits of a [`TypeId`](core::any::TypeId),
//!   which are already a hash.

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// KeyHashState

const KEY_SEED: FixedState = FixedState::with_seed(0x5D1B_7A0C_93E4_F218);

pub type KeyHasher = FoldHasher<'static>;

/// Deterministic hash state of string keys.
///
/// The same key gives the same hash in every run, so the containers
/// behave identically between runs.
///
/// ```
/// use core::hash::BuildHasher;
/// use tymap_utils::hash::KeyHashState;
///
/// assert_eq!(
///     KeyHashState.hash_one("pkg::model::NetworkConfig"),
///     KeyHashState.hash_one("pkg::model::NetworkConfig"),
/// );
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct KeyHashState;

impl BuildHasher for KeyHashState {
    type Hasher = KeyHasher;

    #[inline(always)]
    fn build_hasher(&self) -> KeyHasher {
        KEY_SEED.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// TypeIdHashState

/// Hasher of [`TypeId`](core::any::TypeId) keys, see [`TypeIdHashState`].
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHasher {
    hash: u64,
}

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }

    #[inline]
    fn write_u128(&mut self, i: u128) {
        self.hash = (i as u64) ^ ((i >> 64) as u64);
    }

    // Not reached by `TypeId`.
    fn write(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(8) {
            let mut word = [0_u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            self.hash = self.hash.rotate_left(29) ^ u64::from_le_bytes(word);
        }
    }
}

/// Hash state of the `TypeId` keyed maps.
///
/// A `TypeId` hashes itself through a single `write_u64`, which is kept as is.
///
/// ```
/// use core::any::TypeId;
/// use core::hash::BuildHasher;
/// use tymap_utils::hash::TypeIdHashState;
///
/// assert_ne!(
///     TypeIdHashState.hash_one(TypeId::of::<u8>()),
///     TypeIdHashState.hash_one(TypeId::of::<u16>()),
/// );
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHashState;

impl BuildHasher for TypeIdHashState {
    type Hasher = TypeIdHasher;

    #[inline(always)]
    fn build_hasher(&self) -> TypeIdHasher {
        TypeIdHasher { hash: 0 }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::hash::{BuildHasher, Hasher};

    use super::{KeyHashState, TypeIdHashState};

    #[test]
    fn key_hashes_depend_on_the_key() {
        assert_ne!(KeyHashState.hash_one("network"), KeyHashState.hash_one("display"));
    }

    #[test]
    fn type_id_hasher_keeps_the_word() {
        let mut hasher = TypeIdHashState.build_hasher();
        hasher.write_u64(0xABCD);
        assert_eq!(hasher.finish(), 0xABCD);

        let mut hasher = TypeIdHashState.build_hasher();
        hasher.write_u128((7_u128 << 64) | 5);
        assert_eq!(hasher.finish(), 7 ^ 5);
    }

    #[test]
    fn type_id_hasher_folds_bytes() {
        let mut a = TypeIdHashState.build_hasher();
        a.write(b"pkg::model");
        let mut b = TypeIdHashState.build_hasher();
        b.write(b"pkg::modem");
        assert_ne!(a.finish(), b.finish());
    }
}
