//! Stable element identifiers.
//!
//! Node handles are positions in one frame's arena and mean nothing in the
//! next frame. `ElementId` is the identity that survives across frames: it keys
//! scroll positions, floating targets and queries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// FNV-1a prime for hash mixing.
const FNV_PRIME: u64 = 0x100000001b3;
/// FNV-1a offset basis.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;

/// Raw value of [`ElementId::ROOT`]. Hashed ids never take it.
const ROOT_RAW: u64 = 0;

#[inline]
const fn non_root(hash: u64) -> u64 {
    if hash == ROOT_RAW { FNV_PRIME } else { hash }
}

#[inline]
fn fnv1a(bytes: &[u8], seed: u64) -> u64 {
    let mut hash = seed;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Identifier for an element, stable across frames for identical trees.
///
/// Named ids are a pure function of their label, so the same label produces
/// the same id on every run and every thread. Anonymous elements derive their
/// id from their parent's id and sibling index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Id of the root element of every frame.
    pub const ROOT: Self = Self(ROOT_RAW);

    /// Create a stable id from a label.
    pub fn named(label: &str) -> Self {
        Self(non_root(fnv1a(label.as_bytes(), FNV_OFFSET)))
    }

    /// Create a stable id from a label and an index, for list items that share a label.
    pub fn indexed(label: &str, index: u32) -> Self {
        let base = fnv1a(label.as_bytes(), FNV_OFFSET);
        Self(non_root(fnv1a(&index.to_le_bytes(), base)))
    }

    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Derive a deterministic child id from this parent.
    ///
    /// Rotate + XOR with the golden ratio constant (as in FxHash/SplitMix64).
    pub const fn child(&self, discriminator: u64) -> Self {
        const PHI: u64 = 0x9E3779B97F4A7C15;
        let mixed = self.0.rotate_left(21) ^ discriminator.wrapping_add(1).wrapping_mul(PHI);
        Self(non_root(mixed))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(label: &str) -> Self {
        Self::named(label)
    }
}
