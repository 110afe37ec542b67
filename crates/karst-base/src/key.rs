use std::fmt;

use sha2::{Digest, Sha256};

use crate::LiteralKind;

/// A compact, `Copy`-able identity for one compile-time literal.
///
/// Two literals with identical kind and content bytes map to the same
/// `ContentKey`, which is what deduplication and symbol naming hang off.
/// Derivation is a pure function of `(kind, bytes)`; the compiler emitting
/// the tables is trusted to keep keys collision-free within one unit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey(u64);

impl ContentKey {
    /// Derive the key for a literal from its kind and canonical content
    /// bytes. Deterministic: same inputs always yield the same key.
    pub fn derive(kind: LiteralKind, bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([kind.tag()]);
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(raw))
    }

    /// Wrap a key the generator already computed at compile time.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The linker-visible name the generator emits for this constant's
    /// proxy, e.g. `s_ss6c63e9f2` styled names widened to 64 bits.
    pub fn symbol(self, kind: LiteralKind) -> String {
        format!("s_{}{:016x}", kind.symbol_prefix(), self.0)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({:016x})", self.0)
    }
}

impl serde::Serialize for ContentKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
