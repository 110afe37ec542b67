use std::fmt;

use serde::Serialize;

/// The three families of compile-time literal the generator materializes.
///
/// Each kind has its own registry because the construction cost and memory
/// layout differ: text is flat bytes, arrays recursively reference other
/// constants, and variants are a tagged union over the rest plus primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralKind {
    Text,
    Array,
    Variant,
}

impl LiteralKind {
    /// Tag byte mixed into content hashing so identical bytes of two
    /// different kinds never share a key.
    pub const fn tag(self) -> u8 {
        match self {
            LiteralKind::Text => 1,
            LiteralKind::Array => 2,
            LiteralKind::Variant => 3,
        }
    }

    /// Short prefix embedded in the symbol names the generator emits.
    pub const fn symbol_prefix(self) -> &'static str {
        match self {
            LiteralKind::Text => "ss",
            LiteralKind::Array => "sa",
            LiteralKind::Variant => "sv",
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LiteralKind::Text => "text",
            LiteralKind::Array => "array",
            LiteralKind::Variant => "variant",
        })
    }
}
