use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use karst_base::{ConstError, ContentKey, LiteralKind};

use crate::table;

// ---------------------------------------------------------------------------
// Blueprint trait
// ---------------------------------------------------------------------------

/// A compile-time description of one literal, as emitted by the generator.
///
/// The canonical byte encoding produced by `content_bytes` is what
/// [`ContentKey::derive`] hashes, so it must be injective within a kind:
/// two specs encode to the same bytes iff they describe the same literal.
pub trait LiteralSpec: Send + Sync + Sized + 'static {
    type Payload: Send + Sync + 'static;

    const KIND: LiteralKind;

    /// Append the canonical content encoding to `buf`.
    fn content_bytes(&self, buf: &mut Vec<u8>);

    /// Materialize the immutable payload, resolving nested references
    /// through the process-wide tables.
    fn build(&self) -> Result<Self::Payload, ConstError>;

    /// Derive the content key for this spec.
    fn content_key(&self) -> ContentKey {
        let mut buf = Vec::new();
        self.content_bytes(&mut buf);
        ContentKey::derive(Self::KIND, &buf)
    }

    /// Whether two specs describe the same literal. Used to reject a key
    /// registered twice with differing content.
    fn same_content(&self, other: &Self) -> bool {
        let mut a = Vec::new();
        let mut b = Vec::new();
        self.content_bytes(&mut a);
        other.content_bytes(&mut b);
        a == b
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Blueprint for a text literal: a flat byte sequence with known length.
/// Source-language strings are byte strings, so no UTF-8 requirement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextSpec {
    bytes: Box<[u8]>,
}

impl TextSpec {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl From<&str> for TextSpec {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl LiteralSpec for TextSpec {
    type Payload = StaticText;

    const KIND: LiteralKind = LiteralKind::Text;

    fn content_bytes(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.bytes);
    }

    fn build(&self) -> Result<StaticText, ConstError> {
        Ok(StaticText {
            bytes: self.bytes.clone(),
        })
    }
}

/// A materialized text constant. Immutable for the life of the process.
#[derive(Debug, PartialEq, Eq)]
pub struct StaticText {
    bytes: Box<[u8]>,
}

impl StaticText {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The text as UTF-8, when it happens to be valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

impl fmt::Display for StaticText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// Entry key of an array literal. Source arrays are ordered maps keyed by
/// integer or string; positional arrays use `Int(0..n)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ArrayKey {
    Int(i64),
    Text(Box<str>),
}

impl ArrayKey {
    fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            ArrayKey::Int(v) => {
                buf.push(0);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            ArrayKey::Text(s) => {
                buf.push(1);
                buf.extend_from_slice(&(s.len() as u64).to_le_bytes());
                buf.extend_from_slice(s.as_bytes());
            }
        }
    }
}

impl From<i64> for ArrayKey {
    fn from(v: i64) -> Self {
        ArrayKey::Int(v)
    }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        ArrayKey::Text(s.into())
    }
}

/// Blueprint for an array literal: ordered entries whose values reference
/// other constants by key, so nested literals share sub-values.
#[derive(Clone, Debug, Serialize)]
pub struct ArraySpec {
    entries: Vec<(ArrayKey, VariantSpec)>,
}

impl ArraySpec {
    pub fn new(entries: Vec<(ArrayKey, VariantSpec)>) -> Self {
        Self { entries }
    }

    /// A purely positional array: entries keyed `0..n` in order.
    pub fn positional(values: Vec<VariantSpec>) -> Self {
        Self {
            entries: values
                .into_iter()
                .enumerate()
                .map(|(idx, value)| (ArrayKey::Int(idx as i64), value))
                .collect(),
        }
    }
}

impl LiteralSpec for ArraySpec {
    type Payload = StaticArray;

    const KIND: LiteralKind = LiteralKind::Array;

    fn content_bytes(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.entries.len() as u64).to_le_bytes());
        for (key, value) in &self.entries {
            key.encode(buf);
            value.encode(buf);
        }
    }

    fn build(&self) -> Result<StaticArray, ConstError> {
        let mut entries = Vec::with_capacity(self.entries.len());
        let mut index = FxHashMap::default();
        for (key, spec) in &self.entries {
            let value = spec.resolve()?;
            index.insert(key.clone(), entries.len());
            entries.push((key.clone(), value));
        }
        Ok(StaticArray { entries, index })
    }
}

/// A materialized array constant: ordered entries plus a by-key index.
/// Element values borrow other slots' payloads, so shared sub-values are
/// stored once process-wide.
#[derive(Debug)]
pub struct StaticArray {
    entries: Vec<(ArrayKey, ConstVariant)>,
    index: FxHashMap<ArrayKey, usize>,
}

impl StaticArray {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&ConstVariant> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    /// Entry at the given position in declaration order.
    pub fn at(&self, pos: usize) -> Option<(&ArrayKey, &ConstVariant)> {
        self.entries.get(pos).map(|(k, v)| (k, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &ConstVariant)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl PartialEq for StaticArray {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Blueprint for a boxed scalar literal: a tagged union over the primitive
/// scalars plus references to text and array constants.
#[derive(Clone, Copy, Debug, Serialize)]
pub enum VariantSpec {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(ContentKey),
    Array(ContentKey),
}

impl VariantSpec {
    fn encode(&self, buf: &mut Vec<u8>) {
        match *self {
            VariantSpec::Null => buf.push(0),
            VariantSpec::Bool(v) => {
                buf.push(1);
                buf.push(v as u8);
            }
            VariantSpec::Int(v) => {
                buf.push(2);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            // Floats hash by bit pattern so key derivation stays
            // deterministic across NaN payloads and signed zero.
            VariantSpec::Float(v) => {
                buf.push(3);
                buf.extend_from_slice(&v.to_bits().to_le_bytes());
            }
            VariantSpec::Text(key) => {
                buf.push(4);
                buf.extend_from_slice(&key.as_u64().to_le_bytes());
            }
            VariantSpec::Array(key) => {
                buf.push(5);
                buf.extend_from_slice(&key.as_u64().to_le_bytes());
            }
        }
    }

    /// Resolve to a materialized value, forcing referenced constants.
    pub(crate) fn resolve(&self) -> Result<ConstVariant, ConstError> {
        Ok(match *self {
            VariantSpec::Null => ConstVariant::Null,
            VariantSpec::Bool(v) => ConstVariant::Bool(v),
            VariantSpec::Int(v) => ConstVariant::Int(v),
            VariantSpec::Float(v) => ConstVariant::Float(v),
            VariantSpec::Text(key) => {
                let slot = table::strings().try_lookup(key).ok_or(
                    ConstError::UnresolvedRef {
                        kind: LiteralKind::Text,
                        key,
                    },
                )?;
                ConstVariant::Text(slot.get())
            }
            VariantSpec::Array(key) => {
                let slot = table::arrays().try_lookup(key).ok_or(
                    ConstError::UnresolvedRef {
                        kind: LiteralKind::Array,
                        key,
                    },
                )?;
                ConstVariant::Array(slot.get())
            }
        })
    }
}

impl PartialEq for VariantSpec {
    fn eq(&self, other: &Self) -> bool {
        let mut a = Vec::new();
        let mut b = Vec::new();
        self.encode(&mut a);
        other.encode(&mut b);
        a == b
    }
}

impl Eq for VariantSpec {}

impl LiteralSpec for VariantSpec {
    type Payload = ConstVariant;

    const KIND: LiteralKind = LiteralKind::Variant;

    fn content_bytes(&self, buf: &mut Vec<u8>) {
        self.encode(buf);
    }

    fn build(&self) -> Result<ConstVariant, ConstError> {
        self.resolve()
    }
}

/// A materialized boxed scalar. Text and array cases borrow the referenced
/// constant's payload rather than owning a copy.
#[derive(Clone, Copy, Debug)]
pub enum ConstVariant {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(&'static StaticText),
    Array(&'static StaticArray),
}

impl ConstVariant {
    pub fn is_null(&self) -> bool {
        matches!(self, ConstVariant::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstVariant::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstVariant::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConstVariant::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&'static StaticText> {
        match self {
            ConstVariant::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&'static StaticArray> {
        match self {
            ConstVariant::Array(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for ConstVariant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstVariant::Null, ConstVariant::Null) => true,
            (ConstVariant::Bool(a), ConstVariant::Bool(b)) => a == b,
            (ConstVariant::Int(a), ConstVariant::Int(b)) => a == b,
            (ConstVariant::Float(a), ConstVariant::Float(b)) => a.to_bits() == b.to_bits(),
            (ConstVariant::Text(a), ConstVariant::Text(b)) => a == b,
            (ConstVariant::Array(a), ConstVariant::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ConstVariant {}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<S: LiteralSpec>(spec: &S) -> Vec<u8> {
        let mut buf = Vec::new();
        spec.content_bytes(&mut buf);
        buf
    }

    #[test]
    fn text_spec_round_trips_bytes() {
        let spec = TextSpec::from("example");
        let text = spec.build().expect("text build cannot fail");
        assert_eq!(text.as_bytes(), b"example");
        assert_eq!(text.as_str(), Some("example"));
        assert_eq!(text.len(), 7);
    }

    #[test]
    fn non_utf8_text_is_preserved() {
        let spec = TextSpec::new(vec![0xff, 0xfe, b'a']);
        let text = spec.build().expect("text build cannot fail");
        assert_eq!(text.as_bytes(), &[0xff, 0xfe, b'a']);
        assert_eq!(text.as_str(), None);
    }

    #[test]
    fn positional_array_keys_count_from_zero() {
        let spec = ArraySpec::positional(vec![VariantSpec::Int(10), VariantSpec::Int(20)]);
        let with_keys = ArraySpec::new(vec![
            (ArrayKey::Int(0), VariantSpec::Int(10)),
            (ArrayKey::Int(1), VariantSpec::Int(20)),
        ]);
        assert!(spec.same_content(&with_keys));
    }

    #[test]
    fn array_entry_order_is_part_of_content() {
        let ab = ArraySpec::new(vec![
            (ArrayKey::from("a"), VariantSpec::Int(1)),
            (ArrayKey::from("b"), VariantSpec::Int(2)),
        ]);
        let ba = ArraySpec::new(vec![
            (ArrayKey::from("b"), VariantSpec::Int(2)),
            (ArrayKey::from("a"), VariantSpec::Int(1)),
        ]);
        assert!(!ab.same_content(&ba));
        assert_ne!(ab.content_key(), ba.content_key());
    }

    #[test]
    fn variant_encoding_separates_tags() {
        // i64 0, f64 0.0 and false all have all-zero payload bytes; the
        // tag byte must keep them apart.
        let specs = [
            VariantSpec::Null,
            VariantSpec::Bool(false),
            VariantSpec::Int(0),
            VariantSpec::Float(0.0),
        ];
        for (i, a) in specs.iter().enumerate() {
            for (j, b) in specs.iter().enumerate() {
                assert_eq!(encoded(a) == encoded(b), i == j, "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn float_content_is_bitwise() {
        assert_ne!(
            VariantSpec::Float(0.0).content_key(),
            VariantSpec::Float(-0.0).content_key()
        );
        assert_eq!(
            VariantSpec::Float(f64::NAN).content_key(),
            VariantSpec::Float(f64::NAN).content_key()
        );
    }

    #[test]
    fn content_key_matches_manual_derivation() {
        let spec = TextSpec::from("example");
        assert_eq!(
            spec.content_key(),
            ContentKey::derive(LiteralKind::Text, b"example")
        );
    }
}
