use std::sync::OnceLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use karst_base::{fatal, ConstError, ContentKey, LiteralKind};

use crate::slot::ConstSlot;
use crate::value::{ArraySpec, LiteralSpec, TextSpec, VariantSpec};

// ---------------------------------------------------------------------------
// Per-kind registry
// ---------------------------------------------------------------------------

/// A process-wide registry mapping content keys to proxy slots for one
/// literal kind. Key-to-slot bindings are append-only and never remapped.
///
/// One monomorphized table per kind keeps `get()` free of dynamic dispatch;
/// the three kinds have different payload layouts and construction costs.
pub struct ConstTable<S: LiteralSpec> {
    slots: RwLock<FxHashMap<ContentKey, &'static ConstSlot<S>>>,
}

impl<S: LiteralSpec> ConstTable<S> {
    pub(crate) fn new() -> Self {
        Self {
            slots: RwLock::new(FxHashMap::default()),
        }
    }

    /// Bind `key` to a slot for `spec`, or return the existing slot.
    ///
    /// Generated startup code calls this once per literal per translation
    /// unit, so duplicates are expected and collapse to the first slot.
    /// A duplicate carrying different content means key derivation upstream
    /// is broken, and aborts.
    pub fn register(&self, key: ContentKey, spec: S) -> &'static ConstSlot<S> {
        // Fast path: already registered under a read lock.
        {
            let slots = self.slots.read();
            if let Some(&slot) = slots.get(&key) {
                return Self::verify(slot, &spec);
            }
        }
        let mut slots = self.slots.write();
        // Double-check after acquiring the write lock.
        if let Some(&slot) = slots.get(&key) {
            return Self::verify(slot, &spec);
        }
        let slot: &'static ConstSlot<S> = Box::leak(Box::new(ConstSlot::new(key, spec)));
        slots.insert(key, slot);
        slot
    }

    fn verify(slot: &'static ConstSlot<S>, spec: &S) -> &'static ConstSlot<S> {
        if !slot.spec().same_content(spec) {
            fatal(ConstError::KeyCollision {
                kind: S::KIND,
                key: slot.key(),
            });
        }
        slot
    }

    /// Register `spec` under its content-derived key. Identical content
    /// always lands on the same slot.
    pub fn intern(&self, spec: S) -> &'static ConstSlot<S> {
        self.register(spec.content_key(), spec)
    }

    /// The slot for `key`. Generated code only looks up keys its own unit
    /// registered, so a miss is a generation defect and aborts.
    pub fn lookup(&self, key: ContentKey) -> &'static ConstSlot<S> {
        match self.try_lookup(key) {
            Some(slot) => slot,
            None => fatal(ConstError::UnresolvedRef { kind: S::KIND, key }),
        }
    }

    pub fn try_lookup(&self, key: ContentKey) -> Option<&'static ConstSlot<S>> {
        self.slots.read().get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Whether `key` is registered and its payload constructed.
    pub fn is_ready(&self, key: ContentKey) -> bool {
        self.try_lookup(key).is_some_and(|slot| slot.is_ready())
    }

    /// Number of slots whose payload has been constructed.
    pub fn ready_count(&self) -> usize {
        self.slots.read().values().filter(|s| s.is_ready()).count()
    }

    pub(crate) fn slots_sorted(&self) -> Vec<(ContentKey, &'static ConstSlot<S>)> {
        let mut out: Vec<_> = self.slots.read().iter().map(|(&k, &s)| (k, s)).collect();
        out.sort_by_key(|(k, _)| *k);
        out
    }
}

// ---------------------------------------------------------------------------
// Process-wide singletons
// ---------------------------------------------------------------------------

pub type StringTable = ConstTable<TextSpec>;
pub type ArrayTable = ConstTable<ArraySpec>;
pub type VariantTable = ConstTable<VariantSpec>;

static STRINGS: OnceLock<StringTable> = OnceLock::new();
static ARRAYS: OnceLock<ArrayTable> = OnceLock::new();
static VARIANTS: OnceLock<VariantTable> = OnceLock::new();

/// The process-wide text constant table.
pub fn strings() -> &'static StringTable {
    STRINGS.get_or_init(ConstTable::new)
}

/// The process-wide array constant table.
pub fn arrays() -> &'static ArrayTable {
    ARRAYS.get_or_init(ConstTable::new)
}

/// The process-wide boxed-scalar constant table.
pub fn variants() -> &'static VariantTable {
    VARIANTS.get_or_init(ConstTable::new)
}
