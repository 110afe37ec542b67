use std::sync::OnceLock;

use karst_base::{fatal, ConstError, ContentKey, LiteralKind};

use crate::sched;
use crate::value::LiteralSpec;

/// The indirection cell between a generated symbol and its constant.
///
/// A slot starts uninitialized and transitions to ready exactly once, on
/// first [`get`](ConstSlot::get), whichever call site touches it first.
/// The transition is race-safe: concurrent first touches agree on a single
/// constructed payload with acquire/release ordering. After that every
/// access is a plain read.
///
/// Slots are leaked at registration, so holders only ever see non-owning
/// `&'static` references; the storage lives until process exit.
pub struct ConstSlot<S: LiteralSpec> {
    key: ContentKey,
    spec: S,
    cell: OnceLock<S::Payload>,
}

impl<S: LiteralSpec> ConstSlot<S> {
    pub(crate) fn new(key: ContentKey, spec: S) -> Self {
        Self {
            key,
            spec,
            cell: OnceLock::new(),
        }
    }

    #[inline]
    pub fn key(&self) -> ContentKey {
        self.key
    }

    #[inline]
    pub fn kind(&self) -> LiteralKind {
        S::KIND
    }

    /// The constant's payload, constructing it first if nobody has yet.
    ///
    /// Aborts if construction fails (the generator emitted malformed data)
    /// or if this thread re-enters a constant it is already constructing
    /// (a structured-reference cycle, which would otherwise deadlock).
    pub fn get(&'static self) -> &'static S::Payload {
        if let Some(value) = self.cell.get() {
            return value;
        }
        // Re-entering the OnceLock from its own initializer would deadlock;
        // fail loudly instead.
        if sched::in_flight(S::KIND, self.key) {
            fatal(ConstError::CyclicRef {
                kind: S::KIND,
                key: self.key,
            });
        }
        self.cell.get_or_init(|| {
            let _guard = sched::MaterializeGuard::enter(S::KIND, self.key);
            let started = sched::trace_start();
            match self.spec.build() {
                Ok(payload) => {
                    sched::trace_built(S::KIND, self.key, started);
                    payload
                }
                Err(err) => fatal(err),
            }
        })
    }

    /// Non-blocking readiness probe.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The payload if already constructed; never triggers construction.
    #[inline]
    pub fn try_get(&self) -> Option<&S::Payload> {
        self.cell.get()
    }

    pub(crate) fn spec(&self) -> &S {
        &self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TextSpec;

    fn leaked_slot(content: &str) -> &'static ConstSlot<TextSpec> {
        let spec = TextSpec::from(content);
        Box::leak(Box::new(ConstSlot::new(spec.content_key(), spec)))
    }

    #[test]
    fn starts_uninitialized_and_becomes_ready_once() {
        let slot = leaked_slot("slot starts uninitialized");
        assert!(!slot.is_ready());
        assert!(slot.try_get().is_none());

        let first = slot.get();
        assert!(slot.is_ready());
        assert_eq!(first.as_str(), Some("slot starts uninitialized"));

        // Second touch is a plain read of the same storage.
        let second = slot.get();
        assert!(std::ptr::eq(first, second));
        assert!(slot.try_get().is_some_and(|v| std::ptr::eq(first, v)));
    }

    #[test]
    fn kind_and_key_survive_construction() {
        let slot = leaked_slot("slot identity");
        let key = slot.key();
        slot.get();
        assert_eq!(slot.key(), key);
        assert_eq!(slot.kind(), LiteralKind::Text);
    }
}
