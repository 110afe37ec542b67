//! Bookkeeping around first-touch construction: the per-thread stack of
//! in-flight builds (cycle detection) and env-gated construction tracing.

use std::cell::RefCell;
use std::sync::OnceLock;
use std::time::Instant;

use karst_base::{ContentKey, LiteralKind};

thread_local! {
    static IN_FLIGHT: RefCell<Vec<(LiteralKind, ContentKey)>> = const { RefCell::new(Vec::new()) };
}

/// True when this thread is already constructing the given constant.
/// Construction is synchronous local work, so hitting an in-flight pair
/// again means the generator emitted a structured-reference cycle.
pub(crate) fn in_flight(kind: LiteralKind, key: ContentKey) -> bool {
    IN_FLIGHT.with(|stack| stack.borrow().contains(&(kind, key)))
}

/// Marks a constant as in-flight on this thread for the guard's lifetime.
pub(crate) struct MaterializeGuard;

impl MaterializeGuard {
    pub(crate) fn enter(kind: LiteralKind, key: ContentKey) -> Self {
        IN_FLIGHT.with(|stack| stack.borrow_mut().push((kind, key)));
        Self
    }
}

impl Drop for MaterializeGuard {
    fn drop(&mut self) {
        IN_FLIGHT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

fn trace_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("KARST_TRACE_CONSTS").is_ok_and(|v| v == "1"))
}

pub(crate) fn trace_start() -> Option<Instant> {
    trace_enabled().then(Instant::now)
}

pub(crate) fn trace_built(kind: LiteralKind, key: ContentKey, started: Option<Instant>) {
    if let Some(t0) = started {
        eprintln!(
            "[KARST_CONSTS] {:7} {key} {:>8.1}us",
            kind.to_string(),
            t0.elapsed().as_secs_f64() * 1_000_000.0
        );
    }
}
