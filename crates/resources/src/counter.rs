//! Lock-free admission counters
//!
//! A [`ResourceCounter`] answers one question on a per-connection hot path:
//! may one more unit of this resource be held right now? The bounded
//! variant keeps its count in a single atomic word and admits with one
//! `fetch_add`, compensating with a `fetch_sub` when the quota is already
//! spent. There is no mutex, no CAS loop, and no ordering guarantee among
//! competing callers; only the returned `bool` decides admission.

use std::sync::atomic::{AtomicI64, Ordering};

use conngate_errors::{Error, ResourceError};
use conngate_events::{EventEmitter, EventSender, ResourceEvent};

/// A counter that grants and reclaims slots against an optional quota
///
/// Constructed once at startup, then shared by reference for the process
/// lifetime. The counter is deliberately not `Clone`: a copy would fork the
/// accounting and break the `0 <= count <= quota` invariant.
///
/// Every `try_acquire` that returns `true` must be matched by exactly one
/// [`release`](Self::release); [`try_acquire_guard`](Self::try_acquire_guard)
/// ties that pairing to a scope for callers with early-exit paths.
#[derive(Debug)]
pub struct ResourceCounter {
    kind: CounterKind,
    event_sender: Option<EventSender>,
}

#[derive(Debug)]
enum CounterKind {
    /// No quota: every acquire succeeds and release is a no-op
    Unbounded,
    /// Fixed quota enforced through a single atomic word
    Bounded(BoundedState),
}

#[derive(Debug)]
struct BoundedState {
    quota: i64,
    count: AtomicI64,
}

impl BoundedState {
    fn try_acquire(&self) -> bool {
        // fetch_add wraps on overflow, so pathological call volume shows up
        // as a negative `next` and is rejected instead of admitted.
        let next = self.count.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        let admitted = next <= self.quota && next >= 0;
        if !admitted {
            // Losing callers back out their increment. Another caller may
            // observe a transient count above quota in the meantime; nothing
            // acts on raw reads, so no one is falsely admitted.
            self.count.fetch_sub(1, Ordering::AcqRel);
        }
        admitted
    }

    fn release(&self) {
        let remaining = self.count.fetch_sub(1, Ordering::AcqRel).wrapping_sub(1);
        debug_assert!(
            remaining >= 0,
            "resource count is negative: more slots were released than acquired"
        );
    }
}

impl ResourceCounter {
    /// Create a counter with no quota
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            kind: CounterKind::Unbounded,
            event_sender: None,
        }
    }

    /// Create a counter that admits at most `quota` concurrent holders
    ///
    /// A quota of zero is valid and rejects every acquire.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NegativeQuota`] if `quota` is negative.
    pub fn bounded(quota: i64) -> Result<Self, Error> {
        if quota < 0 {
            return Err(ResourceError::NegativeQuota { quota }.into());
        }
        Ok(Self {
            kind: CounterKind::Bounded(BoundedState {
                quota,
                count: AtomicI64::new(0),
            }),
            event_sender: None,
        })
    }

    /// Attach an event sender observing every acquire and release
    ///
    /// Used by tests to synchronize on counter activity. Admission
    /// semantics are unchanged.
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Try to reserve one slot
    ///
    /// Returns `true` and records the slot if the count stays within the
    /// quota; returns `false` with no net state change otherwise. A `false`
    /// is an expected capacity outcome, not an error.
    #[must_use = "a granted slot must be released exactly once"]
    pub fn try_acquire(&self) -> bool {
        let admitted = match &self.kind {
            CounterKind::Unbounded => true,
            CounterKind::Bounded(state) => state.try_acquire(),
        };
        self.emit(ResourceEvent::Acquired { admitted });
        admitted
    }

    /// Return a previously acquired slot
    ///
    /// Must be called exactly once for every `try_acquire` that returned
    /// `true`, on every exit path. Releasing without a matching acquire
    /// corrupts the accounting; debug builds assert on it.
    pub fn release(&self) {
        if let CounterKind::Bounded(state) = &self.kind {
            state.release();
        }
        self.emit(ResourceEvent::Released);
    }

    /// Try to reserve one slot, tying the release to the guard's scope
    ///
    /// Returns `None` when the quota is spent. The slot is returned when
    /// the guard drops, which keeps the pairing correct across early
    /// returns and panics.
    #[must_use = "dropping the guard immediately returns the slot"]
    pub fn try_acquire_guard(&self) -> Option<ResourceGuard<'_>> {
        self.try_acquire().then(|| ResourceGuard { counter: self })
    }

    /// The configured quota, or `None` for an unbounded counter
    #[must_use]
    pub fn quota(&self) -> Option<i64> {
        match &self.kind {
            CounterKind::Unbounded => None,
            CounterKind::Bounded(state) => Some(state.quota),
        }
    }

    /// Current number of held slots
    ///
    /// Diagnostic read only. A concurrent loser's compensation may be in
    /// flight, so the value can transiently exceed the quota; admission
    /// decisions come exclusively from [`try_acquire`](Self::try_acquire).
    #[must_use]
    pub fn current(&self) -> i64 {
        match &self.kind {
            CounterKind::Unbounded => 0,
            CounterKind::Bounded(state) => state.count.load(Ordering::Acquire),
        }
    }

    /// Overwrite the current count to stage edge-case scenarios
    ///
    /// # Panics
    ///
    /// Panics if the counter is unbounded, which has no count to set.
    #[cfg(any(test, feature = "test-util"))]
    pub fn set_count(&self, value: i64) {
        match &self.kind {
            CounterKind::Unbounded => panic!("set_count on an unbounded counter"),
            CounterKind::Bounded(state) => state.count.store(value, Ordering::Release),
        }
    }
}

impl EventEmitter for ResourceCounter {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Slot handle that releases on drop
#[must_use = "dropping the guard immediately returns the slot"]
pub struct ResourceGuard<'a> {
    counter: &'a ResourceCounter,
}

impl Drop for ResourceGuard<'_> {
    fn drop(&mut self) {
        self.counter.release();
    }
}
