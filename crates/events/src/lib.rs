#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event channel for observing admission control in conngate
//!
//! Counters can optionally be wired to an unbounded channel so that tests
//! (and diagnostic tooling) can observe every acquire and release as it
//! happens. Production code leaves the sender unset; the counters then pay
//! a single `Option` check and nothing else.

pub mod resource;
pub use resource::ResourceEvent;

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sender attached to counters
pub type EventSender = UnboundedSender<ResourceEvent>;

/// Type alias for the matching event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<ResourceEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented by any type that may carry an `EventSender`. Emission is
/// fire-and-forget: a dropped receiver never affects the emitting side.
pub trait EventEmitter {
    /// Get the event sender for this emitter, if one is attached
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: ResourceEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if the receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        sender: Option<EventSender>,
    }

    impl EventEmitter for Probe {
        fn event_sender(&self) -> Option<&EventSender> {
            self.sender.as_ref()
        }
    }

    #[tokio::test]
    async fn emit_delivers_events_in_order() {
        let (tx, mut rx) = channel();
        let probe = Probe { sender: Some(tx) };

        probe.emit(ResourceEvent::Acquired { admitted: true });
        probe.emit(ResourceEvent::Acquired { admitted: false });
        probe.emit(ResourceEvent::Released);

        assert!(matches!(
            rx.recv().await,
            Some(ResourceEvent::Acquired { admitted: true })
        ));
        assert!(matches!(
            rx.recv().await,
            Some(ResourceEvent::Acquired { admitted: false })
        ));
        assert!(matches!(rx.recv().await, Some(ResourceEvent::Released)));
    }

    #[test]
    fn emit_without_sender_is_a_no_op() {
        let probe = Probe { sender: None };
        probe.emit(ResourceEvent::Released);
    }

    #[test]
    fn emit_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = channel();
        drop(rx);
        let probe = Probe { sender: Some(tx) };
        probe.emit(ResourceEvent::Acquired { admitted: true });
    }
}
