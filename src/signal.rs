//! Synchronous broadcast signals for animation lifecycle events.
//!
//! A [`Signal`] is an ordered list of listener callbacks invoked inline at
//! the point of a state transition. There is no queuing and no asynchrony:
//! `emit` returns once every listener has run on the caller's thread.
//!
//! [`AnimationSignals`] bundles the three channels a sprite exposes —
//! `on_start`, `on_stop`, `on_end` — each delivering the name of the clip
//! that transitioned.
//!
//! # Reentrancy
//!
//! Dispatch holds the listener list borrowed for its whole duration. A
//! listener that calls `connect` or `emit` on the same signal from inside
//! the callback will panic. This is a deliberate simplification; clip state
//! observed from a listener may be mid-transition.

use std::cell::RefCell;
use std::fmt;

/// One named broadcast channel. Listeners run in subscription order.
#[derive(Default)]
pub struct Signal {
    listeners: RefCell<Vec<Box<dyn FnMut(&str)>>>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener. It will be called after all previously connected
    /// listeners on every subsequent `emit`.
    pub fn connect(&self, listener: impl FnMut(&str) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Invoke every listener with `payload`, in subscription order.
    pub fn emit(&self, payload: &str) {
        for listener in self.listeners.borrow_mut().iter_mut() {
            listener(payload);
        }
    }

    /// Number of connected listeners.
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.len())
            .finish()
    }
}

/// The lifecycle channels of one sprite. Every clip registered on the
/// sprite emits through these; the payload is always the clip's name.
#[derive(Debug, Default)]
pub struct AnimationSignals {
    /// A clip left the stopped state via `start`.
    pub on_start: Signal,
    /// A clip was stopped (explicitly or by a clip switch).
    pub on_stop: Signal,
    /// A running clip wrapped past its last frame.
    pub on_end: Signal,
}

impl AnimationSignals {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_delivers_payload() {
        let signal = Signal::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        signal.connect(move |name| sink.borrow_mut().push(name.to_owned()));

        signal.emit("walk");
        signal.emit("idle");

        assert_eq!(*seen.borrow(), vec!["walk".to_owned(), "idle".to_owned()]);
    }

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let signal = Signal::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let sink = Rc::clone(&order);
            signal.connect(move |_| sink.borrow_mut().push(tag));
        }
        signal.emit("x");

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_emit_without_listeners_is_noop() {
        let signal = Signal::new();
        assert!(signal.is_empty());
        signal.emit("nobody");
    }

    #[test]
    fn test_len_counts_listeners() {
        let signal = Signal::new();
        signal.connect(|_| {});
        signal.connect(|_| {});
        assert_eq!(signal.len(), 2);
    }
}
