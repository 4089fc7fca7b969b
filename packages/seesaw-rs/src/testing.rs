//! Testing utilities for seesaw engines.
//!
//! # Feature Flag
//!
//! This module is only available with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! seesaw = { path = "../seesaw-rs", features = ["testing"] }
//! ```
//!
//! # Recording Events
//!
//! ```ignore
//! use seesaw::testing::EventRecorder;
//!
//! let handle = engine.start();
//! let recorder = EventRecorder::attach(handle.bus());
//!
//! handle.emit_and_await(SessionEvent::OpenRequested { user }).await?;
//!
//! assert_eq!(recorder.count_of::<SessionEvent>(), 2);
//! ```
//!
//! The recorder subscribes when attached and drains its receiver
//! synchronously on every query. Anything emitted before `emit_and_await`
//! returned is visible without sleeping.

use std::sync::Mutex;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::bus::EventBus;
use crate::core::{Event, EventEnvelope};

/// Records every envelope dispatched on a bus after it was attached.
pub struct EventRecorder {
    receiver: Mutex<broadcast::Receiver<EventEnvelope>>,
    seen: Mutex<Vec<EventEnvelope>>,
}

impl EventRecorder {
    pub fn attach(bus: &EventBus) -> Self {
        Self {
            receiver: Mutex::new(bus.subscribe()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) {
        let mut receiver = self.receiver.lock().unwrap();
        let mut seen = self.seen.lock().unwrap();
        loop {
            match receiver.try_recv() {
                Ok(envelope) => seen.push(envelope),
                Err(TryRecvError::Lagged(n)) => {
                    panic!("EventRecorder lagged behind by {} events", n)
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    /// All envelopes seen so far, in dispatch order.
    pub fn envelopes(&self) -> Vec<EventEnvelope> {
        self.drain();
        self.seen.lock().unwrap().clone()
    }

    /// Type names of all events seen so far, in dispatch order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.envelopes().iter().map(|e| e.type_name).collect()
    }

    /// Clones of every event of type `E`, in dispatch order.
    pub fn events_of<E: Event + Clone>(&self) -> Vec<E> {
        self.envelopes()
            .iter()
            .filter_map(|e| e.downcast_ref::<E>().cloned())
            .collect()
    }

    pub fn count_of<E: Event + Clone>(&self) -> usize {
        self.events_of::<E>().len()
    }

    /// Returns true if any event of type `E` matches the predicate.
    pub fn any<E, F>(&self, predicate: F) -> bool
    where
        E: Event + Clone,
        F: Fn(&E) -> bool,
    {
        self.events_of::<E>().iter().any(predicate)
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.drain();
        self.seen.lock().unwrap().clear();
    }
}

impl std::fmt::Debug for EventRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRecorder")
            .field("type_names", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note(&'static str);

    #[derive(Debug, Clone)]
    struct Other;

    #[test]
    fn records_in_order_and_filters_by_type() {
        let bus = EventBus::new();
        let recorder = EventRecorder::attach(&bus);

        bus.emit(Note("a"));
        bus.emit(Other);
        bus.emit(Note("b"));

        assert_eq!(recorder.events_of::<Note>(), vec![Note("a"), Note("b")]);
        assert_eq!(recorder.count_of::<Other>(), 1);
        assert!(recorder.any::<Note, _>(|n| n.0 == "b"));
        assert_eq!(recorder.envelopes().len(), 3);
    }

    #[test]
    fn clear_forgets_seen_events() {
        let bus = EventBus::new();
        let recorder = EventRecorder::attach(&bus);

        bus.emit(Note("a"));
        recorder.clear();
        bus.emit(Note("b"));

        assert_eq!(recorder.events_of::<Note>(), vec![Note("b")]);
    }
}
