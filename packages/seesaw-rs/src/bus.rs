//! Type-erased event bus for broadcasting events.
//!
//! # Guarantees
//!
//! - **At-most-once delivery**: Slow receivers may miss events
//! - **In-memory only**: Events are not persisted
//! - **No replay**: Lagged receivers get `RecvError::Lagged`

use tokio::sync::broadcast;

use crate::core::{CorrelationId, Event, EventEnvelope};

/// Default channel capacity for the event bus.
const DEFAULT_CAPACITY: usize = 10000;

/// Broadcast channel of [`EventEnvelope`]s.
///
/// Cloning the bus shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new event bus with the specified capacity.
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start lagging.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event with a fresh random correlation ID.
    ///
    /// Returns the number of receivers that received the event.
    pub fn emit<E: Event>(&self, event: E) -> usize {
        self.emit_envelope(EventEnvelope::new_random(event))
    }

    /// Emit an event with a specific correlation ID.
    pub fn emit_with_correlation<E: Event>(&self, event: E, cid: CorrelationId) -> usize {
        self.emit_envelope(EventEnvelope::new(cid, event))
    }

    /// Emit an already-built envelope.
    pub fn emit_envelope(&self, envelope: EventEnvelope) -> usize {
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tick {
        value: i32,
    }

    #[derive(Debug, Clone)]
    struct Tock;

    #[tokio::test]
    async fn test_emit_and_receive() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        bus.emit(Tick { value: 42 });

        let envelope = receiver.recv().await.unwrap();
        assert_eq!(envelope.downcast_ref::<Tick>().unwrap().value, 42);
    }

    #[tokio::test]
    async fn test_emit_with_correlation_keeps_cid() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        let cid = CorrelationId::new();
        bus.emit_with_correlation(Tock, cid);

        let envelope = receiver.recv().await.unwrap();
        assert_eq!(envelope.cid, cid);
        assert!(envelope.is::<Tock>());
    }

    #[tokio::test]
    async fn test_emit_returns_receiver_count() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(Tick { value: 1 }), 0);

        let _first = bus.subscribe();
        assert_eq!(bus.emit(Tick { value: 2 }), 1);

        let _second = bus.subscribe();
        assert_eq!(bus.emit(Tick { value: 3 }), 2);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_events() {
        let bus = EventBus::new();
        bus.emit(Tick { value: 1 });

        let mut receiver = bus.subscribe();
        bus.emit(Tick { value: 2 });

        let envelope = receiver.recv().await.unwrap();
        assert_eq!(envelope.downcast_ref::<Tick>().unwrap().value, 2);
    }

    #[tokio::test]
    async fn test_clone_shares_channel() {
        let bus = EventBus::with_capacity(8);
        let other = bus.clone();
        let mut receiver = bus.subscribe();

        other.emit(Tick { value: 55 });

        let envelope = receiver.recv().await.unwrap();
        assert_eq!(envelope.downcast_ref::<Tick>().unwrap().value, 55);
    }
}
