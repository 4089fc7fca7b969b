//! Core types for the seesaw event layer.
//!
//! # Overview
//!
//! Everything that flows over the bus is an [`Event`]: an immutable record
//! of something that was requested or something that happened. Effects
//! observe events and may answer with follow-up events.
//!
//! # Correlation
//!
//! Every event travels inside an [`EventEnvelope`] tagged with a
//! [`CorrelationId`]. Follow-up events inherit the id of the event that
//! caused them, so a caller can await the whole cascade started by one
//! dispatch.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// An immutable record dispatched on the bus.
///
/// **Note**: This trait is automatically implemented for any type that is
/// `Clone + Send + Sync + 'static`. You don't need to implement it manually.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone)]
/// enum SessionEvent {
///     // Intent
///     OpenRequested { user: String },
///     // Outcome
///     Opened { user: String },
/// }
/// // Event is automatically implemented!
/// ```
pub trait Event: Any + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Event for T {}

/// Correlation ID for tracking related events.
///
/// Use `CorrelationId::NONE` for uncorrelated events, or `CorrelationId::new()`
/// to generate a fresh ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Sentinel value for uncorrelated events (nil UUID).
    pub const NONE: Self = Self(Uuid::nil());

    /// Create a new random correlation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Check if this is the NONE sentinel value.
    pub fn is_none(&self) -> bool {
        self.0.is_nil()
    }

    /// Check if this is a real correlation ID (not NONE).
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Get the inner UUID value.
    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Envelope wrapping an event with transport metadata.
///
/// Domain event enums stay clean; correlation and type information live
/// here so the runtime can route payloads without knowing their types.
#[derive(Clone)]
pub struct EventEnvelope {
    /// Correlation ID for tracking related work
    pub cid: CorrelationId,
    /// Type ID of the payload event
    pub type_id: TypeId,
    /// Type name of the payload event, for logs
    pub type_name: &'static str,
    /// The actual event payload
    pub payload: Arc<dyn Any + Send + Sync>,
}

impl EventEnvelope {
    /// Create a new event envelope.
    pub fn new<E: Event>(cid: CorrelationId, event: E) -> Self {
        Self {
            cid,
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            payload: Arc::new(event),
        }
    }

    /// Create an envelope with a new random correlation ID.
    pub fn new_random<E: Event>(event: E) -> Self {
        Self::new(CorrelationId::new(), event)
    }

    /// Re-tag the envelope with another correlation ID.
    pub(crate) fn with_cid(mut self, cid: CorrelationId) -> Self {
        self.cid = cid;
        self
    }

    /// Returns true if the payload is an `E`.
    pub fn is<E: Event>(&self) -> bool {
        self.type_id == TypeId::of::<E>()
    }

    /// Downcast the payload to a concrete event type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.payload.downcast_ref()
    }

    /// Downcast into a shared handle without cloning the event.
    pub fn downcast<E: Event>(&self) -> Option<Arc<E>> {
        Arc::clone(&self.payload).downcast::<E>().ok()
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("cid", &self.cid)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
