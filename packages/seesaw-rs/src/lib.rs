//! # Seesaw
//!
//! An in-memory, event-driven effect layer: events flow over a bus, effects
//! react to them and dispatch follow-up events.
//!
//! ## Architecture
//!
//! ```text
//! Edge (UI / CLI)
//!     │
//!     ▼ handle.emit()
//! EventBus ◄──────────────────────────────┐
//!     │                                   │
//!     ▼                                   │
//! Runtime loop                            │
//!     │                                   │
//!     ├─► effect A (own task) ─► Emit ────┤
//!     │                                   │
//!     └─► effect B (own task) ─► Emit ────┘
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Events are records** - Immutable, cloned or shared, never mutated
//! 2. **Effects are stateless** - Events carry all needed data, deps carry IO
//! 3. **Effects run independently** - One task per (event, effect), no
//!    deduplication or serialization between them
//! 4. **Errors stay local** - A failing effect is logged and reported to
//!    awaiting callers; the runtime keeps going
//! 5. **At-most-once delivery** - In-memory bus, no persistence, no replay
//!
//! ## Example
//!
//! ```ignore
//! use seesaw::{effect, EffectContext, EngineBuilder, Emit};
//!
//! #[derive(Debug, Clone)]
//! enum SessionEvent {
//!     OpenRequested { user: String },
//!     Opened { user: String },
//! }
//!
//! let open = effect::on::<SessionEvent>().id("open").then(
//!     |event, ctx: EffectContext<Deps>| async move {
//!         let SessionEvent::OpenRequested { user } = event.as_ref() else {
//!             return Ok(Emit::none());
//!         };
//!         ctx.deps().sessions.open(user).await?;
//!         Ok(Emit::event(SessionEvent::Opened { user: user.clone() }))
//!     },
//! );
//!
//! let handle = EngineBuilder::new(deps).with_effect(open).build().start();
//! handle.emit_and_await(SessionEvent::OpenRequested { user: "ada".into() }).await?;
//! ```

mod bus;
mod core;
mod engine;
mod error;
mod runtime;

pub mod effect;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::core::{CorrelationId, Event, EventEnvelope};

pub use crate::error::SeesawError;

pub use effect::{Effect, EffectContext, Emit};

pub use bus::EventBus;

pub use runtime::Runtime;

pub use engine::{
    Engine, EngineBuilder, EngineHandle, InflightGuard, InflightTracker, WaiterGuard,
    DEFAULT_AWAIT_TIMEOUT,
};
