//! Seesaw Engine - wires effects, dependencies and the bus together.
//!
//! ```text
//! emit(event) ──► EventBus ──► Runtime ──► Effect tasks
//!                    ▲                          │
//!                    └──── follow-up events ────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let handle = EngineBuilder::new(deps)
//!     .with_effects(session_effects())
//!     .build()
//!     .start();
//!
//! // Fire-and-forget
//! handle.emit(SessionEvent::OpenRequested { user });
//!
//! // Or wait for the whole cascade
//! handle.emit_and_await(SessionEvent::OpenRequested { user }).await?;
//! ```
//!
//! # Correlation and Await
//!
//! Every emit gets a correlation ID. The inflight tracker counts pending
//! work per ID: an event counts until the runtime has spawned its effects,
//! and each effect counts until its follow-up events are on the bus.
//! The count for an ID reaches zero exactly when its cascade is finished.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use dashmap::DashMap;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bus::EventBus;
use crate::core::{CorrelationId, Event};
use crate::effect::Effect;
use crate::error::SeesawError;
use crate::runtime::Runtime;

/// Default bound for [`EngineHandle::emit_and_await`].
pub const DEFAULT_AWAIT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Inflight Tracking
// =============================================================================

struct InflightEntry {
    count: AtomicUsize,
    waiters: AtomicUsize,
    notify: Notify,
    first_error: Mutex<Option<anyhow::Error>>,
}

impl InflightEntry {
    fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            waiters: AtomicUsize::new(0),
            notify: Notify::new(),
            first_error: Mutex::new(None),
        }
    }

    fn has_error(&self) -> bool {
        // Poisoned = treat as error so it is not dropped silently
        self.first_error
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(true)
    }

    fn take_error(&self) -> Option<anyhow::Error> {
        match self.first_error.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

/// Marks a task as waiting on a correlation so its error entry is kept.
pub struct WaiterGuard {
    entry: Arc<InflightEntry>,
}

impl WaiterGuard {
    fn new(entry: Arc<InflightEntry>) -> Self {
        entry.waiters.fetch_add(1, Ordering::AcqRel);
        Self { entry }
    }
}

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        self.entry.waiters.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Tracks inflight work per correlation ID.
#[derive(Default)]
pub struct InflightTracker {
    entries: DashMap<CorrelationId, Arc<InflightEntry>>,
}

impl InflightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create(&self, cid: CorrelationId) -> Arc<InflightEntry> {
        self.entries
            .entry(cid)
            .or_insert_with(|| Arc::new(InflightEntry::new()))
            .clone()
    }

    /// Increment the pending count for a correlation ID.
    pub fn inc(&self, cid: CorrelationId, n: usize) {
        self.get_or_create(cid).count.fetch_add(n, Ordering::AcqRel);
    }

    /// Decrement the pending count, waking waiters when it reaches zero.
    ///
    /// The entry is removed at zero unless it holds an error someone is
    /// waiting for; `wait_zero` cleans that one up.
    pub fn dec(&self, cid: CorrelationId, n: usize) {
        let Some(entry) = self.entries.get(&cid).map(|e| Arc::clone(&e)) else {
            return;
        };

        let prev = entry.count.fetch_sub(n, Ordering::AcqRel);
        if prev == n {
            entry.notify.notify_waiters();

            let has_waiters = entry.waiters.load(Ordering::Acquire) > 0;
            if !entry.has_error() || !has_waiters {
                self.entries.remove(&cid);
            }
        }
    }

    /// Record an error for a correlation ID. The first error wins.
    pub fn record_error(&self, cid: CorrelationId, err: anyhow::Error) {
        let Some(entry) = self.entries.get(&cid) else {
            return;
        };
        let mut guard = match entry.first_error.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!(cid = %cid, "mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        if guard.is_none() {
            *guard = Some(err);
        }
    }

    /// Register a waiter. Call before emitting if you plan to `wait_zero`.
    pub fn register_waiter(&self, cid: CorrelationId) -> WaiterGuard {
        WaiterGuard::new(self.get_or_create(cid))
    }

    /// Wait for the pending count to reach zero.
    ///
    /// Returns the first recorded error, if any.
    pub async fn wait_zero(&self, cid: CorrelationId) -> Result<()> {
        loop {
            let entry = match self.entries.get(&cid) {
                None => return Ok(()),
                Some(entry) => Arc::clone(&entry),
            };

            // Register before checking so a concurrent dec() cannot be missed.
            let notified = entry.notify.notified();

            if entry.count.load(Ordering::Acquire) == 0 {
                let err = entry.take_error();
                self.entries.remove(&cid);
                return match err {
                    Some(e) => Err(e),
                    None => Ok(()),
                };
            }

            notified.await;
        }
    }

    /// Returns true if the correlation ID has pending work.
    pub fn has_pending_work(&self, cid: CorrelationId) -> bool {
        self.entries
            .get(&cid)
            .map(|e| e.count.load(Ordering::Acquire) > 0)
            .unwrap_or(false)
    }

    /// Number of correlations currently tracked.
    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    fn forget(&self, cid: CorrelationId) {
        self.entries.remove(&cid);
    }
}

impl std::fmt::Debug for InflightTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflightTracker")
            .field("active_correlations", &self.entries.len())
            .finish()
    }
}

/// RAII guard that decrements the inflight count on drop.
pub struct InflightGuard {
    tracker: Arc<InflightTracker>,
    cid: CorrelationId,
}

impl InflightGuard {
    /// Guard for new work: increments now, decrements on drop.
    pub fn for_work(tracker: Arc<InflightTracker>, cid: CorrelationId) -> Self {
        tracker.inc(cid, 1);
        Self { tracker, cid }
    }

    /// Guard for an event that was counted when it was emitted.
    pub fn for_event(tracker: Arc<InflightTracker>, cid: CorrelationId) -> Self {
        Self { tracker, cid }
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.tracker.dec(self.cid, 1);
    }
}

// =============================================================================
// Engine
// =============================================================================

/// A built, not yet started engine.
pub struct Engine<D> {
    runtime: Runtime<D>,
    bus: EventBus,
    inflight: Arc<InflightTracker>,
}

impl<D: Send + Sync + 'static> Engine<D> {
    pub fn builder(deps: D) -> EngineBuilder<D> {
        EngineBuilder::new(deps)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Start the runtime loop in the background.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(self) -> EngineHandle {
        info!(
            effect_count = self.runtime.effect_count(),
            "starting seesaw engine"
        );

        let receiver = self.bus.subscribe();
        let handle = tokio::spawn(self.runtime.run(receiver));

        EngineHandle {
            bus: self.bus,
            inflight: self.inflight,
            handle,
        }
    }
}

// =============================================================================
// Engine Handle
// =============================================================================

/// Handle to a running engine.
///
/// - `emit()`: fire-and-forget, returns the correlation ID.
/// - `emit_and_await()`: waits until every effect in the cascade finished.
pub struct EngineHandle {
    bus: EventBus,
    inflight: Arc<InflightTracker>,
    handle: JoinHandle<()>,
}

impl EngineHandle {
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn inflight(&self) -> &Arc<InflightTracker> {
        &self.inflight
    }

    /// Emit an event without waiting.
    pub fn emit<E: Event>(&self, event: E) -> CorrelationId {
        let cid = CorrelationId::new();
        self.inflight.inc(cid, 1);
        self.bus.emit_with_correlation(event, cid);
        cid
    }

    /// Emit an event and wait for its cascade, bounded by
    /// [`DEFAULT_AWAIT_TIMEOUT`].
    pub async fn emit_and_await<E: Event>(&self, event: E) -> Result<()> {
        self.emit_and_await_timeout(event, DEFAULT_AWAIT_TIMEOUT)
            .await
    }

    /// Emit an event and wait for its cascade with a custom timeout.
    ///
    /// Returns the first effect error recorded for the cascade.
    pub async fn emit_and_await_timeout<E: Event>(
        &self,
        event: E,
        timeout: Duration,
    ) -> Result<()> {
        let cid = CorrelationId::new();

        // Waiter first: an early failure must not be cleaned up before we look.
        let _waiter = self.inflight.register_waiter(cid);
        self.inflight.inc(cid, 1);
        self.bus.emit_with_correlation(event, cid);

        match tokio::time::timeout(timeout, self.inflight.wait_zero(cid)).await {
            Ok(result) => result,
            Err(_) => {
                self.inflight.forget(cid);
                Err(SeesawError::Timeout { duration: timeout }.into())
            }
        }
    }

    /// Stop the runtime loop. Running effect tasks are not cancelled.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("inflight", &self.inflight)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Engine Builder
// =============================================================================

pub struct EngineBuilder<D> {
    deps: Arc<D>,
    bus: EventBus,
    inflight: Arc<InflightTracker>,
    effects: Vec<Effect<D>>,
}

impl<D: Send + Sync + 'static> EngineBuilder<D> {
    pub fn new(deps: D) -> Self {
        Self::with_arc(Arc::new(deps))
    }

    /// Use dependencies that are already shared elsewhere.
    pub fn with_arc(deps: Arc<D>) -> Self {
        Self {
            deps,
            bus: EventBus::new(),
            inflight: Arc::new(InflightTracker::new()),
            effects: Vec::new(),
        }
    }

    /// Use an existing event bus instead of creating a new one.
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_effect(mut self, effect: Effect<D>) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect<D>>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn build(self) -> Engine<D> {
        let runtime = Runtime::new(
            self.effects,
            self.deps,
            self.bus.clone(),
            Arc::clone(&self.inflight),
        );

        Engine {
            runtime,
            bus: self.bus,
            inflight: self.inflight,
        }
    }
}
