//! Runtime loop routing events to effects.
//!
//! For each envelope received from the bus the runtime spawns one task per
//! matching effect. Effects never block each other: two events of the same
//! type dispatched back to back run their handlers concurrently.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, trace, warn};

use crate::bus::EventBus;
use crate::core::EventEnvelope;
use crate::effect::{Effect, EffectContext};
use crate::engine::{InflightGuard, InflightTracker};
use crate::error::SeesawError;

pub struct Runtime<D> {
    effects: Vec<Effect<D>>,
    deps: Arc<D>,
    bus: EventBus,
    inflight: Arc<InflightTracker>,
}

impl<D: Send + Sync + 'static> Runtime<D> {
    pub fn new(
        effects: Vec<Effect<D>>,
        deps: Arc<D>,
        bus: EventBus,
        inflight: Arc<InflightTracker>,
    ) -> Self {
        Self {
            effects,
            deps,
            bus,
            inflight,
        }
    }

    /// Process events from `receiver` until the bus is closed.
    ///
    /// The receiver is taken as an argument so callers can subscribe before
    /// the loop is spawned; events emitted in between are not lost.
    pub async fn run(self, mut receiver: broadcast::Receiver<EventEnvelope>) {
        info!(effect_count = self.effects.len(), "seesaw runtime starting");

        loop {
            match receiver.recv().await {
                Ok(envelope) => self.route(envelope),
                Err(RecvError::Lagged(n)) => {
                    warn!(missed = n, "event bus lagged, missed events");
                }
                Err(RecvError::Closed) => {
                    info!("event bus closed, runtime shutting down");
                    break;
                }
            }
        }

        info!("seesaw runtime stopped");
    }

    /// Spawn every effect watching the envelope's event type.
    fn route(&self, envelope: EventEnvelope) {
        // Decrements the count taken at emit time once all effects are spawned.
        let _event_guard = InflightGuard::for_event(Arc::clone(&self.inflight), envelope.cid);

        let mut matched = 0usize;
        for effect in self.effects.iter().filter(|e| e.handles(&envelope)) {
            matched += 1;
            self.spawn_effect(effect, &envelope);
        }

        if matched == 0 {
            trace!(event = envelope.type_name, cid = %envelope.cid, "no effect watches event");
        }
    }

    fn spawn_effect(&self, effect: &Effect<D>, envelope: &EventEnvelope) {
        let cid = envelope.cid;
        let id = effect.id();
        let work = InflightGuard::for_work(Arc::clone(&self.inflight), cid);
        let ctx = EffectContext::new(Arc::clone(&self.deps), cid, id);
        let future = effect.call(envelope, ctx);
        let bus = self.bus.clone();
        let inflight = Arc::clone(&self.inflight);

        debug!(effect = id, event = envelope.type_name, %cid, "running effect");

        tokio::spawn(async move {
            let _work = work;
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(emit)) => {
                    trace!(effect = id, %cid, follow_ups = emit.len(), "effect completed");
                    for next in emit.into_envelopes(cid) {
                        // Count the follow-up before it is visible on the bus.
                        inflight.inc(cid, 1);
                        bus.emit_envelope(next);
                    }
                }
                Ok(Err(err)) => {
                    let message = format!("{:#}", err);
                    error!(effect = id, %cid, error = %message, "effect failed");
                    inflight.record_error(cid, SeesawError::effect_failed(id, &err).into());
                }
                Err(_) => {
                    error!(effect = id, %cid, "effect panicked");
                    inflight.record_error(cid, SeesawError::EffectPanicked { effect: id }.into());
                }
            }
        });
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }
}

impl<D> std::fmt::Debug for Runtime<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("effect_count", &self.effects.len())
            .finish_non_exhaustive()
    }
}
