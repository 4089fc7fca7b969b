//! Effects: async reactions to events.
//!
//! An effect watches one event type. Each time an event of that type is
//! dispatched the runtime runs the handler in its own task. The handler
//! performs IO through the dependencies in its [`EffectContext`] and answers
//! with an [`Emit`] describing the follow-up events to dispatch.
//!
//! ```ignore
//! use seesaw::{effect, Emit};
//!
//! let greet = effect::on::<SessionEvent>().id("greet").then(
//!     |event, ctx: EffectContext<Deps>| async move {
//!         match event.as_ref() {
//!             SessionEvent::OpenRequested { user } => {
//!                 ctx.deps().greeter.greet(user).await?;
//!                 Ok(Emit::event(SessionEvent::Opened { user: user.clone() }))
//!             }
//!             _ => Ok(Emit::none()),
//!         }
//!     },
//! );
//! ```
//!
//! Returning `Err` does not dispatch anything. The runtime logs the error and
//! reports it to whoever awaits the correlation. Effects that need the
//! failure to be observable as an event return `Ok` with a failure event.

use std::any::{Any, TypeId};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::core::{CorrelationId, Event, EventEnvelope};

/// Start building an effect that reacts to events of type `E`.
pub fn on<E: Event>() -> EffectBuilder<E> {
    EffectBuilder {
        id: None,
        _event: PhantomData,
    }
}

/// Builder returned by [`on`].
pub struct EffectBuilder<E> {
    id: Option<&'static str>,
    _event: PhantomData<fn() -> E>,
}

impl<E: Event> EffectBuilder<E> {
    /// Stable name used in logs and errors. Defaults to the event type name.
    pub fn id(mut self, id: &'static str) -> Self {
        self.id = Some(id);
        self
    }

    /// Finish the effect with its handler.
    pub fn then<D, F, Fut>(self, handler: F) -> Effect<D>
    where
        D: Send + Sync + 'static,
        F: Fn(Arc<E>, EffectContext<D>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Emit>> + Send + 'static,
    {
        let run: Handler<D> = Arc::new(
            move |payload: Arc<dyn Any + Send + Sync>,
                  ctx: EffectContext<D>|
                  -> BoxFuture<'static, Result<Emit>> {
                match payload.downcast::<E>() {
                    Ok(event) => handler(event, ctx).boxed(),
                    Err(_) => async { Ok(Emit::none()) }.boxed(),
                }
            },
        );

        Effect {
            id: self.id.unwrap_or(std::any::type_name::<E>()),
            event_type: TypeId::of::<E>(),
            run,
        }
    }
}

type Handler<D> = Arc<
    dyn Fn(Arc<dyn Any + Send + Sync>, EffectContext<D>) -> BoxFuture<'static, Result<Emit>>
        + Send
        + Sync,
>;

/// A registered reaction to one event type.
pub struct Effect<D> {
    id: &'static str,
    event_type: TypeId,
    run: Handler<D>,
}

impl<D> Effect<D> {
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The event type this effect watches.
    pub fn event_type(&self) -> TypeId {
        self.event_type
    }

    /// Returns true if this effect reacts to the envelope's payload.
    pub fn handles(&self, envelope: &EventEnvelope) -> bool {
        envelope.type_id == self.event_type
    }

    /// Run the handler for one envelope.
    pub(crate) fn call(
        &self,
        envelope: &EventEnvelope,
        ctx: EffectContext<D>,
    ) -> BoxFuture<'static, Result<Emit>> {
        (self.run)(Arc::clone(&envelope.payload), ctx)
    }
}

impl<D> Clone for Effect<D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            event_type: self.event_type,
            run: Arc::clone(&self.run),
        }
    }
}

impl<D> std::fmt::Debug for Effect<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Context passed to effect handlers.
///
/// Immutable and cheap to clone: it carries shared dependencies and the
/// correlation of the event being handled.
pub struct EffectContext<D> {
    deps: Arc<D>,
    cid: CorrelationId,
    effect_id: &'static str,
}

impl<D> EffectContext<D> {
    pub(crate) fn new(deps: Arc<D>, cid: CorrelationId, effect_id: &'static str) -> Self {
        Self {
            deps,
            cid,
            effect_id,
        }
    }

    /// Shared dependencies (service clients, stores, configuration).
    pub fn deps(&self) -> &D {
        &self.deps
    }

    /// Correlation of the event being handled.
    pub fn correlation_id(&self) -> CorrelationId {
        self.cid
    }

    /// Id of the effect running with this context.
    pub fn effect_id(&self) -> &'static str {
        self.effect_id
    }
}

impl<D> Clone for EffectContext<D> {
    fn clone(&self) -> Self {
        Self {
            deps: Arc::clone(&self.deps),
            cid: self.cid,
            effect_id: self.effect_id,
        }
    }
}

impl<D> std::fmt::Debug for EffectContext<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectContext")
            .field("cid", &self.cid)
            .field("effect_id", &self.effect_id)
            .finish_non_exhaustive()
    }
}

/// Follow-up events returned by an effect handler.
///
/// Events may be of different types; they are dispatched in order with the
/// correlation of the event that triggered the effect.
#[derive(Debug, Default)]
#[must_use]
pub struct Emit {
    events: Vec<EventEnvelope>,
}

impl Emit {
    /// Dispatch nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Dispatch a single event.
    pub fn event<E: Event>(event: E) -> Self {
        Self::none().and(event)
    }

    /// Append another event.
    pub fn and<E: Event>(mut self, event: E) -> Self {
        self.events.push(EventEnvelope::new(CorrelationId::NONE, event));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Consume into envelopes tagged with `cid`.
    pub(crate) fn into_envelopes(self, cid: CorrelationId) -> impl Iterator<Item = EventEnvelope> {
        self.events.into_iter().map(move |e| e.with_cid(cid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Door {
        OpenRequested,
        Opened,
    }

    #[derive(Debug, Clone)]
    struct Chime;

    fn door_effect() -> Effect<()> {
        on::<Door>().id("door").then(|event, _ctx: EffectContext<()>| async move {
            match event.as_ref() {
                Door::OpenRequested => Ok(Emit::event(Door::Opened).and(Chime)),
                Door::Opened => Ok(Emit::none()),
            }
        })
    }

    #[tokio::test]
    async fn handler_receives_matching_events() {
        let effect = door_effect();
        let cid = CorrelationId::new();
        let ctx = EffectContext::new(Arc::new(()), cid, effect.id());

        let envelope = EventEnvelope::new(cid, Door::OpenRequested);
        assert!(effect.handles(&envelope));

        let emit = effect.call(&envelope, ctx).await.unwrap();
        let out: Vec<_> = emit.into_envelopes(cid).collect();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].downcast_ref::<Door>(), Some(&Door::Opened));
        assert!(out[1].is::<Chime>());
        assert!(out.iter().all(|e| e.cid == cid));
    }

    #[tokio::test]
    async fn handler_ignores_other_event_types() {
        let effect = door_effect();
        let envelope = EventEnvelope::new_random(Chime);
        assert!(!effect.handles(&envelope));

        let ctx = EffectContext::new(Arc::new(()), envelope.cid, effect.id());
        let emit = effect.call(&envelope, ctx).await.unwrap();
        assert!(emit.is_empty());
    }

    #[test]
    fn id_defaults_to_event_type_name() {
        let effect = on::<Chime>().then(|_, _ctx: EffectContext<()>| async { Ok(Emit::none()) });
        assert!(effect.id().ends_with("Chime"));
    }
}
