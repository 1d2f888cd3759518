//! A target surface: per pointer sessions, the wheel side channel, and subscriptions.
use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
};

use log::{debug, error, trace};

use crate::{
    GestureConfig, GestureEvent, GestureKinds, Instant, ManualScheduler, Phase, PointerId,
    PointerInput, PointerSample, Scheduler, SurfaceId, SurfaceInput, TimerHandle, TimerToken,
    WheelInput, WheelSmoother,
    session::{Generations, PointerSession, SessionContext},
};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    kinds: GestureKinds,
    callback: Box<dyn FnMut(&GestureEvent)>,
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

/// Classifies the pointer input of one target surface and delivers the resulting gestures to its
/// subscribers.
///
/// Gestures are delivered synchronously, in the order they were classified, to subscribers in the
/// order they subscribed.
#[derive(Debug)]
pub struct GestureSurface {
    id: SurfaceId,
    config: GestureConfig,
    sessions: HashMap<PointerId, PointerSession>,
    wheel: WheelSmoother,
    wheel_timer: Option<(TimerHandle, u64)>,
    generations: Generations,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl GestureSurface {
    pub fn new(id: SurfaceId, config: GestureConfig) -> Self {
        Self {
            id,
            config,
            sessions: HashMap::new(),
            wheel: WheelSmoother::default(),
            wheel_timer: None,
            generations: Generations::default(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Registers `callback` for all gestures contained in `kinds`.
    pub fn subscribe(
        &mut self,
        kinds: GestureKinds,
        callback: impl FnMut(&GestureEvent) + 'static,
    ) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push(Subscriber {
            id,
            kinds,
            callback: Box::new(callback),
        });
        id
    }

    /// Returns `false` if there was no such subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// `true` while the pointer has a session, that is, from its press until its gesture is
    /// classified.
    pub fn is_active(&self, pointer: PointerId) -> bool {
        self.sessions.contains_key(&pointer)
    }

    pub fn phase(&self, pointer: PointerId) -> Phase {
        self.sessions
            .get(&pointer)
            .map(|s| s.phase())
            .unwrap_or(Phase::Idle)
    }

    pub fn handle_input(&mut self, scheduler: &mut dyn Scheduler, input: SurfaceInput) {
        match input {
            SurfaceInput::Pointer { pointer, input } => self.handle(scheduler, pointer, input),
            SurfaceInput::Wheel { sample, input } => self.wheel(scheduler, sample, input),
            SurfaceInput::Cancel(pointer) => self.cancel(scheduler, pointer),
        }
    }

    pub fn handle(
        &mut self,
        scheduler: &mut dyn Scheduler,
        pointer: PointerId,
        input: PointerInput,
    ) {
        let session = match self.sessions.entry(pointer) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) if matches!(input, PointerInput::Down(_)) => {
                entry.insert(PointerSession::new(pointer))
            }
            Entry::Vacant(_) => {
                debug!("{}: Ignoring {input:?} of {pointer} without a press", self.id);
                return;
            }
        };

        let events = session.pointer(
            input,
            SessionContext {
                config: &self.config,
                scheduler,
                generations: &mut self.generations,
            },
        );
        self.end_finished(pointer);
        self.dispatch(events);
    }

    pub fn wheel(
        &mut self,
        scheduler: &mut dyn Scheduler,
        sample: PointerSample,
        input: WheelInput,
    ) {
        let Some(gesture) = self
            .wheel
            .smooth(sample.time, &input, self.config.wheel_reset)
        else {
            debug!("{}: Ignoring wheel input without movement: {input:?}", self.id);
            return;
        };

        if let Some((handle, _)) = self.wheel_timer.take() {
            scheduler.cancel(handle);
        }
        let generation = self.generations.issue();
        let handle = scheduler.schedule(
            sample.time + self.config.wheel_reset,
            TimerToken::WheelReset { generation },
        );
        self.wheel_timer = Some((handle, generation));

        self.dispatch(vec![GestureEvent::new(sample, gesture)]);
    }

    /// Delivers an expired timer scheduled by this surface.
    pub fn timer_fired(&mut self, scheduler: &mut dyn Scheduler, token: TimerToken, now: Instant) {
        match token {
            TimerToken::Pointer {
                pointer,
                timer,
                generation,
            } => {
                let Some(session) = self.sessions.get_mut(&pointer) else {
                    error!(
                        "Internal error: {timer} timer fired for {pointer} without a session, ignoring"
                    );
                    return;
                };
                let events = session.timer_fired(
                    timer,
                    generation,
                    now,
                    SessionContext {
                        config: &self.config,
                        scheduler,
                        generations: &mut self.generations,
                    },
                );
                self.end_finished(pointer);
                self.dispatch(events);
            }
            TimerToken::WheelReset { generation } => match self.wheel_timer {
                Some((_, current)) if current == generation => {
                    trace!("{}: Wheel factor reset", self.id);
                    self.wheel_timer = None;
                    self.wheel.reset();
                }
                _ => error!(
                    "Internal error: stale wheel reset timer (generation {generation}), ignoring"
                ),
            },
        }
    }

    /// Tears down the session of `pointer` without emitting a gesture. No-op if there is none.
    pub fn cancel(&mut self, scheduler: &mut dyn Scheduler, pointer: PointerId) {
        if let Some(mut session) = self.sessions.remove(&pointer) {
            debug!("{}: Cancelling the session of {pointer}", self.id);
            session.cancel(SessionContext {
                config: &self.config,
                scheduler,
                generations: &mut self.generations,
            });
        }
    }

    /// Cancels all sessions and the wheel timer, for example because the surface is going away.
    pub fn cancel_all(&mut self, scheduler: &mut dyn Scheduler) {
        let pointers: Vec<_> = self.sessions.keys().copied().collect();
        for pointer in pointers {
            self.cancel(scheduler, pointer);
        }
        if let Some((handle, _)) = self.wheel_timer.take() {
            scheduler.cancel(handle);
        }
        self.wheel.reset();
    }

    /// Fires all timers of `scheduler` that are due at `until` in deadline order, then moves its
    /// clock to `until`.
    ///
    /// The scheduler must be exclusive to this surface.
    pub fn advance(&mut self, scheduler: &mut ManualScheduler, until: Instant) {
        while let Some((deadline, token)) = scheduler.pop_due(until) {
            self.timer_fired(scheduler, token, deadline);
        }
        scheduler.set_now(until);
    }

    fn end_finished(&mut self, pointer: PointerId) {
        if self.sessions.get(&pointer).is_some_and(|s| s.is_finished()) {
            trace!("{}: Session of {pointer} ended", self.id);
            self.sessions.remove(&pointer);
        }
    }

    fn dispatch(&mut self, events: Vec<GestureEvent>) {
        for event in &events {
            trace!("{}: {:?}", self.id, event.gesture);
            let kind = event.kind();
            for subscriber in &mut self.subscribers {
                if subscriber.kinds.contains(kind) {
                    (subscriber.callback)(event);
                }
            }
        }
    }
}
