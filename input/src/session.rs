//! The timer shell around a [`Classifier`].
use std::collections::HashMap;

use log::error;

use crate::{
    Classifier, ClassifierInput, Effect, GestureConfig, GestureEvent, Instant, Phase, PointerId,
    PointerInput, PointerTimer, Scheduler, TimerHandle, TimerToken,
};

/// Hands out surface-wide unique timer generations.
#[derive(Debug, Default)]
pub struct Generations(u64);

impl Generations {
    pub fn issue(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Copy, Clone, Debug)]
struct PendingTimer {
    handle: TimerHandle,
    generation: u64,
}

/// The session of one pointer on one surface.
///
/// Lives from the press until the classifier returns to idle or the session is cancelled. Owns the
/// pending timers of the classifier and guarantees that none outlive the session.
#[derive(Debug)]
pub struct PointerSession {
    pointer: PointerId,
    classifier: Classifier,
    timers: HashMap<PointerTimer, PendingTimer>,
}

impl PointerSession {
    pub fn new(pointer: PointerId) -> Self {
        Self {
            pointer,
            classifier: Classifier::default(),
            timers: HashMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.classifier.phase()
    }

    /// `true` if the session ended and can be dropped.
    pub fn is_finished(&self) -> bool {
        self.classifier.is_idle()
    }

    pub fn pointer(
        &mut self,
        input: PointerInput,
        context: SessionContext<'_>,
    ) -> Vec<GestureEvent> {
        self.step(ClassifierInput::Pointer(input), context)
    }

    /// Delivers an expired timer. Tokens that do not match a pending timer of this session are
    /// ignored.
    pub fn timer_fired(
        &mut self,
        timer: PointerTimer,
        generation: u64,
        now: Instant,
        context: SessionContext<'_>,
    ) -> Vec<GestureEvent> {
        match self.timers.get(&timer) {
            Some(pending) if pending.generation == generation => {
                self.timers.remove(&timer);
            }
            _ => {
                error!(
                    "Internal error: stale {timer} timer (generation {generation}) fired for {}, ignoring",
                    self.pointer
                );
                return Vec::new();
            }
        }
        self.step(ClassifierInput::Timer { timer, now }, context)
    }

    /// Ends the session without classification and cancels all of its timers.
    pub fn cancel(&mut self, context: SessionContext<'_>) {
        let events = self.step(ClassifierInput::Cancel, context);
        debug_assert!(events.is_empty());
    }

    fn step(&mut self, input: ClassifierInput, context: SessionContext<'_>) -> Vec<GestureEvent> {
        let SessionContext {
            config,
            scheduler,
            generations,
        } = context;

        let mut events = Vec::new();
        for effect in self.classifier.step(input, config) {
            match effect {
                Effect::Emit(event) => events.push(event),
                Effect::Schedule { timer, deadline } => {
                    if let Some(previous) = self.timers.remove(&timer) {
                        scheduler.cancel(previous.handle);
                    }
                    let generation = generations.issue();
                    let token = TimerToken::Pointer {
                        pointer: self.pointer,
                        timer,
                        generation,
                    };
                    let handle = scheduler.schedule(deadline, token);
                    self.timers.insert(timer, PendingTimer { handle, generation });
                }
                Effect::Cancel(timer) => {
                    if let Some(pending) = self.timers.remove(&timer) {
                        scheduler.cancel(pending.handle);
                    }
                }
            }
        }

        if self.classifier.is_idle() && !self.timers.is_empty() {
            error!(
                "Internal error: {} timers left behind by an idle session of {}, cancelling",
                self.timers.len(),
                self.pointer
            );
            for (_, pending) in self.timers.drain() {
                scheduler.cancel(pending.handle);
            }
        }

        events
    }

    #[cfg(test)]
    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

/// What a session needs from its surface to apply effects.
pub struct SessionContext<'a> {
    pub config: &'a GestureConfig,
    pub scheduler: &'a mut dyn Scheduler,
    pub generations: &'a mut Generations,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tactile_geometry::Point;

    use super::*;
    use crate::{Gesture, ManualScheduler, PointerSample};

    struct Fixture {
        t0: Instant,
        config: GestureConfig,
        scheduler: ManualScheduler,
        generations: Generations,
        session: PointerSession,
    }

    impl Fixture {
        fn new() -> Self {
            let t0 = Instant::now();
            Self {
                t0,
                config: GestureConfig::default(),
                scheduler: ManualScheduler::new(t0),
                generations: Generations::default(),
                session: PointerSession::new(PointerId(1)),
            }
        }

        fn sample(&self, ms: u64) -> PointerSample {
            PointerSample::new(Point::ZERO, self.t0 + Duration::from_millis(ms))
        }

        fn context(&mut self) -> (&mut PointerSession, SessionContext<'_>) {
            (
                &mut self.session,
                SessionContext {
                    config: &self.config,
                    scheduler: &mut self.scheduler,
                    generations: &mut self.generations,
                },
            )
        }

        fn pointer(&mut self, input: PointerInput) -> Vec<GestureEvent> {
            let (session, context) = self.context();
            session.pointer(input, context)
        }

        /// Fires the next due timer.
        fn fire_until(&mut self, ms: u64) -> Vec<GestureEvent> {
            let until = self.t0 + Duration::from_millis(ms);
            let mut events = Vec::new();
            while let Some((at, token)) = self.scheduler.pop_due(until) {
                let TimerToken::Pointer {
                    timer, generation, ..
                } = token
                else {
                    panic!("unexpected token {token:?}");
                };
                let (session, context) = self.context();
                events.extend(session.timer_fired(timer, generation, at, context));
            }
            events
        }
    }

    #[test]
    fn rescheduling_replaces_the_pending_timer() {
        let mut f = Fixture::new();
        f.pointer(PointerInput::Down(f.sample(0)));
        assert_eq!(f.scheduler.pending_count(), 1);
        f.pointer(PointerInput::Up(f.sample(100)));
        assert_eq!(f.scheduler.pending_count(), 1);
        assert_eq!(
            f.scheduler.next_deadline(),
            Some(f.t0 + Duration::from_millis(350))
        );

        let events = f.fire_until(1000);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].gesture, Gesture::SingleClick);
        assert!(f.session.is_finished());
        assert!(f.scheduler.is_idle());
    }

    #[test]
    fn stale_generations_are_ignored() {
        let mut f = Fixture::new();
        f.pointer(PointerInput::Down(f.sample(0)));
        let now = f.t0 + Duration::from_millis(250);
        let (session, context) = f.context();
        let events = session.timer_fired(PointerTimer::ClickWindow, 999, now, context);
        assert!(events.is_empty());
        assert_eq!(f.session.phase(), Phase::Armed);
        assert_eq!(f.session.pending_timers(), 1);
    }

    #[test]
    fn cancel_releases_every_timer() {
        let mut f = Fixture::new();
        f.pointer(PointerInput::Down(f.sample(0)));
        f.fire_until(260);
        f.pointer(PointerInput::Move(f.sample(270)));
        assert_eq!(f.scheduler.pending_count(), 2);

        let (session, context) = f.context();
        session.cancel(context);
        assert!(f.session.is_finished());
        assert!(f.scheduler.is_idle());
        assert_eq!(f.session.pending_timers(), 0);

        let (session, context) = f.context();
        session.cancel(context);
        assert!(f.scheduler.is_idle());
    }
}
