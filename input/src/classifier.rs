//! The press / hold / drag state machine of a single pointer.
//!
//! ```text
//! Idle --down--> Armed --click window--> Holding --up--> Idle
//!                  |
//!                  +--up--> AwaitingSecondClick --down--> Idle (double click)
//!                                  |
//!                                  +--click window--> Idle (single click)
//! ```
//!
//! Disambiguation is time-first: movement while armed never promotes to a drag early, only the
//! expiry of the click window does.
//!
//! The machine is pure. It consumes pointer inputs and timer expiries and produces [`Effect`]s that
//! the caller has to apply in order.
use std::mem;

use derive_more::Display;
use log::{debug, error, trace};
use tactile_geometry::Vector;

use crate::{
    Gesture, GestureConfig, GestureEvent, Instant, PointerInput, PointerSample, PointerTimer,
};

/// An input of the state machine.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ClassifierInput {
    Pointer(PointerInput),
    /// A previously scheduled timer expired at `now`.
    Timer { timer: PointerTimer, now: Instant },
    /// Tear down the session without classifying it.
    Cancel,
}

/// What the caller has to do after a step.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Effect {
    Emit(GestureEvent),
    /// Schedule `timer`, replacing a pending timer of the same kind.
    Schedule {
        timer: PointerTimer,
        deadline: Instant,
    },
    /// Cancel `timer` if it is pending.
    Cancel(PointerTimer),
}

/// The externally observable state of a [`Classifier`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
pub enum Phase {
    Idle,
    Armed,
    Holding,
    AwaitingSecondClick,
}

#[derive(Copy, Clone, PartialEq, Debug, Default)]
enum State {
    #[default]
    Idle,
    Armed {
        origin: PointerSample,
        last: PointerSample,
    },
    AwaitingSecondClick {
        up: PointerSample,
        /// `AnyClick` was reported on release, so no `SingleClick` follows.
        clicked: bool,
    },
    Holding(Hold),
}

#[derive(Copy, Clone, PartialEq, Debug)]
struct Hold {
    origin: PointerSample,
    last: PointerSample,
    /// The deadline of the pending repeat tick, `None` when repeating stopped.
    next_repeat: Option<Instant>,
    pause_armed: bool,
    inside: bool,
}

impl Hold {
    fn total_at(&self, sample: &PointerSample) -> Vector {
        sample.pos - self.origin.pos
    }
}

#[derive(Debug, Default)]
pub struct Classifier {
    state: State,
}

impl Classifier {
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Armed { .. } => Phase::Armed,
            State::AwaitingSecondClick { .. } => Phase::AwaitingSecondClick,
            State::Holding(_) => Phase::Holding,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    pub fn step(&mut self, input: ClassifierInput, config: &GestureConfig) -> Vec<Effect> {
        let mut effects = Effects::default();
        let mut state = mem::take(&mut self.state);

        // Timers that were due at or before a pointer input but not delivered yet expire first, so
        // the input is classified against the right state.
        if let ClassifierInput::Pointer(pointer_input) = input {
            let time = pointer_input.time();
            while let Some((timer, now)) = overdue_timer(&state, config, time) {
                trace!("{timer} timer expired before {pointer_input:?}");
                effects.cancel(timer);
                state = transition(
                    state,
                    ClassifierInput::Timer { timer, now },
                    config,
                    &mut effects,
                );
            }
        }

        self.state = transition(state, input, config, &mut effects);
        effects.0
    }
}

/// A timer still pending in `state` that should have fired by `time`, and the time to fire it
/// with.
fn overdue_timer(
    state: &State,
    config: &GestureConfig,
    time: Instant,
) -> Option<(PointerTimer, Instant)> {
    let due = |deadline: Instant| (deadline <= time).then_some(deadline);
    match state {
        State::Idle => None,
        State::Armed { origin, .. } => {
            due(origin.time + config.click_window).map(|at| (PointerTimer::ClickWindow, at))
        }
        State::AwaitingSecondClick { up, .. } => {
            due(up.time + config.click_window).map(|at| (PointerTimer::ClickWindow, at))
        }
        State::Holding(hold) => {
            let pause = hold
                .pause_armed
                .then(|| hold.last.time + config.drag_pause)
                .and_then(due);
            if let Some(at) = pause {
                return Some((PointerTimer::DragPause, at));
            }
            // Missed repeat ticks collapse into one observed at `time`, after any other overdue
            // timer.
            hold.next_repeat.and_then(due).map(|_| (PointerTimer::Repeat, time))
        }
    }
}

fn transition(
    state: State,
    input: ClassifierInput,
    config: &GestureConfig,
    effects: &mut Effects,
) -> State {
    use ClassifierInput::{Cancel, Pointer, Timer};
    use PointerInput::*;
    use PointerTimer::*;

    match (state, input) {
        (State::Idle, Pointer(Down(sample))) => {
            effects.emit(sample, Gesture::MouseDown);
            effects.schedule(ClickWindow, sample.time + config.click_window);
            State::Armed {
                origin: sample,
                last: sample,
            }
        }

        (State::Armed { origin, .. }, Pointer(Move(sample))) => State::Armed {
            origin,
            last: sample,
        },
        (State::Armed { .. }, Pointer(Up(sample))) => {
            // The double click window starts at the release.
            effects.schedule(ClickWindow, sample.time + config.click_window);
            let clicked = config.any_click_on_release;
            if clicked {
                effects.emit(sample, Gesture::AnyClick);
            }
            State::AwaitingSecondClick {
                up: sample,
                clicked,
            }
        }
        (State::Armed { origin, last }, Timer { timer: ClickWindow, now }) => {
            effects.emit(last.at(now), Gesture::DragStart);
            let next_repeat = now + config.repeat_interval;
            effects.schedule(Repeat, next_repeat);
            State::Holding(Hold {
                origin,
                last,
                next_repeat: Some(next_repeat),
                pause_armed: false,
                inside: true,
            })
        }

        (State::AwaitingSecondClick { clicked: true, .. }, Pointer(Down(sample))) => {
            // The first cycle was already reported as a click, so this press starts a new one.
            effects.cancel(ClickWindow);
            transition(State::Idle, Pointer(Down(sample)), config, effects)
        }
        (State::AwaitingSecondClick { .. }, Pointer(Down(sample))) => {
            effects.cancel(ClickWindow);
            effects.emit(sample, Gesture::MouseDown);
            effects.emit(sample, Gesture::DoubleClick);
            State::Idle
        }
        (State::AwaitingSecondClick { up, clicked }, Timer { timer: ClickWindow, now }) => {
            if !clicked {
                effects.emit(up.at(now), Gesture::SingleClick);
            }
            State::Idle
        }

        (State::Holding(mut hold), Pointer(Move(sample))) => {
            let delta = sample.pos - hold.last.pos;
            hold.last = sample;
            effects.emit(
                sample,
                Gesture::Drag {
                    delta,
                    total: hold.total_at(&sample),
                },
            );
            effects.schedule(DragPause, sample.time + config.drag_pause);
            hold.pause_armed = true;
            State::Holding(hold)
        }
        (State::Holding(mut hold), Timer { timer: DragPause, now }) if hold.pause_armed => {
            hold.pause_armed = false;
            effects.emit(
                hold.last.at(now),
                Gesture::DragPause {
                    total: hold.total_at(&hold.last),
                },
            );
            State::Holding(hold)
        }
        (State::Holding(mut hold), Timer { timer: Repeat, now }) if hold.next_repeat.is_some() => {
            effects.emit(hold.last.at(now), Gesture::MouseRepeat);
            let mut next = hold.next_repeat.unwrap_or(now) + config.repeat_interval;
            // Skip ticks the host was too late for instead of firing them in a burst.
            if next <= now {
                next = now + config.repeat_interval;
            }
            effects.schedule(Repeat, next);
            hold.next_repeat = Some(next);
            State::Holding(hold)
        }
        (State::Holding(mut hold), Pointer(Leave(sample))) if hold.inside => {
            hold.inside = false;
            if hold.next_repeat.take().is_some() {
                effects.cancel(Repeat);
            }
            effects.emit(
                sample,
                Gesture::DragLeave {
                    total: hold.total_at(&sample),
                },
            );
            State::Holding(hold)
        }
        (State::Holding(mut hold), Pointer(Enter(sample))) if !hold.inside => {
            hold.inside = true;
            effects.emit(
                sample,
                Gesture::DragEnter {
                    total: hold.total_at(&sample),
                },
            );
            State::Holding(hold)
        }
        (State::Holding(hold), Pointer(Up(sample))) => {
            hold.cancel_timers(effects);
            effects.emit(
                sample,
                Gesture::DragEnd {
                    total: hold.total_at(&sample),
                },
            );
            State::Idle
        }

        (state, Cancel) => {
            match state {
                State::Idle => {}
                State::Armed { .. } | State::AwaitingSecondClick { .. } => {
                    effects.cancel(ClickWindow)
                }
                State::Holding(hold) => hold.cancel_timers(effects),
            }
            State::Idle
        }

        (state, Timer { timer, .. }) => {
            error!("Internal error: {timer} timer fired in {state:?}, ignoring");
            state
        }
        (state, Pointer(input)) => {
            debug!("Ignoring {input:?} in {state:?}");
            state
        }
    }
}

impl Hold {
    fn cancel_timers(&self, effects: &mut Effects) {
        if self.next_repeat.is_some() {
            effects.cancel(PointerTimer::Repeat);
        }
        if self.pause_armed {
            effects.cancel(PointerTimer::DragPause);
        }
    }
}

#[derive(Debug, Default)]
struct Effects(Vec<Effect>);

impl Effects {
    fn emit(&mut self, sample: PointerSample, gesture: Gesture) {
        trace!("Classified {gesture:?}");
        self.0.push(Effect::Emit(GestureEvent::new(sample, gesture)));
    }

    fn schedule(&mut self, timer: PointerTimer, deadline: Instant) {
        self.0.push(Effect::Schedule { timer, deadline });
    }

    fn cancel(&mut self, timer: PointerTimer) {
        self.0.push(Effect::Cancel(timer));
    }
}
