//! Timer scheduling.
//!
//! The classifier never waits. It asks a [`Scheduler`] for one-shot timers and expects the host to
//! feed every expired [`TimerToken`] back into [`crate::GestureSurface::timer_fired`].
use std::collections::{BTreeMap, HashMap};

use derive_more::Display;
use log::trace;

use crate::{Instant, PointerId};

/// The timers a pointer session uses.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
pub enum PointerTimer {
    /// Distinguishes clicks from holds, and single from double clicks.
    ClickWindow,
    /// Ticks [`crate::Gesture::MouseRepeat`] while the pointer is held.
    Repeat,
    /// Detects stillness during a drag.
    DragPause,
}

/// Identifies a scheduled timer when it fires.
///
/// The generation is unique per surface, so a token that outlived its timer can never be mistaken
/// for a live one.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TimerToken {
    Pointer {
        pointer: PointerId,
        timer: PointerTimer,
        generation: u64,
    },
    WheelReset {
        generation: u64,
    },
}

/// A handle to a scheduled timer, used for cancellation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Display)]
#[display("timer#{_0}")]
pub struct TimerHandle(u64);

/// The timer primitive the host provides: schedule once, cancel.
pub trait Scheduler {
    fn schedule(&mut self, deadline: Instant, token: TimerToken) -> TimerHandle;

    /// Cancels a timer. Cancelling a timer that already fired or was cancelled is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

/// A deterministic scheduler with a manually advanced clock.
///
/// Timers are ordered by deadline and then by the order they were scheduled in.
#[derive(Debug)]
pub struct ManualScheduler {
    now: Instant,
    next_handle: u64,
    pending: BTreeMap<(Instant, TimerHandle), TimerToken>,
    deadlines: HashMap<TimerHandle, Instant>,
}

impl ManualScheduler {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            next_handle: 0,
            pending: Default::default(),
            deadlines: Default::default(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Moves the clock forward. The clock never goes backwards.
    pub fn set_now(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    /// The earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes the earliest timer that is due at `until` and advances the clock to its deadline.
    ///
    /// Call this repeatedly: handling a token may schedule new timers that are also due.
    pub fn pop_due(&mut self, until: Instant) -> Option<(Instant, TimerToken)> {
        let (&(deadline, handle), _) = self.pending.first_key_value()?;
        if deadline > until {
            return None;
        }
        let token = self.pending.remove(&(deadline, handle))?;
        self.deadlines.remove(&handle);
        self.set_now(deadline);
        Some((deadline, token))
    }

    /// Number of timers not yet fired or cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, deadline: Instant, token: TimerToken) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        trace!("Scheduling {handle} for {token:?}");
        self.pending.insert((deadline, handle), token);
        self.deadlines.insert(handle, deadline);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(deadline) = self.deadlines.remove(&handle) {
            trace!("Cancelling {handle}");
            self.pending.remove(&(deadline, handle));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn wheel(generation: u64) -> TimerToken {
        TimerToken::WheelReset { generation }
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let t0 = Instant::now();
        let mut scheduler = ManualScheduler::new(t0);
        scheduler.schedule(t0 + Duration::from_millis(20), wheel(2));
        scheduler.schedule(t0 + Duration::from_millis(10), wheel(1));
        scheduler.schedule(t0 + Duration::from_millis(20), wheel(3));

        let until = t0 + Duration::from_millis(100);
        let fired: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(until))
            .map(|(_, token)| token)
            .collect();
        assert_eq!(fired, vec![wheel(1), wheel(2), wheel(3)]);
        assert_eq!(scheduler.now(), t0 + Duration::from_millis(20));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn timers_after_until_stay_pending() {
        let t0 = Instant::now();
        let mut scheduler = ManualScheduler::new(t0);
        scheduler.schedule(t0 + Duration::from_millis(50), wheel(1));

        assert_eq!(scheduler.pop_due(t0 + Duration::from_millis(49)), None);
        assert_eq!(scheduler.next_deadline(), Some(t0 + Duration::from_millis(50)));
        assert_eq!(
            scheduler.pop_due(t0 + Duration::from_millis(50)),
            Some((t0 + Duration::from_millis(50), wheel(1)))
        );
    }

    #[test]
    fn cancel_is_idempotent() {
        let t0 = Instant::now();
        let mut scheduler = ManualScheduler::new(t0);
        let handle = scheduler.schedule(t0 + Duration::from_millis(5), wheel(1));
        scheduler.cancel(handle);
        scheduler.cancel(handle);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.pop_due(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn clock_never_goes_backwards() {
        let t0 = Instant::now();
        let mut scheduler = ManualScheduler::new(t0 + Duration::from_millis(10));
        scheduler.set_now(t0);
        assert_eq!(scheduler.now(), t0 + Duration::from_millis(10));
    }
}
