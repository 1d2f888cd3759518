//! Wheel normalization.
//!
//! Wheel deltas come in platform specific units and sign conventions. They are normalized to
//! `x` growing to the right and `y` growing upwards, and then divided by the smallest magnitude
//! seen in the current burst of wheel input, so that one notch or the smallest trackpad step
//! becomes 1.
use std::time::Duration;

use tactile_geometry::Vector;

use crate::{Gesture, Instant};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum WheelAxis {
    Horizontal,
    Vertical,
}

/// The raw shapes of wheel input.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum WheelInput {
    /// Standard `deltaX` / `deltaY`, positive `y` scrolls down.
    Pixels { x: f64, y: f64 },
    /// Legacy `wheelDeltaX` / `wheelDeltaY`, positive `y` scrolls up, positive `x` scrolls left.
    WheelDelta { x: f64, y: f64 },
    /// A legacy single axis delta, positive scrolls up (or left).
    Legacy { delta: f64, axis: WheelAxis },
    /// Anything else. Normalizes to zero.
    Unknown,
}

impl WheelInput {
    /// The delta with `x` growing to the right and `y` growing upwards. Non-finite components are
    /// zero.
    pub fn normalized(&self) -> Vector {
        let delta = match *self {
            WheelInput::Pixels { x, y } => Vector::new(x, -y),
            WheelInput::WheelDelta { x, y } => Vector::new(-x, y),
            WheelInput::Legacy {
                delta,
                axis: WheelAxis::Vertical,
            } => Vector::new(0.0, delta),
            WheelInput::Legacy {
                delta,
                axis: WheelAxis::Horizontal,
            } => Vector::new(-delta, 0.0),
            WheelInput::Unknown => Vector::ZERO,
        };
        delta.finite_or_zero()
    }
}

/// Tracks the normalization factor over a burst of wheel input.
#[derive(Debug, Default)]
pub struct WheelSmoother {
    factor: Option<f64>,
    last: Option<Instant>,
}

impl WheelSmoother {
    /// Classifies a wheel input at `time`.
    ///
    /// Returns `None` if the input carries no movement. `reset_after` is the quiet period after
    /// which the factor is seeded anew.
    pub fn smooth(
        &mut self,
        time: Instant,
        input: &WheelInput,
        reset_after: Duration,
    ) -> Option<Gesture> {
        let raw = input.normalized();
        if raw.is_zero() {
            return None;
        }

        if let Some(last) = self.last
            && time.saturating_duration_since(last) >= reset_after
        {
            self.reset();
        }

        let magnitude = raw.max_abs();
        let factor = match self.factor {
            Some(factor) if factor <= magnitude => factor,
            _ => magnitude,
        };
        self.factor = Some(factor);
        self.last = Some(time);

        Some(Gesture::MouseWheel {
            delta: (raw / factor).trunc(),
            factor,
        })
    }

    /// The current factor, `None` if no wheel input arrived since the last reset.
    pub fn factor(&self) -> Option<f64> {
        self.factor
    }

    pub fn reset(&mut self) {
        self.factor = None;
        self.last = None;
    }
}
