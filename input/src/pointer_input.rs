use crate::{Instant, PointerId, PointerSample, WheelInput};

/// Raw input of a single pointer on a surface.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum PointerInput {
    Down(PointerSample),
    Move(PointerSample),
    Up(PointerSample),
    /// The pointer left the surface.
    Leave(PointerSample),
    /// The pointer entered the surface.
    Enter(PointerSample),
}

impl PointerInput {
    pub fn sample(&self) -> PointerSample {
        use PointerInput::*;
        match *self {
            Down(sample) | Move(sample) | Up(sample) | Leave(sample) | Enter(sample) => sample,
        }
    }

    pub fn time(&self) -> Instant {
        self.sample().time
    }
}

/// Everything a host may deliver to a [`crate::GestureSurface`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum SurfaceInput {
    Pointer {
        pointer: PointerId,
        input: PointerInput,
    },
    Wheel {
        sample: PointerSample,
        input: WheelInput,
    },
    /// Tear down the session of a pointer without classifying it, for example because the target
    /// was removed.
    Cancel(PointerId),
}

impl SurfaceInput {
    /// The time the input was observed, `None` for cancellations.
    pub fn time(&self) -> Option<Instant> {
        match self {
            SurfaceInput::Pointer { input, .. } => Some(input.time()),
            SurfaceInput::Wheel { sample, .. } => Some(sample.time),
            SurfaceInput::Cancel(_) => None,
        }
    }
}
