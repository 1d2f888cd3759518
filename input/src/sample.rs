use derive_more::{Display, From};
use tactile_geometry::Point;

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

/// A logical pointer, for example the mouse or a single touch contact.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Display, From)]
#[display("pointer#{_0}")]
pub struct PointerId(pub u64);

/// A target surface pointer input is delivered to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, From)]
#[display("surface#{_0}")]
pub struct SurfaceId(pub u64);

/// A raw pointer position at a point in time, as reported by the host.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PointerSample {
    pub pos: Point,
    pub time: Instant,
}

impl PointerSample {
    pub fn new(pos: impl Into<Point>, time: Instant) -> Self {
        Self {
            pos: pos.into(),
            time,
        }
    }

    /// The same position, observed at a later time. Used for gestures that are caused by timers.
    pub fn at(self, time: Instant) -> Self {
        Self { time, ..self }
    }
}
