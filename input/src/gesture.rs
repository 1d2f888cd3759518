use bitflags::bitflags;
use serde::Serialize;
use tactile_geometry::Vector;

use crate::PointerSample;

/// A classified gesture.
///
/// Drag family gestures report `total`, the delta from the position where the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Gesture {
    /// The pointer went down. Emitted immediately and independent of any later classification.
    MouseDown,
    /// The pointer went up the first time in a press cycle. Only emitted when
    /// [`crate::GestureConfig::any_click_on_release`] is enabled.
    AnyClick,
    /// The pointer was released and no second press followed within the click window.
    SingleClick,
    /// A second press arrived within the click window after a release.
    DoubleClick,
    /// The pointer was held down for the click window.
    DragStart,
    /// The pointer moved while dragging. `delta` is relative to the previous sample.
    Drag { delta: Vector, total: Vector },
    /// The pointer did not move for the drag pause duration while dragging. Fires once per pause.
    DragPause { total: Vector },
    /// The pointer was released after a drag started.
    DragEnd { total: Vector },
    /// The pointer entered the surface while dragging.
    DragEnter { total: Vector },
    /// The pointer left the surface while dragging.
    DragLeave { total: Vector },
    /// Fires periodically while the pointer is held, like a held key.
    MouseRepeat,
    /// A normalized wheel step. `delta` multiplied by `factor` approximates the raw delta.
    MouseWheel { delta: Vector, factor: f64 },
}

bitflags! {
    /// A set of gesture kinds, used to select the gestures a subscriber receives.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GestureKinds: u16 {
        const MOUSE_DOWN = 1 << 0;
        const ANY_CLICK = 1 << 1;
        const SINGLE_CLICK = 1 << 2;
        const DOUBLE_CLICK = 1 << 3;
        const DRAG_START = 1 << 4;
        const DRAG = 1 << 5;
        const DRAG_PAUSE = 1 << 6;
        const DRAG_END = 1 << 7;
        const DRAG_ENTER = 1 << 8;
        const DRAG_LEAVE = 1 << 9;
        const MOUSE_REPEAT = 1 << 10;
        const MOUSE_WHEEL = 1 << 11;

        const CLICKS = Self::ANY_CLICK.bits()
            | Self::SINGLE_CLICK.bits()
            | Self::DOUBLE_CLICK.bits();
        const DRAGGING = Self::DRAG_START.bits()
            | Self::DRAG.bits()
            | Self::DRAG_PAUSE.bits()
            | Self::DRAG_END.bits()
            | Self::DRAG_ENTER.bits()
            | Self::DRAG_LEAVE.bits();
    }
}

impl Gesture {
    pub fn kind(&self) -> GestureKinds {
        use Gesture::*;
        match self {
            MouseDown => GestureKinds::MOUSE_DOWN,
            AnyClick => GestureKinds::ANY_CLICK,
            SingleClick => GestureKinds::SINGLE_CLICK,
            DoubleClick => GestureKinds::DOUBLE_CLICK,
            DragStart => GestureKinds::DRAG_START,
            Drag { .. } => GestureKinds::DRAG,
            DragPause { .. } => GestureKinds::DRAG_PAUSE,
            DragEnd { .. } => GestureKinds::DRAG_END,
            DragEnter { .. } => GestureKinds::DRAG_ENTER,
            DragLeave { .. } => GestureKinds::DRAG_LEAVE,
            MouseRepeat => GestureKinds::MOUSE_REPEAT,
            MouseWheel { .. } => GestureKinds::MOUSE_WHEEL,
        }
    }
}

/// A gesture together with the sample it originated from.
///
/// For gestures caused by a timer, the sample is the most recent pointer position stamped with
/// the time the timer fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub sample: PointerSample,
    pub gesture: Gesture,
}

impl GestureEvent {
    pub fn new(sample: PointerSample, gesture: Gesture) -> Self {
        Self { sample, gesture }
    }

    pub fn kind(&self) -> GestureKinds {
        self.gesture.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_kinds_contain_their_members() {
        assert!(GestureKinds::CLICKS.contains(GestureKinds::SINGLE_CLICK));
        assert!(!GestureKinds::CLICKS.contains(GestureKinds::MOUSE_DOWN));
        assert!(GestureKinds::DRAGGING.contains(Gesture::DragEnd { total: Vector::ZERO }.kind()));
        assert!(!GestureKinds::DRAGGING.contains(Gesture::MouseRepeat.kind()));
    }

    #[test]
    fn every_gesture_maps_to_a_single_kind() {
        let v = Vector::ZERO;
        let gestures = [
            Gesture::MouseDown,
            Gesture::AnyClick,
            Gesture::SingleClick,
            Gesture::DoubleClick,
            Gesture::DragStart,
            Gesture::Drag { delta: v, total: v },
            Gesture::DragPause { total: v },
            Gesture::DragEnd { total: v },
            Gesture::DragEnter { total: v },
            Gesture::DragLeave { total: v },
            Gesture::MouseRepeat,
            Gesture::MouseWheel {
                delta: v,
                factor: 1.0,
            },
        ];
        let all = gestures
            .iter()
            .fold(GestureKinds::empty(), |acc, g| {
                assert_eq!(g.kind().bits().count_ones(), 1);
                assert!(!acc.contains(g.kind()));
                acc | g.kind()
            });
        assert_eq!(all, GestureKinds::all());
    }
}
