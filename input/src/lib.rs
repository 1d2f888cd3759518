//! Classifies raw pointer input into gestures: clicks, double clicks, drags, drag pauses, hold
//! repeats, and normalized wheel steps.
//!
//! A [`GestureSurface`] receives the pointer input of one target. Each pressed pointer gets its own
//! session that is driven by a pure state machine ([`Classifier`]) and timers the host provides
//! through a [`Scheduler`]. Subscribers register for a set of [`GestureKinds`] and receive
//! classified [`GestureEvent`]s synchronously and in order.
mod classifier;
mod config;
#[cfg(not(target_arch = "wasm32"))]
mod driver;
mod gesture;
mod pointer_input;
mod sample;
mod session;
mod surface;
mod timer;
mod wheel;

pub use classifier::*;
pub use config::*;
#[cfg(not(target_arch = "wasm32"))]
pub use driver::*;
pub use gesture::*;
pub use pointer_input::*;
pub use sample::*;
pub use surface::*;
pub use timer::*;
pub use wheel::*;
