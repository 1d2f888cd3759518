//! Geometry primitives for pointer input.

mod point;

pub use point::*;
