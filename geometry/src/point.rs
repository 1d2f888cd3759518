use std::ops::{Add, Div, Sub};

use serde_tuple::{Deserialize_tuple, Serialize_tuple};

/// A position on a pointer surface in surface coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize_tuple, Deserialize_tuple)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Deltas share the representation of points.
pub type Vector = Point;

impl Point {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Applies `f` to both components.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y))
    }

    /// The larger of the absolute components.
    pub fn max_abs(&self) -> f64 {
        self.x.abs().max(self.y.abs())
    }

    /// Truncates both components toward zero.
    pub fn trunc(self) -> Self {
        self.map(f64::trunc)
    }

    /// Replaces NaN and infinite components with zero.
    pub fn finite_or_zero(self) -> Self {
        self.map(|v| if v.is_finite() { v } else { 0.0 })
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for Point {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Div<f64> for Vector {
    type Output = Vector;

    fn div(self, divisor: f64) -> Vector {
        self.map(|v| v / divisor)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn trunc_rounds_toward_zero() {
        assert_eq!(Point::new(1.6, -1.6).trunc(), Point::new(1.0, -1.0));
        assert!(Point::new(0.4, -0.4).trunc().is_zero());
    }

    #[test]
    fn non_finite_components_become_zero() {
        assert!(Point::new(f64::NAN, f64::INFINITY).finite_or_zero().is_zero());
        assert_eq!(
            Point::new(3.0, f64::NEG_INFINITY).finite_or_zero(),
            Point::new(3.0, 0.0)
        );
    }

    #[test]
    fn deltas() {
        let v: Vector = (-3.0, 4.0).into();
        assert_eq!(v.max_abs(), 4.0);
        assert_eq!(Point::new(2.0, 2.0) - Point::new(1.0, 3.0), Vector::new(1.0, -1.0));
        assert_eq!(Point::new(1.0, 3.0) + v, Point::new(-2.0, 7.0));
        let scaled = v / 3.0;
        assert_relative_eq!(scaled.x, -1.0);
        assert_relative_eq!(scaled.y, 4.0 / 3.0);
    }
}
