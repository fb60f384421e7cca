use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Immutable 2D vector in canvas space (x grows right, y grows down).
///
/// Every operation returns a new vector; nothing mutates in place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2d {
    pub x: f32,
    pub y: f32,
}

impl Vec2d {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0);
    pub const UP: Self = Self::new(0.0, -1.0);
    pub const DOWN: Self = Self::new(0.0, 1.0);
    pub const LEFT: Self = Self::new(-1.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Component-wise product.
    pub fn mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    pub fn div_scalar(self, divisor: f32) -> Self {
        Self::new(self.x / divisor, self.y / divisor)
    }

    pub fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    pub fn dot(self, other: Self) -> f32 {
        Vec2::from(self).dot(other.into())
    }

    /// Z component of the 3D cross product of the two vectors.
    pub fn cross(self, other: Self) -> f32 {
        Vec2::from(self).perp_dot(other.into())
    }

    pub fn length(self) -> f32 {
        Vec2::from(self).length()
    }

    pub fn length_squared(self) -> f32 {
        Vec2::from(self).length_squared()
    }

    pub fn distance(self, other: Self) -> f32 {
        Vec2::from(self).distance(other.into())
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Self {
        Vec2::from(self).normalize_or_zero().into()
    }

    /// Rotate counter-clockwise (in y-up terms) about the origin.
    pub fn rotate(self, radians: f32) -> Self {
        Vec2::from_angle(radians).rotate(self.into()).into()
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Vec2::from(self).lerp(other.into(), t).into()
    }

    /// Angle from the positive x axis, in radians.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl From<Vec2> for Vec2d {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vec2d> for Vec2 {
    fn from(v: Vec2d) -> Self {
        Vec2::new(v.x, v.y)
    }
}

impl From<(f32, f32)> for Vec2d {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Vec2d> for (f32, f32) {
    fn from(v: Vec2d) -> Self {
        (v.x, v.y)
    }
}

impl Add for Vec2d {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Vec2d::add(self, rhs)
    }
}

impl Sub for Vec2d {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Vec2d::sub(self, rhs)
    }
}

impl Mul<f32> for Vec2d {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl Mul for Vec2d {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Vec2d::mul(self, rhs)
    }
}

impl Div<f32> for Vec2d {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        self.div_scalar(rhs)
    }
}

impl Neg for Vec2d {
    type Output = Self;

    fn neg(self) -> Self {
        Vec2d::neg(self)
    }
}

impl fmt::Display for Vec2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
