//! Page-space geometry: vectors, axis-aligned bounds and rigid transforms.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 2D vector or point in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2 {
    /// Create a vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Rotate about the origin by `angle` radians.
    #[must_use]
    pub fn rot(self, angle: f64) -> Self {
        if angle == 0.0 {
            return self;
        }
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Distance to another point.
    #[must_use]
    pub fn dist(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Component-wise product.
impl Mul for Vec2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// An axis-aligned box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Bounds {
    /// Create bounds from origin and size.
    #[must_use]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Smallest box containing every point. `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    /// Left edge.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.w
    }

    /// Top edge.
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.h
    }

    /// Top-left corner.
    #[must_use]
    pub fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.min_x().min(other.min_x());
        let y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Self::new(x, y, max_x - x, max_y - y)
    }

    /// Grow the box by `amount` on every side.
    #[must_use]
    pub fn expand_by(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.w + amount * 2.0,
            self.h + amount * 2.0,
        )
    }

    /// Whether the vertical spans overlap. Touching edges count.
    #[must_use]
    pub fn overlaps_vertically(&self, other: &Self) -> bool {
        !(other.min_y() > self.max_y() || other.max_y() < self.min_y())
    }

    /// Whether the boxes overlap. Touching edges count.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.overlaps_vertically(other)
            && !(other.min_x() > self.max_x() || other.max_x() < self.min_x())
    }

    /// Whether `other` lies entirely inside this box.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.min_x() >= self.min_x()
            && other.max_x() <= self.max_x()
            && other.min_y() >= self.min_y()
            && other.max_y() <= self.max_y()
    }

    /// Whether origin and size are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.point().is_finite() && self.size().is_finite()
    }
}

/// A rigid transform (rotation followed by translation) from a shape's local
/// space into page space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageTransform {
    /// Page position of the local origin.
    pub translation: Vec2,
    /// Rotation in radians.
    pub rotation: f64,
}

impl PageTransform {
    /// Identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            translation: Vec2::zero(),
            rotation: 0.0,
        }
    }

    /// Map a local point into page space.
    #[must_use]
    pub fn apply(&self, point: Vec2) -> Vec2 {
        point.rot(self.rotation) + self.translation
    }

    /// Map a page point into this transform's local space.
    #[must_use]
    pub fn invert_point(&self, point: Vec2) -> Vec2 {
        (point - self.translation).rot(-self.rotation)
    }

    /// Transform of a child positioned at `local` with rotation `rotation`
    /// inside this one.
    #[must_use]
    pub fn compose(&self, local: Vec2, rotation: f64) -> Self {
        Self {
            translation: self.apply(local),
            rotation: self.rotation + rotation,
        }
    }
}
