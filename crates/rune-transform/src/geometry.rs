//! Points and axis-aligned bounds.

use serde::{Deserialize, Serialize};

/// A point (or vector) in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ZERO: Point2D = Point2D::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A point (or vector) in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub const ZERO: Point3D = Point3D::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point3D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    pub fn normalize(&self) -> Option<Point3D> {
        let mag = self.magnitude();
        if mag == 0.0 || !mag.is_finite() {
            return None;
        }
        Some(Point3D::new(self.x / mag, self.y / mag, self.z / mag))
    }
}

impl From<Point2D> for Point3D {
    fn from(p: Point2D) -> Self {
        Point3D::new(p.x, p.y, 0.0)
    }
}

/// Axis-aligned bounding box in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl Bounds {
    /// Create bounds from an origin and extents.
    pub fn new(x: f64, y: f64, z: f64, width: f64, height: f64, depth: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            min_z: z,
            max_x: x + width,
            max_y: y + height,
            max_z: z + depth,
        }
    }

    /// Create flat bounds in the z = 0 plane.
    pub fn new_2d(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, 0.0, width, height, 0.0)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    /// Whether the bounds lie entirely in the z = 0 plane.
    pub fn is_planar(&self) -> bool {
        self.min_z == 0.0 && self.max_z == 0.0
    }

    /// The four corners in the `min_z` plane.
    pub fn corners_2d(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.min_x, self.min_y),
            Point2D::new(self.max_x, self.min_y),
            Point2D::new(self.max_x, self.max_y),
            Point2D::new(self.min_x, self.max_y),
        ]
    }

    /// All eight corners.
    pub fn corners(&self) -> [Point3D; 8] {
        [
            Point3D::new(self.min_x, self.min_y, self.min_z),
            Point3D::new(self.min_x, self.min_y, self.max_z),
            Point3D::new(self.min_x, self.max_y, self.min_z),
            Point3D::new(self.min_x, self.max_y, self.max_z),
            Point3D::new(self.max_x, self.max_y, self.min_z),
            Point3D::new(self.max_x, self.max_y, self.max_z),
            Point3D::new(self.max_x, self.min_y, self.min_z),
            Point3D::new(self.max_x, self.min_y, self.max_z),
        ]
    }

    /// Smallest bounds containing all the given points.
    pub fn enclosing<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point3D>,
    {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let mut b = Self {
            min_x: first.x,
            min_y: first.y,
            min_z: first.z,
            max_x: first.x,
            max_y: first.y,
            max_z: first.z,
        };
        for p in iter {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.min_z = b.min_z.min(p.z);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
            b.max_z = b.max_z.max(p.z);
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosing() {
        let b = Bounds::enclosing([
            Point3D::new(1.0, 5.0, 0.0),
            Point3D::new(-2.0, 3.0, 4.0),
            Point3D::new(0.0, 7.0, -1.0),
        ]);
        assert_eq!(b.min_x, -2.0);
        assert_eq!(b.max_y, 7.0);
        assert_eq!(b.min_z, -1.0);
        assert_eq!(b.depth(), 5.0);
    }

    #[test]
    fn test_normalize() {
        let n = Point3D::new(0.0, 3.0, 4.0).normalize().unwrap();
        assert!((n.y - 0.6).abs() < 1e-12);
        assert!((n.z - 0.8).abs() < 1e-12);
        assert!(Point3D::ZERO.normalize().is_none());
    }

    #[test]
    fn test_planar() {
        assert!(Bounds::new_2d(0.0, 0.0, 10.0, 10.0).is_planar());
        assert!(!Bounds::new(0.0, 0.0, 1.0, 10.0, 10.0, 0.0).is_planar());
    }
}
