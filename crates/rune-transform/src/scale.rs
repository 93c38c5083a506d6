//! Scale transform about a pivot.

use std::fmt;

use crate::any::AnyTransform;
use crate::error::{Result, TransformError};
use crate::geometry::Point3D;
use crate::matrix::Matrix3x4;
use crate::property::{Property, assign_all};
use crate::transform::{Transform, TransformBase, TransformRef};

/// Scales by `(x, y, z)` while holding the pivot fixed.
#[derive(Debug, Clone)]
pub struct Scale {
    x: Property<f64>,
    y: Property<f64>,
    z: Property<f64>,
    pivot_x: Property<f64>,
    pivot_y: Property<f64>,
    pivot_z: Property<f64>,
    base: TransformBase,
}

impl Default for Scale {
    fn default() -> Self {
        Self::with_pivot_3d(1.0, 1.0, 1.0, 0.0, 0.0, 0.0)
    }
}

impl Scale {
    pub fn new_2d(x: f64, y: f64) -> Self {
        Self::with_pivot_3d(x, y, 1.0, 0.0, 0.0, 0.0)
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self::with_pivot_3d(x, y, z, 0.0, 0.0, 0.0)
    }

    pub fn with_pivot(x: f64, y: f64, pivot_x: f64, pivot_y: f64) -> Self {
        Self::with_pivot_3d(x, y, 1.0, pivot_x, pivot_y, 0.0)
    }

    pub fn with_pivot_3d(x: f64, y: f64, z: f64, pivot_x: f64, pivot_y: f64, pivot_z: f64) -> Self {
        let matrix = scale_matrix([x, y, z], [pivot_x, pivot_y, pivot_z]);
        Self {
            x: Property::new("x", x),
            y: Property::new("y", y),
            z: Property::new("z", z),
            pivot_x: Property::new("pivotX", pivot_x),
            pivot_y: Property::new("pivotY", pivot_y),
            pivot_z: Property::new("pivotZ", pivot_z),
            base: TransformBase::new(&matrix),
        }
    }

    pub fn x(&self) -> f64 {
        self.x.get()
    }

    pub fn y(&self) -> f64 {
        self.y.get()
    }

    pub fn z(&self) -> f64 {
        self.z.get()
    }

    pub fn pivot_x(&self) -> f64 {
        self.pivot_x.get()
    }

    pub fn pivot_y(&self) -> f64 {
        self.pivot_y.get()
    }

    pub fn pivot_z(&self) -> f64 {
        self.pivot_z.get()
    }

    pub fn pivot(&self) -> Point3D {
        Point3D::new(self.pivot_x(), self.pivot_y(), self.pivot_z())
    }

    pub fn set_x(&mut self, x: f64) {
        if assign_all([&mut self.x], [x]) {
            self.changed();
        }
    }

    pub fn set_y(&mut self, y: f64) {
        if assign_all([&mut self.y], [y]) {
            self.changed();
        }
    }

    pub fn set_z(&mut self, z: f64) {
        if assign_all([&mut self.z], [z]) {
            self.changed();
        }
    }

    pub fn set_pivot_x(&mut self, pivot_x: f64) {
        if assign_all([&mut self.pivot_x], [pivot_x]) {
            self.changed();
        }
    }

    pub fn set_pivot_y(&mut self, pivot_y: f64) {
        if assign_all([&mut self.pivot_y], [pivot_y]) {
            self.changed();
        }
    }

    pub fn set_pivot_z(&mut self, pivot_z: f64) {
        if assign_all([&mut self.pivot_z], [pivot_z]) {
            self.changed();
        }
    }

    /// Set all three factors as one change.
    pub fn set_factors(&mut self, x: f64, y: f64, z: f64) {
        if assign_all([&mut self.x, &mut self.y, &mut self.z], [x, y, z]) {
            self.changed();
        }
    }

    /// Move the pivot as one change.
    pub fn set_pivot(&mut self, pivot: Point3D) {
        if assign_all(
            [&mut self.pivot_x, &mut self.pivot_y, &mut self.pivot_z],
            [pivot.x, pivot.y, pivot.z],
        ) {
            self.changed();
        }
    }

    pub fn x_property(&mut self) -> &mut Property<f64> {
        &mut self.x
    }

    pub fn y_property(&mut self) -> &mut Property<f64> {
        &mut self.y
    }

    pub fn z_property(&mut self) -> &mut Property<f64> {
        &mut self.z
    }

    pub fn pivot_x_property(&mut self) -> &mut Property<f64> {
        &mut self.pivot_x
    }

    pub fn pivot_y_property(&mut self) -> &mut Property<f64> {
        &mut self.pivot_y
    }

    pub fn pivot_z_property(&mut self) -> &mut Property<f64> {
        &mut self.pivot_z
    }

    pub(crate) fn factors(&self) -> [f64; 3] {
        [self.x(), self.y(), self.z()]
    }

    pub(crate) fn pivots(&self) -> [f64; 3] {
        [self.pivot_x(), self.pivot_y(), self.pivot_z()]
    }

    fn changed(&mut self) {
        let matrix = self.to_matrix();
        self.base.matrix_changed(&matrix);
    }
}

fn scale_matrix([x, y, z]: [f64; 3], [px, py, pz]: [f64; 3]) -> Matrix3x4 {
    Matrix3x4::new(
        x,
        0.0,
        0.0,
        (1.0 - x) * px,
        0.0,
        y,
        0.0,
        (1.0 - y) * py,
        0.0,
        0.0,
        z,
        (1.0 - z) * pz,
    )
}

impl Transform for Scale {
    fn to_matrix(&self) -> Matrix3x4 {
        scale_matrix(self.factors(), self.pivots())
    }

    fn base(&self) -> &TransformBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        &mut self.base
    }

    fn as_variant(&self) -> TransformRef<'_> {
        TransformRef::Scale(self)
    }

    fn create_inverse(&self) -> Result<AnyTransform> {
        let [x, y, z] = self.factors();
        if x == 0.0 || y == 0.0 || z == 0.0 {
            return Err(TransformError::determinant_is_zero());
        }
        let [px, py, pz] = self.pivots();
        Ok(Scale::with_pivot_3d(1.0 / x, 1.0 / y, 1.0 / z, px, py, pz).into())
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scale [x={}, y={}, z={}, pivot_x={}, pivot_y={}, pivot_z={}]",
            self.x(),
            self.y(),
            self.z(),
            self.pivot_x(),
            self.pivot_y(),
            self.pivot_z()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TransformEventType;
    use crate::geometry::Point2D;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_pivot_stays_fixed() {
        let s = Scale::with_pivot(2.0, 3.0, 10.0, 20.0);
        assert_eq!(s.transform_xy(10.0, 20.0).unwrap(), Point2D::new(10.0, 20.0));
        assert_eq!(s.transform_xy(11.0, 21.0).unwrap(), Point2D::new(12.0, 23.0));
        assert_eq!(s.tx(), -10.0);
        assert_eq!(s.ty(), -40.0);
    }

    #[test]
    fn test_zero_factor_is_not_invertible() {
        let s = Scale::new_2d(0.0, 5.0);
        assert!(matches!(s.create_inverse(), Err(TransformError::NonInvertible(_))));
        assert!(s.inverse_transform_xy(1.0, 1.0).is_err());
    }

    #[test]
    fn test_inverse_keeps_pivot() {
        let s = Scale::with_pivot_3d(2.0, 4.0, 8.0, 1.0, 2.0, 3.0);
        let AnyTransform::Scale(inv) = s.create_inverse().unwrap() else {
            panic!("inverse of a scale should be a scale");
        };
        assert_eq!(inv.factors(), [0.5, 0.25, 0.125]);
        assert_eq!(inv.pivot(), Point3D::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_set_pivot_fires_once() {
        let mut s = Scale::new_2d(2.0, 2.0);
        let events = Rc::new(Cell::new(0));
        let e = events.clone();
        s.add_event_handler(TransformEventType::TransformChanged, move |_| e.set(e.get() + 1));

        s.set_pivot(Point3D::new(1.0, 1.0, 0.0));
        assert_eq!(events.get(), 1);
        s.set_factors(2.0, 2.0, 1.0);
        assert_eq!(events.get(), 1);
        s.set_factors(1.0, 1.0, 1.0);
        assert_eq!(events.get(), 2);
        assert!(s.is_identity());
    }
}
