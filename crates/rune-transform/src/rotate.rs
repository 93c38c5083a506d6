//! Rotation transform about an axis through a pivot.

use std::fmt;

use crate::any::AnyTransform;
use crate::error::Result;
use crate::geometry::Point3D;
use crate::matrix::Matrix3x4;
use crate::property::{Property, assign_all};
use crate::transform::{Transform, TransformBase, TransformRef};

/// Rotates by `angle` degrees about `axis`, holding the pivot fixed.
///
/// The axis does not need to be normalized. A zero-length axis rotates about
/// the z axis.
#[derive(Debug, Clone)]
pub struct Rotate {
    angle: Property<f64>,
    axis: Property<Point3D>,
    pivot_x: Property<f64>,
    pivot_y: Property<f64>,
    pivot_z: Property<f64>,
    base: TransformBase,
}

impl Default for Rotate {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Rotate {
    pub const X_AXIS: Point3D = Point3D::new(1.0, 0.0, 0.0);
    pub const Y_AXIS: Point3D = Point3D::new(0.0, 1.0, 0.0);
    pub const Z_AXIS: Point3D = Point3D::new(0.0, 0.0, 1.0);

    /// Rotation about the z axis through the origin.
    pub fn new(angle: f64) -> Self {
        Self::with_pivot_and_axis(angle, Point3D::ZERO, Self::Z_AXIS)
    }

    pub fn with_pivot(angle: f64, pivot_x: f64, pivot_y: f64) -> Self {
        Self::with_pivot_and_axis(angle, Point3D::new(pivot_x, pivot_y, 0.0), Self::Z_AXIS)
    }

    pub fn with_pivot_3d(angle: f64, pivot_x: f64, pivot_y: f64, pivot_z: f64) -> Self {
        Self::with_pivot_and_axis(angle, Point3D::new(pivot_x, pivot_y, pivot_z), Self::Z_AXIS)
    }

    pub fn with_axis(angle: f64, axis: Point3D) -> Self {
        Self::with_pivot_and_axis(angle, Point3D::ZERO, axis)
    }

    pub fn with_pivot_and_axis(angle: f64, pivot: Point3D, axis: Point3D) -> Self {
        Self {
            angle: Property::new("angle", angle),
            axis: Property::new("axis", axis),
            pivot_x: Property::new("pivotX", pivot.x),
            pivot_y: Property::new("pivotY", pivot.y),
            pivot_z: Property::new("pivotZ", pivot.z),
            base: TransformBase::new(&rotation_matrix(angle, axis, pivot)),
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle.get()
    }

    pub fn axis(&self) -> Point3D {
        self.axis.get()
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

    pub fn set_angle(&mut self, angle: f64) {
        if assign_all([&mut self.angle], [angle]) {
            self.changed();
        }
    }

    pub fn set_axis(&mut self, axis: Point3D) {
        if assign_all([&mut self.axis], [axis]) {
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

    /// Move the pivot as one change.
    pub fn set_pivot(&mut self, pivot: Point3D) {
        if assign_all(
            [&mut self.pivot_x, &mut self.pivot_y, &mut self.pivot_z],
            [pivot.x, pivot.y, pivot.z],
        ) {
            self.changed();
        }
    }

    pub fn angle_property(&mut self) -> &mut Property<f64> {
        &mut self.angle
    }

    pub fn axis_property(&mut self) -> &mut Property<Point3D> {
        &mut self.axis
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

    /// Whether `other` rotates about the same axis, given raw or normalized.
    ///
    /// Axes too short to normalize all count as the same degenerate axis.
    pub(crate) fn same_axis(&self, other: &Rotate) -> bool {
        let (a, b) = (self.axis(), other.axis());
        a == b || a.normalize() == b.normalize()
    }

    fn changed(&mut self) {
        let matrix = self.to_matrix();
        self.base.matrix_changed(&matrix);
    }
}

fn rotation_matrix(angle: f64, axis: Point3D, pivot: Point3D) -> Matrix3x4 {
    Matrix3x4::rotation(angle, axis)
        .unwrap_or_else(|| Matrix3x4::rotation_2d(angle))
        .about_pivot(pivot.x, pivot.y, pivot.z)
}

impl Transform for Rotate {
    fn to_matrix(&self) -> Matrix3x4 {
        rotation_matrix(self.angle(), self.axis(), self.pivot())
    }

    fn base(&self) -> &TransformBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        &mut self.base
    }

    fn as_variant(&self) -> TransformRef<'_> {
        TransformRef::Rotate(self)
    }

    fn create_inverse(&self) -> Result<AnyTransform> {
        Ok(Rotate::with_pivot_and_axis(-self.angle(), self.pivot(), self.axis()).into())
    }
}

impl fmt::Display for Rotate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = self.axis();
        write!(
            f,
            "Rotate [angle={}, pivot_x={}, pivot_y={}, pivot_z={}, axis=({}, {}, {})]",
            self.angle(),
            self.pivot_x(),
            self.pivot_y(),
            self.pivot_z(),
            axis.x,
            axis.y,
            axis.z
        )
    }
}
