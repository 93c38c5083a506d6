//! Shear transform.

use std::fmt;

use crate::affine::Affine;
use crate::any::AnyTransform;
use crate::error::Result;
use crate::geometry::Point2D;
use crate::matrix::Matrix3x4;
use crate::property::{Property, assign_all};
use crate::transform::{Transform, TransformBase, TransformRef};

/// Shears in the xy plane: `x' = x + x_factor * y`, `y' = y_factor * x + y`,
/// measured from the pivot.
#[derive(Debug, Clone)]
pub struct Shear {
    x: Property<f64>,
    y: Property<f64>,
    pivot_x: Property<f64>,
    pivot_y: Property<f64>,
    base: TransformBase,
}

impl Default for Shear {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Shear {
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_pivot(x, y, 0.0, 0.0)
    }

    pub fn with_pivot(x: f64, y: f64, pivot_x: f64, pivot_y: f64) -> Self {
        Self {
            x: Property::new("x", x),
            y: Property::new("y", y),
            pivot_x: Property::new("pivotX", pivot_x),
            pivot_y: Property::new("pivotY", pivot_y),
            base: TransformBase::new(&shear_matrix(x, y, pivot_x, pivot_y)),
        }
    }

    pub fn x(&self) -> f64 {
        self.x.get()
    }

    pub fn y(&self) -> f64 {
        self.y.get()
    }

    pub fn pivot_x(&self) -> f64 {
        self.pivot_x.get()
    }

    pub fn pivot_y(&self) -> f64 {
        self.pivot_y.get()
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

    /// Set both factors as one change.
    pub fn set_factors(&mut self, x: f64, y: f64) {
        if assign_all([&mut self.x, &mut self.y], [x, y]) {
            self.changed();
        }
    }

    /// Move the pivot as one change.
    pub fn set_pivot(&mut self, pivot: Point2D) {
        if assign_all([&mut self.pivot_x, &mut self.pivot_y], [pivot.x, pivot.y]) {
            self.changed();
        }
    }

    pub fn x_property(&mut self) -> &mut Property<f64> {
        &mut self.x
    }

    pub fn y_property(&mut self) -> &mut Property<f64> {
        &mut self.y
    }

    pub fn pivot_x_property(&mut self) -> &mut Property<f64> {
        &mut self.pivot_x
    }

    pub fn pivot_y_property(&mut self) -> &mut Property<f64> {
        &mut self.pivot_y
    }

    fn changed(&mut self) {
        let matrix = self.to_matrix();
        self.base.matrix_changed(&matrix);
    }
}

fn shear_matrix(x: f64, y: f64, pivot_x: f64, pivot_y: f64) -> Matrix3x4 {
    Matrix3x4::new_2d(1.0, x, -x * pivot_y, y, 1.0, -y * pivot_x)
}

impl Transform for Shear {
    fn to_matrix(&self) -> Matrix3x4 {
        shear_matrix(self.x(), self.y(), self.pivot_x(), self.pivot_y())
    }

    fn base(&self) -> &TransformBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        &mut self.base
    }

    fn as_variant(&self) -> TransformRef<'_> {
        TransformRef::Shear(self)
    }

    fn create_inverse(&self) -> Result<AnyTransform> {
        let (x, y) = (self.x(), self.y());
        let (pivot_x, pivot_y) = (self.pivot_x(), self.pivot_y());
        if y == 0.0 {
            return Ok(Shear::with_pivot(-x, 0.0, pivot_x, pivot_y).into());
        }
        if x == 0.0 {
            return Ok(Shear::with_pivot(0.0, -y, pivot_x, pivot_y).into());
        }
        Ok(Affine::from(self.inverse_matrix()?).into())
    }
}

impl fmt::Display for Shear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Shear [x={}, y={}, pivot_x={}, pivot_y={}]",
            self.x(),
            self.y(),
            self.pivot_x(),
            self.pivot_y()
        )
    }
}
