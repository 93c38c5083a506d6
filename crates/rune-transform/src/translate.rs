//! Translation transform.

use std::fmt;

use crate::any::AnyTransform;
use crate::error::Result;
use crate::matrix::Matrix3x4;
use crate::property::{Property, assign_all};
use crate::transform::{Transform, TransformBase, TransformRef};

/// Moves every point by `(x, y, z)`.
#[derive(Debug, Clone)]
pub struct Translate {
    x: Property<f64>,
    y: Property<f64>,
    z: Property<f64>,
    base: TransformBase,
}

impl Default for Translate {
    fn default() -> Self {
        Self::new_3d(0.0, 0.0, 0.0)
    }
}

impl Translate {
    pub fn new(x: f64, y: f64) -> Self {
        Self::new_3d(x, y, 0.0)
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Property::new("x", x),
            y: Property::new("y", y),
            z: Property::new("z", z),
            base: TransformBase::new(&Matrix3x4::translation(x, y, z)),
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

    /// Set all three components as one change.
    pub fn set(&mut self, x: f64, y: f64, z: f64) {
        if assign_all([&mut self.x, &mut self.y, &mut self.z], [x, y, z]) {
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

    fn changed(&mut self) {
        let matrix = self.to_matrix();
        self.base.matrix_changed(&matrix);
    }
}

impl Transform for Translate {
    fn to_matrix(&self) -> Matrix3x4 {
        Matrix3x4::translation(self.x(), self.y(), self.z())
    }

    fn base(&self) -> &TransformBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        &mut self.base
    }

    fn as_variant(&self) -> TransformRef<'_> {
        TransformRef::Translate(self)
    }

    fn create_inverse(&self) -> Result<AnyTransform> {
        Ok(Translate::new_3d(-self.x(), -self.y(), -self.z()).into())
    }
}

impl fmt::Display for Translate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Translate [x={}, y={}, z={}]", self.x(), self.y(), self.z())
    }
}
