//! Plain 3x4 affine matrix values.
//!
//! [`Matrix3x4`] is the numeric core shared by every transform variant. It is a
//! `Copy` value with no notification machinery: the observable transforms
//! compute a new matrix here first and only then commit it, which is what makes
//! their compound mutations all-or-nothing.
//!
//! Layout (the fourth row `0 0 0 1` is implicit and never stored):
//! ```text
//! | mxx  mxy  mxz  tx |
//! | myx  myy  myz  ty |
//! | mzx  mzy  mzz  tz |
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TransformError};
use crate::geometry::{Point2D, Point3D};
use crate::matrix_type::MatrixType;

/// Names of the twelve stored matrix elements, in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixElement {
    Mxx,
    Mxy,
    Mxz,
    Tx,
    Myx,
    Myy,
    Myz,
    Ty,
    Mzx,
    Mzy,
    Mzz,
    Tz,
}

impl MatrixElement {
    pub const ALL: [MatrixElement; 12] = [
        MatrixElement::Mxx,
        MatrixElement::Mxy,
        MatrixElement::Mxz,
        MatrixElement::Tx,
        MatrixElement::Myx,
        MatrixElement::Myy,
        MatrixElement::Myz,
        MatrixElement::Ty,
        MatrixElement::Mzx,
        MatrixElement::Mzy,
        MatrixElement::Mzz,
        MatrixElement::Tz,
    ];

    /// Position in the row-major 3x4 element array.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Mxx => "mxx",
            Self::Mxy => "mxy",
            Self::Mxz => "mxz",
            Self::Tx => "tx",
            Self::Myx => "myx",
            Self::Myy => "myy",
            Self::Myz => "myz",
            Self::Ty => "ty",
            Self::Mzx => "mzx",
            Self::Mzy => "mzy",
            Self::Mzz => "mzz",
            Self::Tz => "tz",
        }
    }
}

/// Where a `(row, column)` of some [`MatrixType`] lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ElementSlot {
    /// One of the twelve stored elements.
    Stored(MatrixElement),
    /// A constant of the implicit last row.
    Structural(f64),
}

/// A 3D affine transformation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix3x4 {
    pub mxx: f64,
    pub mxy: f64,
    pub mxz: f64,
    pub tx: f64,
    pub myx: f64,
    pub myy: f64,
    pub myz: f64,
    pub ty: f64,
    pub mzx: f64,
    pub mzy: f64,
    pub mzz: f64,
    pub tz: f64,
}

impl Default for Matrix3x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3x4 {
    pub const IDENTITY: Matrix3x4 = Matrix3x4::new_2d(1.0, 0.0, 0.0, 0.0, 1.0, 0.0);

    /// Create a matrix from all twelve elements, row by row.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        mxx: f64,
        mxy: f64,
        mxz: f64,
        tx: f64,
        myx: f64,
        myy: f64,
        myz: f64,
        ty: f64,
        mzx: f64,
        mzy: f64,
        mzz: f64,
        tz: f64,
    ) -> Self {
        Self {
            mxx,
            mxy,
            mxz,
            tx,
            myx,
            myy,
            myz,
            ty,
            mzx,
            mzy,
            mzz,
            tz,
        }
    }

    /// Create a 2D matrix; the z row and column are left as identity.
    pub const fn new_2d(mxx: f64, mxy: f64, tx: f64, myx: f64, myy: f64, ty: f64) -> Self {
        Self::new(mxx, mxy, 0.0, tx, myx, myy, 0.0, ty, 0.0, 0.0, 1.0, 0.0)
    }

    /// Create a translation matrix.
    pub const fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, x, 0.0, 1.0, 0.0, y, 0.0, 0.0, 1.0, z)
    }

    /// Create a scale matrix about the origin.
    pub const fn scaling(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, 0.0, 0.0, 0.0, 0.0, y, 0.0, 0.0, 0.0, 0.0, z, 0.0)
    }

    /// Create a shear matrix: `x' = x + sx * y`, `y' = sy * x + y`.
    pub const fn shearing(x: f64, y: f64) -> Self {
        Self::new_2d(1.0, x, 0.0, y, 1.0, 0.0)
    }

    /// Create a rotation about the z axis. `angle` is in degrees.
    pub fn rotation_2d(angle: f64) -> Self {
        let (sin, cos) = sin_cos_degrees(angle);
        Self::new_2d(cos, -sin, 0.0, sin, cos, 0.0)
    }

    /// Create a rotation of `angle` degrees about `axis` through the origin.
    ///
    /// The axis does not need to be normalized. Returns `None` when the axis
    /// has zero length (including components so small their squares vanish).
    pub fn rotation(angle: f64, axis: Point3D) -> Option<Self> {
        let Point3D { x: ax, y: ay, z: az } = axis;
        if ax == 0.0 && ay == 0.0 {
            return if az > 0.0 {
                Some(Self::rotation_2d(angle))
            } else if az < 0.0 {
                Some(Self::rotation_2d(-angle))
            } else {
                None
            };
        }

        let mag = (ax * ax + ay * ay + az * az).sqrt();
        if mag == 0.0 {
            return None;
        }
        let inv = 1.0 / mag;
        let (ax, ay, az) = (ax * inv, ay * inv, az * inv);

        // Rodrigues' rotation formula
        let (sin, cos) = sin_cos_degrees(angle);
        let t = 1.0 - cos;
        let xy = ax * ay;
        let xz = ax * az;
        let yz = ay * az;

        Some(Self::new(
            t * ax * ax + cos,
            t * xy - sin * az,
            t * xz + sin * ay,
            0.0,
            t * xy + sin * az,
            t * ay * ay + cos,
            t * yz - sin * ax,
            0.0,
            t * xz - sin * ay,
            t * yz + sin * ax,
            t * az * az + cos,
            0.0,
        ))
    }

    /// The same operation, but holding `(px, py, pz)` fixed instead of the origin.
    ///
    /// Equivalent to `translate(p) * self * translate(-p)`.
    pub fn about_pivot(&self, px: f64, py: f64, pz: f64) -> Self {
        if px == 0.0 && py == 0.0 && pz == 0.0 {
            return *self;
        }
        Self::translation(px, py, pz)
            .then(self)
            .then(&Self::translation(-px, -py, -pz))
    }

    /// Compose this matrix with another (`self * other`).
    ///
    /// The result applies `other` first, then `self`.
    pub fn then(&self, other: &Self) -> Self {
        Self {
            mxx: self.mxx * other.mxx + self.mxy * other.myx + self.mxz * other.mzx,
            mxy: self.mxx * other.mxy + self.mxy * other.myy + self.mxz * other.mzy,
            mxz: self.mxx * other.mxz + self.mxy * other.myz + self.mxz * other.mzz,
            tx: self.mxx * other.tx + self.mxy * other.ty + self.mxz * other.tz + self.tx,
            myx: self.myx * other.mxx + self.myy * other.myx + self.myz * other.mzx,
            myy: self.myx * other.mxy + self.myy * other.myy + self.myz * other.mzy,
            myz: self.myx * other.mxz + self.myy * other.myz + self.myz * other.mzz,
            ty: self.myx * other.tx + self.myy * other.ty + self.myz * other.tz + self.ty,
            mzx: self.mzx * other.mxx + self.mzy * other.myx + self.mzz * other.mzx,
            mzy: self.mzx * other.mxy + self.mzy * other.myy + self.mzz * other.mzy,
            mzz: self.mzx * other.mxz + self.mzy * other.myz + self.mzz * other.mzz,
            tz: self.mzx * other.tx + self.mzy * other.ty + self.mzz * other.tz + self.tz,
        }
    }

    /// Pre-multiply: compose other after this (`other * self`).
    pub fn pre_multiply(&self, other: &Self) -> Self {
        other.then(self)
    }

    /// Whether the matrix has no out-of-plane effect.
    pub fn is_2d(&self) -> bool {
        self.mxz == 0.0
            && self.myz == 0.0
            && self.mzx == 0.0
            && self.mzy == 0.0
            && self.mzz == 1.0
            && self.tz == 0.0
    }

    /// Whether the matrix equals the identity exactly.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Determinant of the linear part. Translation does not contribute.
    pub fn determinant(&self) -> f64 {
        if self.is_2d() {
            return self.mxx * self.myy - self.mxy * self.myx;
        }
        self.mxx * (self.myy * self.mzz - self.mzy * self.myz)
            + self.mxy * (self.myz * self.mzx - self.mzz * self.myx)
            + self.mxz * (self.myx * self.mzy - self.mzx * self.myy)
    }

    /// Compute the inverse matrix.
    ///
    /// Fails with [`TransformError::NonInvertible`] when the determinant is
    /// exactly zero.
    pub fn inverse(&self) -> Result<Self> {
        if self.is_2d() {
            self.inverse_2d()
        } else {
            self.inverse_3d()
        }
    }

    fn inverse_2d(&self) -> Result<Self> {
        let det = self.mxx * self.myy - self.mxy * self.myx;
        if det == 0.0 {
            return Err(TransformError::determinant_is_zero());
        }
        Ok(Self::new_2d(
            self.myy / det,
            -self.mxy / det,
            (self.mxy * self.ty - self.myy * self.tx) / det,
            -self.myx / det,
            self.mxx / det,
            (self.myx * self.tx - self.mxx * self.ty) / det,
        ))
    }

    fn inverse_3d(&self) -> Result<Self> {
        let Self {
            mxx,
            mxy,
            mxz,
            tx,
            myx,
            myy,
            myz,
            ty,
            mzx,
            mzy,
            mzz,
            tz,
        } = *self;

        let det = mxx * (myy * mzz - mzy * myz)
            + mxy * (myz * mzx - mzz * myx)
            + mxz * (myx * mzy - mzx * myy);
        if det == 0.0 {
            return Err(TransformError::determinant_is_zero());
        }

        // Transposed cofactors; the minors of the implicit last column reduce
        // to {0, 0, 0, det} and drop out.
        let cxx = myy * mzz - myz * mzy;
        let cyx = -myx * mzz + myz * mzx;
        let czx = myx * mzy - myy * mzx;
        let cxt = -mxy * (myz * tz - mzz * ty)
            - mxz * (ty * mzy - tz * myy)
            - tx * (myy * mzz - mzy * myz);
        let cxy = -mxy * mzz + mxz * mzy;
        let cyy = mxx * mzz - mxz * mzx;
        let czy = -mxx * mzy + mxy * mzx;
        let cyt = mxx * (myz * tz - mzz * ty)
            + mxz * (ty * mzx - tz * myx)
            + tx * (myx * mzz - mzx * myz);
        let cxz = mxy * myz - mxz * myy;
        let cyz = -mxx * myz + mxz * myx;
        let czz = mxx * myy - mxy * myx;
        let czt = -mxx * (myy * tz - mzy * ty)
            - mxy * (ty * mzx - tz * myx)
            - tx * (myx * mzy - mzx * myy);

        Ok(Self::new(
            cxx / det,
            cxy / det,
            cxz / det,
            cxt / det,
            cyx / det,
            cyy / det,
            cyz / det,
            cyt / det,
            czx / det,
            czy / det,
            czz / det,
            czt / det,
        ))
    }

    /// Apply this matrix to a 3D point.
    pub fn apply_point(&self, x: f64, y: f64, z: f64) -> Point3D {
        Point3D::new(
            self.mxx * x + self.mxy * y + self.mxz * z + self.tx,
            self.myx * x + self.myy * y + self.myz * z + self.ty,
            self.mzx * x + self.mzy * y + self.mzz * z + self.tz,
        )
    }

    /// Apply this matrix to a 3D vector (ignores translation).
    pub fn apply_vector(&self, x: f64, y: f64, z: f64) -> Point3D {
        Point3D::new(
            self.mxx * x + self.mxy * y + self.mxz * z,
            self.myx * x + self.myy * y + self.myz * z,
            self.mzx * x + self.mzy * y + self.mzz * z,
        )
    }

    /// Apply the 2D part of this matrix to a point in the z = 0 plane.
    pub fn apply_point_2d(&self, x: f64, y: f64) -> Point2D {
        Point2D::new(
            self.mxx * x + self.mxy * y + self.tx,
            self.myx * x + self.myy * y + self.ty,
        )
    }

    /// Apply the 2D part of this matrix to a vector (ignores translation).
    pub fn apply_vector_2d(&self, x: f64, y: f64) -> Point2D {
        Point2D::new(self.mxx * x + self.mxy * y, self.myx * x + self.myy * y)
    }

    /// Transform packed `x, y` pairs from `src` into `dst`.
    pub(crate) fn apply_points_2d(&self, src: &[f64], dst: &mut [f64]) {
        for (s, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(2)) {
            let p = self.apply_point_2d(s[0], s[1]);
            d[0] = p.x;
            d[1] = p.y;
        }
    }

    /// Transform packed `x, y, z` triples from `src` into `dst`.
    pub(crate) fn apply_points_3d(&self, src: &[f64], dst: &mut [f64]) {
        for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(3)) {
            let p = self.apply_point(s[0], s[1], s[2]);
            d[0] = p.x;
            d[1] = p.y;
            d[2] = p.z;
        }
    }

    /// The twelve stored elements in row-major order.
    pub fn to_elements(&self) -> [f64; 12] {
        [
            self.mxx, self.mxy, self.mxz, self.tx, self.myx, self.myy, self.myz, self.ty,
            self.mzx, self.mzy, self.mzz, self.tz,
        ]
    }

    /// Inverse of [`Matrix3x4::to_elements`].
    pub fn from_elements(e: [f64; 12]) -> Self {
        Self::new(
            e[0], e[1], e[2], e[3], e[4], e[5], e[6], e[7], e[8], e[9], e[10], e[11],
        )
    }

    pub fn get(&self, element: MatrixElement) -> f64 {
        self.to_elements()[element.index()]
    }

    pub fn set(&mut self, element: MatrixElement, value: f64) {
        let mut e = self.to_elements();
        e[element.index()] = value;
        *self = Self::from_elements(e);
    }

    /// Read a matrix of shape `ty` from `matrix[offset..]`.
    ///
    /// The square shapes must carry the exact structural last row, otherwise
    /// the data does not describe an affine matrix.
    pub fn from_array(matrix: &[f64], ty: MatrixType, offset: usize) -> Result<Self> {
        let end = offset
            .checked_add(ty.elements())
            .filter(|end| *end <= matrix.len())
            .ok_or_else(|| {
                TransformError::IndexOutOfBounds(format!(
                    "the array is too short: {count} elements of {ty} requested at offset \
                     {offset}, length {len}",
                    count = ty.elements(),
                    len = matrix.len()
                ))
            })?;
        let data = &matrix[offset..end];

        if ty.has_structural_row() {
            let stored = ty.elements() - ty.columns();
            if data[stored..] != *ty.structural_row() {
                return Err(TransformError::InvalidArgument(format!(
                    "the {ty} matrix is not affine"
                )));
            }
        }

        Ok(if ty.is_2d() {
            Self::new_2d(data[0], data[1], data[2], data[3], data[4], data[5])
        } else {
            Self::new(
                data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7], data[8],
                data[9], data[10], data[11],
            )
        })
    }

    /// Resolve `(row, column)` of shape `ty` to a stored element or a constant.
    pub(crate) fn slot(&self, ty: MatrixType, row: usize, column: usize) -> Result<ElementSlot> {
        if row >= ty.rows() || column >= ty.columns() {
            return Err(TransformError::IndexOutOfBounds(format!(
                "index outside of affine matrix {ty}: [{row}, {column}]"
            )));
        }
        self.check_shape(ty)?;

        use MatrixElement::*;
        let slot = if ty.is_2d() {
            match (row, column) {
                (0, 0) => ElementSlot::Stored(Mxx),
                (0, 1) => ElementSlot::Stored(Mxy),
                (0, _) => ElementSlot::Stored(Tx),
                (1, 0) => ElementSlot::Stored(Myx),
                (1, 1) => ElementSlot::Stored(Myy),
                (1, _) => ElementSlot::Stored(Ty),
                _ => ElementSlot::Structural(ty.structural_row()[column]),
            }
        } else if row < 3 {
            ElementSlot::Stored(MatrixElement::ALL[row * 4 + column])
        } else {
            ElementSlot::Structural(ty.structural_row()[column])
        };
        Ok(slot)
    }

    /// Fail when a 2D shape is requested for a matrix that is not 2D.
    pub(crate) fn check_shape(&self, ty: MatrixType) -> Result<()> {
        if ty.is_2d() && !self.is_2d() {
            return Err(TransformError::InvalidArgument(
                "cannot access 2D matrix of a 3D transform".to_string(),
            ));
        }
        Ok(())
    }

    /// Read one element of the matrix viewed as shape `ty`.
    pub fn element(&self, ty: MatrixType, row: usize, column: usize) -> Result<f64> {
        Ok(match self.slot(ty, row, column)? {
            ElementSlot::Stored(element) => self.get(element),
            ElementSlot::Structural(value) => value,
        })
    }

    /// Write the matrix as shape `ty` into `out`, which holds `ty.elements()` values.
    pub(crate) fn write_array(&self, ty: MatrixType, out: &mut [f64]) {
        for row in 0..ty.rows() {
            self.write_row(ty, row, &mut out[row * ty.columns()..(row + 1) * ty.columns()]);
        }
    }

    /// Write row `row` of shape `ty` into `out`, which holds `ty.columns()` values.
    pub(crate) fn write_row(&self, ty: MatrixType, row: usize, out: &mut [f64]) {
        match (ty.is_2d(), row) {
            (true, 0) => out.copy_from_slice(&[self.mxx, self.mxy, self.tx]),
            (true, 1) => out.copy_from_slice(&[self.myx, self.myy, self.ty]),
            (false, 0) => out.copy_from_slice(&[self.mxx, self.mxy, self.mxz, self.tx]),
            (false, 1) => out.copy_from_slice(&[self.myx, self.myy, self.myz, self.ty]),
            (false, 2) => out.copy_from_slice(&[self.mzx, self.mzy, self.mzz, self.tz]),
            _ => out.copy_from_slice(ty.structural_row()),
        }
    }

    /// Write column `column` of shape `ty` into `out`, which holds `ty.rows()` values.
    pub(crate) fn write_column(&self, ty: MatrixType, column: usize, out: &mut [f64]) {
        let mut row = [0.0; 4];
        for (r, slot) in out.iter_mut().enumerate() {
            let row = &mut row[..ty.columns()];
            self.write_row(ty, r, row);
            *slot = row[column];
        }
    }
}

impl fmt::Display for Matrix3x4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}, {}, {}, {}]", self.mxx, self.mxy, self.mxz, self.tx)?;
        writeln!(f, " [{}, {}, {}, {}]", self.myx, self.myy, self.myz, self.ty)?;
        write!(f, " [{}, {}, {}, {}]", self.mzx, self.mzy, self.mzz, self.tz)
    }
}

/// Sine and cosine of an angle in degrees, snapped to exact values at the
/// quadrants.
pub(crate) fn sin_cos_degrees(angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.to_radians().sin_cos();
    if sin == 1.0 || sin == -1.0 {
        (sin, 0.0)
    } else if cos == 1.0 || cos == -1.0 {
        (0.0, cos)
    } else {
        (sin, cos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_matrix(a: &Matrix3x4, b: &Matrix3x4) -> bool {
        a.to_elements()
            .iter()
            .zip(b.to_elements())
            .all(|(x, y)| approx_eq(*x, y))
    }

    #[test]
    fn test_identity() {
        let m = Matrix3x4::IDENTITY;
        assert!(m.is_identity());
        assert!(m.is_2d());

        let p = m.apply_point(100.0, 200.0, 300.0);
        assert_eq!(p, Point3D::new(100.0, 200.0, 300.0));
    }

    #[test]
    fn test_translate() {
        let m = Matrix3x4::translation(50.0, 100.0, 0.0);
        let p = m.apply_point_2d(10.0, 20.0);
        assert!(approx_eq(p.x, 60.0));
        assert!(approx_eq(p.y, 120.0));
        assert!(!Matrix3x4::translation(0.0, 0.0, 1.0).is_2d());
    }

    #[test]
    fn test_rotate_90_is_exact() {
        let m = Matrix3x4::rotation_2d(90.0);
        assert_eq!(m.mxx, 0.0);
        assert_eq!(m.mxy, -1.0);
        assert_eq!(m.myx, 1.0);
        let p = m.apply_point_2d(1.0, 0.0);
        assert_eq!(p, Point2D::new(0.0, 1.0));
    }

    #[test]
    fn test_rotate_180() {
        let p = Matrix3x4::rotation_2d(180.0).apply_point_2d(1.0, 0.0);
        assert!(approx_eq(p.x, -1.0));
        assert!(approx_eq(p.y, 0.0));
    }

    #[test]
    fn test_rotation_about_negative_z_flips_angle() {
        let m = Matrix3x4::rotation(30.0, Point3D::new(0.0, 0.0, -2.0)).unwrap();
        assert!(approx_matrix(&m, &Matrix3x4::rotation_2d(-30.0)));
    }

    #[test]
    fn test_rotation_zero_axis() {
        assert!(Matrix3x4::rotation(45.0, Point3D::ZERO).is_none());
        assert!(Matrix3x4::rotation(45.0, Point3D::new(1e-200, 1e-200, 0.0)).is_none());
        let tiny = Point3D::new(f64::MIN_POSITIVE / 4.0, 0.0, 0.0);
        assert!(Matrix3x4::rotation(45.0, tiny).is_none());
    }

    #[test]
    fn test_rotation_about_x_axis() {
        let m = Matrix3x4::rotation(90.0, Point3D::new(3.0, 0.0, 0.0)).unwrap();
        let p = m.apply_point(0.0, 1.0, 0.0);
        assert!(approx_eq(p.x, 0.0));
        assert!(approx_eq(p.y, 0.0));
        assert!(approx_eq(p.z, 1.0));
    }

    #[test]
    fn test_composition() {
        // Scale is applied first (0,0) -> (0,0), then translate (0,0) -> (10,20)
        let m = Matrix3x4::translation(10.0, 20.0, 0.0).then(&Matrix3x4::scaling(2.0, 2.0, 1.0));
        let p = m.apply_point_2d(0.0, 0.0);
        assert!(approx_eq(p.x, 10.0));
        assert!(approx_eq(p.y, 20.0));

        // Translate first (0,0) -> (10,20), then scale (10,20) -> (20,40)
        let m2 = Matrix3x4::scaling(2.0, 2.0, 1.0).then(&Matrix3x4::translation(10.0, 20.0, 0.0));
        let p2 = m2.apply_point_2d(0.0, 0.0);
        assert!(approx_eq(p2.x, 20.0));
        assert!(approx_eq(p2.y, 40.0));

        let scale = Matrix3x4::scaling(2.0, 2.0, 1.0);
        let prepended = Matrix3x4::translation(10.0, 20.0, 0.0).pre_multiply(&scale);
        assert_eq!(m2, prepended);
    }

    #[test]
    fn test_about_pivot_keeps_pivot_fixed() {
        let m = Matrix3x4::scaling(2.0, 3.0, 4.0).about_pivot(5.0, 6.0, 7.0);
        let p = m.apply_point(5.0, 6.0, 7.0);
        assert!(approx_eq(p.x, 5.0));
        assert!(approx_eq(p.y, 6.0));
        assert!(approx_eq(p.z, 7.0));
        assert!(approx_eq(m.tx, (1.0 - 2.0) * 5.0));
    }

    #[test]
    fn test_inverse_2d() {
        let m = Matrix3x4::translation(50.0, 100.0, 0.0)
            .then(&Matrix3x4::scaling(2.0, 3.0, 1.0))
            .then(&Matrix3x4::rotation_2d(45.0));
        let inv = m.inverse().unwrap();
        assert!(inv.is_2d());
        assert!(approx_matrix(&m.then(&inv), &Matrix3x4::IDENTITY));
    }

    #[test]
    fn test_inverse_3d() {
        let m = Matrix3x4::new(7.0, 3.0, 4.0, 5.0, 6.0, 7.0, 5.0, 9.0, 10.0, 11.0, 12.0, 13.0);
        let inv = m.inverse().unwrap();
        assert!(approx_matrix(&m.then(&inv), &Matrix3x4::IDENTITY));
        assert!(approx_matrix(&inv.then(&m), &Matrix3x4::IDENTITY));
    }

    #[test]
    fn test_inverse_singular() {
        let m = Matrix3x4::new(2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0);
        assert!(matches!(m.inverse(), Err(TransformError::NonInvertible(_))));
        assert!(Matrix3x4::new_2d(0.0, 0.0, 2.0, 0.0, 0.0, 3.0).inverse().is_err());
    }

    #[test]
    fn test_determinant() {
        assert!(approx_eq(Matrix3x4::IDENTITY.determinant(), 1.0));
        assert!(approx_eq(Matrix3x4::scaling(2.0, 3.0, 1.0).determinant(), 6.0));
        assert!(approx_eq(Matrix3x4::scaling(2.0, 3.0, 4.0).determinant(), 24.0));
        assert!(approx_eq(Matrix3x4::rotation_2d(45.0).determinant(), 1.0));
        assert!(approx_eq(Matrix3x4::translation(5.0, 6.0, 7.0).determinant(), 1.0));
    }

    #[test]
    fn test_from_array_checks_structural_row() {
        let data = [9.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 0.0, 1.0];
        let m = Matrix3x4::from_array(&data, MatrixType::Mt2d3x3, 1).unwrap();
        assert_eq!(m, Matrix3x4::new_2d(1.0, 2.0, 3.0, 4.0, 5.0, 6.0));

        let bad = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 0.5, 1.0];
        assert!(matches!(
            Matrix3x4::from_array(&bad, MatrixType::Mt2d3x3, 0),
            Err(TransformError::InvalidArgument(_))
        ));
        assert!(matches!(
            Matrix3x4::from_array(&data, MatrixType::Mt3d3x4, 0),
            Err(TransformError::IndexOutOfBounds(_))
        ));
        assert!(matches!(
            Matrix3x4::from_array(&data, MatrixType::Mt2d2x3, usize::MAX),
            Err(TransformError::IndexOutOfBounds(_))
        ));
    }

    #[test]
    fn test_element_lookup() {
        let m = Matrix3x4::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0);
        assert_eq!(m.element(MatrixType::Mt3d3x4, 1, 3).unwrap(), 8.0);
        assert_eq!(m.element(MatrixType::Mt3d4x4, 3, 3).unwrap(), 1.0);
        assert_eq!(m.element(MatrixType::Mt3d4x4, 3, 0).unwrap(), 0.0);
        assert!(matches!(
            m.element(MatrixType::Mt3d3x4, 3, 0),
            Err(TransformError::IndexOutOfBounds(_))
        ));
        assert!(matches!(
            m.element(MatrixType::Mt2d2x3, 0, 0),
            Err(TransformError::InvalidArgument(_))
        ));

        let flat = Matrix3x4::new_2d(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(flat.element(MatrixType::Mt2d2x3, 1, 2).unwrap(), 6.0);
        assert_eq!(flat.element(MatrixType::Mt2d3x3, 2, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_to_array_formats() {
        let m = Matrix3x4::translation(10.0, 20.0, 0.0);

        let mut m3 = [0.0; 9];
        m.write_array(MatrixType::Mt2d3x3, &mut m3);
        assert_eq!(m3, [1.0, 0.0, 10.0, 0.0, 1.0, 20.0, 0.0, 0.0, 1.0]);

        let mut m4 = [0.0; 16];
        m.write_array(MatrixType::Mt3d4x4, &mut m4);
        assert!(approx_eq(m4[3], 10.0));
        assert!(approx_eq(m4[7], 20.0));
        assert!(approx_eq(m4[10], 1.0));
        assert!(approx_eq(m4[15], 1.0));

        let mut col = [0.0; 4];
        m.write_column(MatrixType::Mt3d4x4, 3, &mut col);
        assert_eq!(col, [10.0, 20.0, 0.0, 1.0]);
    }
}
