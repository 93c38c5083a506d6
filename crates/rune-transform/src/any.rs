//! Owned transform of any variant.

use std::fmt;

use crate::error::Result;
use crate::matrix::Matrix3x4;
use crate::transform::{Transform, TransformBase, TransformRef};
use crate::{Affine, Rotate, Scale, Shear, Translate};

/// One transform of a node's transform list.
///
/// Results of [`Transform::create_concatenation`] and
/// [`Transform::create_inverse`] come back as the narrowest variant that
/// represents them exactly.
#[derive(Debug, Clone)]
pub enum AnyTransform {
    Affine(Affine),
    Translate(Translate),
    Scale(Scale),
    Rotate(Rotate),
    Shear(Shear),
}

impl AnyTransform {
    pub fn affine_2d(mxx: f64, mxy: f64, tx: f64, myx: f64, myy: f64, ty: f64) -> Self {
        Affine::new_2d(mxx, mxy, tx, myx, myy, ty).into()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn affine_3d(
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
        Affine::new_3d(mxx, mxy, mxz, tx, myx, myy, myz, ty, mzx, mzy, mzz, tz).into()
    }

    pub fn translate(x: f64, y: f64) -> Self {
        Translate::new(x, y).into()
    }

    pub fn scale(x: f64, y: f64) -> Self {
        Scale::new_2d(x, y).into()
    }

    pub fn scale_with_pivot(x: f64, y: f64, pivot_x: f64, pivot_y: f64) -> Self {
        Scale::with_pivot(x, y, pivot_x, pivot_y).into()
    }

    pub fn rotate(angle: f64, pivot_x: f64, pivot_y: f64) -> Self {
        Rotate::with_pivot(angle, pivot_x, pivot_y).into()
    }

    pub fn shear(x: f64, y: f64) -> Self {
        Shear::new(x, y).into()
    }

    pub fn shear_with_pivot(x: f64, y: f64, pivot_x: f64, pivot_y: f64) -> Self {
        Shear::with_pivot(x, y, pivot_x, pivot_y).into()
    }

    fn inner(&self) -> &dyn Transform {
        self.as_variant().as_dyn()
    }

    fn inner_mut(&mut self) -> &mut dyn Transform {
        match self {
            Self::Affine(t) => t,
            Self::Translate(t) => t,
            Self::Scale(t) => t,
            Self::Rotate(t) => t,
            Self::Shear(t) => t,
        }
    }

    /// Convert to an [`Affine`] with the same matrix. Listeners are not carried over.
    pub fn into_affine(self) -> Affine {
        Affine::from(self.to_matrix())
    }

    /// Short variant name, as used in transform chain descriptors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Affine(_) => "affine",
            Self::Translate(_) => "translate",
            Self::Scale(_) => "scale",
            Self::Rotate(_) => "rotate",
            Self::Shear(_) => "shear",
        }
    }
}

impl Transform for AnyTransform {
    fn to_matrix(&self) -> Matrix3x4 {
        self.inner().to_matrix()
    }

    fn base(&self) -> &TransformBase {
        self.inner().base()
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        self.inner_mut().base_mut()
    }

    fn as_variant(&self) -> TransformRef<'_> {
        match self {
            Self::Affine(t) => TransformRef::Affine(t),
            Self::Translate(t) => TransformRef::Translate(t),
            Self::Scale(t) => TransformRef::Scale(t),
            Self::Rotate(t) => TransformRef::Rotate(t),
            Self::Shear(t) => TransformRef::Shear(t),
        }
    }

    fn create_inverse(&self) -> Result<AnyTransform> {
        self.inner().create_inverse()
    }
}

impl From<Affine> for AnyTransform {
    fn from(t: Affine) -> Self {
        Self::Affine(t)
    }
}

impl From<Translate> for AnyTransform {
    fn from(t: Translate) -> Self {
        Self::Translate(t)
    }
}

impl From<Scale> for AnyTransform {
    fn from(t: Scale) -> Self {
        Self::Scale(t)
    }
}

impl From<Rotate> for AnyTransform {
    fn from(t: Rotate) -> Self {
        Self::Rotate(t)
    }
}

impl From<Shear> for AnyTransform {
    fn from(t: Shear) -> Self {
        Self::Shear(t)
    }
}

impl fmt::Display for AnyTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Affine(t) => fmt::Display::fmt(t, f),
            Self::Translate(t) => fmt::Display::fmt(t, f),
            Self::Scale(t) => fmt::Display::fmt(t, f),
            Self::Rotate(t) => fmt::Display::fmt(t, f),
            Self::Shear(t) => fmt::Display::fmt(t, f),
        }
    }
}
