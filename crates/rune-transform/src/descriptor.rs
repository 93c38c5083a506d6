//! Transform chains described in TOML.
//!
//! A chain lists a node's transforms in order, first to last:
//!
//! ```toml
//! [[transforms]]
//! type = "translate"
//! x = 100.0
//! y = 50.0
//!
//! [[transforms]]
//! type = "rotate"
//! angle = 45.0
//! pivot_x = 10.0
//! pivot_y = 10.0
//!
//! [[transforms]]
//! type = "affine"
//! matrix_type = "2d_2x3"
//! matrix = [1.0, 0.5, 0.0, 0.0, 1.0, 0.0]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::any::AnyTransform;
use crate::error::{Result, TransformError};
use crate::geometry::Point3D;
use crate::matrix_type::MatrixType;
use crate::transform::Transform;
use crate::{Affine, Rotate, Scale, Shear, Translate};

fn one() -> f64 {
    1.0
}

fn z_axis() -> Point3D {
    Rotate::Z_AXIS
}

/// Serializable description of a single transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformDescriptor {
    Translate {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        z: f64,
    },
    Scale {
        x: f64,
        y: f64,
        #[serde(default = "one")]
        z: f64,
        #[serde(default)]
        pivot_x: f64,
        #[serde(default)]
        pivot_y: f64,
        #[serde(default)]
        pivot_z: f64,
    },
    Rotate {
        angle: f64,
        #[serde(default)]
        pivot_x: f64,
        #[serde(default)]
        pivot_y: f64,
        #[serde(default)]
        pivot_z: f64,
        #[serde(default = "z_axis")]
        axis: Point3D,
    },
    Shear {
        x: f64,
        y: f64,
        #[serde(default)]
        pivot_x: f64,
        #[serde(default)]
        pivot_y: f64,
    },
    Affine {
        matrix: Vec<f64>,
        #[serde(default)]
        matrix_type: MatrixType,
    },
}

impl TransformDescriptor {
    /// Create the live transform this descriptor describes.
    pub fn build(&self) -> Result<AnyTransform> {
        let transform: AnyTransform = match *self {
            Self::Translate { x, y, z } => Translate::new_3d(x, y, z).into(),
            Self::Scale {
                x,
                y,
                z,
                pivot_x,
                pivot_y,
                pivot_z,
            } => Scale::with_pivot_3d(x, y, z, pivot_x, pivot_y, pivot_z).into(),
            Self::Rotate {
                angle,
                pivot_x,
                pivot_y,
                pivot_z,
                axis,
            } => {
                let pivot = Point3D::new(pivot_x, pivot_y, pivot_z);
                Rotate::with_pivot_and_axis(angle, pivot, axis).into()
            }
            Self::Shear {
                x,
                y,
                pivot_x,
                pivot_y,
            } => Shear::with_pivot(x, y, pivot_x, pivot_y).into(),
            Self::Affine {
                ref matrix,
                matrix_type,
            } => build_affine(matrix, matrix_type)
                .inspect_err(|e| debug!(error = %e, "invalid affine descriptor"))?
                .into(),
        };
        Ok(transform)
    }
}

fn build_affine(matrix: &[f64], matrix_type: MatrixType) -> Result<Affine> {
    if matrix.len() > matrix_type.elements() {
        return Err(TransformError::InvalidArgument(format!(
            "{matrix_type} takes {} elements, found {}",
            matrix_type.elements(),
            matrix.len()
        )));
    }
    Affine::from_array(matrix, matrix_type, 0)
}

/// Describe `transform` so that [`TransformDescriptor::build`] recreates it.
pub fn describe(transform: &AnyTransform) -> TransformDescriptor {
    match transform {
        AnyTransform::Translate(t) => TransformDescriptor::Translate {
            x: t.x(),
            y: t.y(),
            z: t.z(),
        },
        AnyTransform::Scale(s) => TransformDescriptor::Scale {
            x: s.x(),
            y: s.y(),
            z: s.z(),
            pivot_x: s.pivot_x(),
            pivot_y: s.pivot_y(),
            pivot_z: s.pivot_z(),
        },
        AnyTransform::Rotate(r) => TransformDescriptor::Rotate {
            angle: r.angle(),
            pivot_x: r.pivot_x(),
            pivot_y: r.pivot_y(),
            pivot_z: r.pivot_z(),
            axis: r.axis(),
        },
        AnyTransform::Shear(s) => TransformDescriptor::Shear {
            x: s.x(),
            y: s.y(),
            pivot_x: s.pivot_x(),
            pivot_y: s.pivot_y(),
        },
        AnyTransform::Affine(a) => TransformDescriptor::Affine {
            matrix: a.to_matrix().to_elements().to_vec(),
            matrix_type: MatrixType::Mt3d3x4,
        },
    }
}

/// Ordered list of transforms applied to one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformChain {
    pub transforms: Vec<TransformDescriptor>,
}

impl TransformChain {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a chain from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let chain = Self::from_toml_str(&content)?;
        debug!(
            path = %path.as_ref().display(),
            transforms = chain.transforms.len(),
            "loaded transform chain"
        );
        Ok(chain)
    }

    /// Describe an existing transform list.
    pub fn describe(transforms: &[AnyTransform]) -> Self {
        Self {
            transforms: transforms.iter().map(describe).collect(),
        }
    }

    /// Build every transform of the chain, in order.
    pub fn build(&self) -> Result<Vec<AnyTransform>> {
        self.transforms.iter().map(TransformDescriptor::build).collect()
    }

    /// The single matrix equivalent to applying the whole chain.
    ///
    /// The first transform is outermost: points go through the last one first.
    pub fn concatenate(&self) -> Result<Affine> {
        let mut effective = Affine::new();
        for transform in self.build()? {
            effective.append(&transform);
        }
        Ok(effective)
    }
}
