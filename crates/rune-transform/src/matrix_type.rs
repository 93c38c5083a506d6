//! Shapes of flat matrix arrays.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout of matrix data exchanged through flat `f64` arrays.
///
/// Arrays are row-major. The 3x3 and 4x4 shapes carry the structural last row
/// (`0 0 1` / `0 0 0 1`) of an affine matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatrixType {
    /// 2D affine matrix with 2 rows and 3 columns.
    #[serde(rename = "2d_2x3")]
    Mt2d2x3,
    /// 2D matrix with 3 rows and 3 columns, last row `0 0 1`.
    #[serde(rename = "2d_3x3")]
    Mt2d3x3,
    /// 3D affine matrix with 3 rows and 4 columns.
    #[default]
    #[serde(rename = "3d_3x4")]
    Mt3d3x4,
    /// 3D matrix with 4 rows and 4 columns, last row `0 0 0 1`.
    #[serde(rename = "3d_4x4")]
    Mt3d4x4,
}

impl MatrixType {
    pub const ALL: [MatrixType; 4] = [
        MatrixType::Mt2d2x3,
        MatrixType::Mt2d3x3,
        MatrixType::Mt3d3x4,
        MatrixType::Mt3d4x4,
    ];

    /// Whether this is a 2D shape.
    pub const fn is_2d(self) -> bool {
        matches!(self, Self::Mt2d2x3 | Self::Mt2d3x3)
    }

    /// Number of rows, including the structural row for the square shapes.
    pub const fn rows(self) -> usize {
        match self {
            Self::Mt2d2x3 => 2,
            Self::Mt2d3x3 | Self::Mt3d3x4 => 3,
            Self::Mt3d4x4 => 4,
        }
    }

    /// Number of columns.
    pub const fn columns(self) -> usize {
        match self {
            Self::Mt2d2x3 | Self::Mt2d3x3 => 3,
            Self::Mt3d3x4 | Self::Mt3d4x4 => 4,
        }
    }

    /// Number of array elements (`rows * columns`).
    pub const fn elements(self) -> usize {
        self.rows() * self.columns()
    }

    /// Whether the shape includes the structural last row.
    pub(crate) const fn has_structural_row(self) -> bool {
        matches!(self, Self::Mt2d3x3 | Self::Mt3d4x4)
    }

    /// The values of the structural last row for the square shapes.
    pub(crate) const fn structural_row(self) -> &'static [f64] {
        match self {
            Self::Mt2d3x3 => &[0.0, 0.0, 1.0],
            Self::Mt3d4x4 => &[0.0, 0.0, 0.0, 1.0],
            Self::Mt2d2x3 | Self::Mt3d3x4 => &[],
        }
    }
}

impl fmt::Display for MatrixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mt2d2x3 => "MT_2D_2x3",
            Self::Mt2d3x3 => "MT_2D_3x3",
            Self::Mt3d3x4 => "MT_3D_3x4",
            Self::Mt3d4x4 => "MT_3D_4x4",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        assert_eq!(
            (MatrixType::Mt2d2x3.rows(), MatrixType::Mt2d2x3.columns()),
            (2, 3)
        );
        assert_eq!(MatrixType::Mt2d3x3.elements(), 9);
        assert_eq!(MatrixType::Mt3d3x4.elements(), 12);
        assert_eq!(MatrixType::Mt3d4x4.elements(), 16);
    }

    #[test]
    fn test_is_2d() {
        assert!(MatrixType::Mt2d2x3.is_2d());
        assert!(MatrixType::Mt2d3x3.is_2d());
        assert!(!MatrixType::Mt3d3x4.is_2d());
        assert!(!MatrixType::Mt3d4x4.is_2d());
    }

    #[test]
    fn test_structural_row_matches_columns() {
        for ty in MatrixType::ALL {
            if ty.has_structural_row() {
                assert_eq!(ty.structural_row().len(), ty.columns());
            } else {
                assert!(ty.structural_row().is_empty());
            }
        }
    }

    #[test]
    fn test_serde_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            ty: MatrixType,
        }
        let parsed: Wrapper = toml::from_str("ty = \"2d_3x3\"").unwrap();
        assert_eq!(parsed.ty, MatrixType::Mt2d3x3);
        assert_eq!(MatrixType::Mt3d4x4.to_string(), "MT_3D_4x4");
    }
}
