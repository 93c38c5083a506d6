//! Observable 3D affine transforms for the rune scene graph.
//!
//! A node positions itself with an ordered list of transforms. Each one
//! exposes the same twelve-element 3x4 matrix through the [`Transform`] trait
//! and reports every completed change with a single
//! [`TransformChangedEvent`].
//!
//! - [`Affine`] stores all twelve elements and supports append/prepend of any
//!   other transform, in-place inversion and element access by [`MatrixType`].
//! - [`Translate`], [`Scale`], [`Rotate`] and [`Shear`] hold a few parameters
//!   and derive their matrix on demand.
//! - [`AnyTransform`] owns any of them. Concatenation and inversion return the
//!   narrowest variant that represents the result exactly.
//! - [`TransformChain`] loads a transform list from TOML.
//!
//! Angles are in degrees.

mod affine;
mod any;
mod concat;
mod descriptor;
mod error;
mod events;
mod geometry;
mod matrix;
mod matrix_type;
mod property;
mod rotate;
mod scale;
mod shear;
mod transform;
mod translate;

pub use affine::Affine;
pub use any::AnyTransform;
pub use descriptor::{TransformChain, TransformDescriptor, describe};
pub use error::{Result, TransformError};
pub use events::{EventCallback, EventDispatcher, TransformChangedEvent, TransformEventType};
pub use geometry::{Bounds, Point2D, Point3D};
pub use matrix::{Matrix3x4, MatrixElement};
pub use matrix_type::MatrixType;
pub use property::{ListenerId, Property};
pub use rotate::Rotate;
pub use scale::Scale;
pub use shear::Shear;
pub use transform::{Transform, TransformBase, TransformRef};
pub use translate::Translate;
