//! The transform capability contract shared by every variant.
//!
//! Each variant supplies its matrix (`to_matrix`) and its [`TransformBase`].
//! Element access, point and bounds mapping, inverse mapping and event
//! registration are provided here in terms of those two.

use std::cell::Cell;
use std::fmt;
use std::ops::Range;

use tracing::debug;

use crate::any::AnyTransform;
use crate::concat;
use crate::error::{Result, TransformError};
use crate::events::{EventCallback, EventDispatcher, TransformChangedEvent, TransformEventType};
use crate::geometry::{Bounds, Point2D, Point3D};
use crate::matrix::{ElementSlot, Matrix3x4};
use crate::matrix_type::MatrixType;
use crate::property::{ListenerId, Property};
use crate::{Affine, Rotate, Scale, Shear, Translate};

/// State every transform carries besides its own parameters: the derived
/// `type_2d`/`identity` flags, event registrations and the inverse cache.
pub struct TransformBase {
    type_2d: Property<bool>,
    identity: Property<bool>,
    events: EventDispatcher,
    inverse: Cell<Option<Matrix3x4>>,
}

impl TransformBase {
    pub(crate) fn new(matrix: &Matrix3x4) -> Self {
        Self {
            type_2d: Property::new("type2D", matrix.is_2d()),
            identity: Property::new("identity", matrix.is_identity()),
            events: EventDispatcher::new(),
            inverse: Cell::new(None),
        }
    }

    /// Record a committed change of the matrix.
    ///
    /// Callers store every field first; this drops the cached inverse,
    /// refreshes both derived flags, fires their listeners if they flipped and
    /// then delivers exactly one [`TransformChangedEvent`].
    pub(crate) fn matrix_changed(&mut self, matrix: &Matrix3x4) {
        self.inverse.set(None);
        let old_2d = self.type_2d.replace(matrix.is_2d());
        let old_identity = self.identity.replace(matrix.is_identity());
        if let Some(old) = old_2d {
            self.type_2d.notify(old);
        }
        if let Some(old) = old_identity {
            self.identity.notify(old);
        }
        let mut event = TransformChangedEvent::new(*matrix);
        self.events.dispatch(&mut event);
    }

    /// Inverse of `matrix`, computed once and reused until the next change.
    pub(crate) fn cached_inverse(&self, matrix: &Matrix3x4) -> Result<Matrix3x4> {
        if let Some(inverse) = self.inverse.get() {
            return Ok(inverse);
        }
        let inverse = matrix.inverse().inspect_err(|_| {
            debug!(determinant = matrix.determinant(), "transform is not invertible");
        })?;
        self.inverse.set(Some(inverse));
        Ok(inverse)
    }

    pub(crate) fn has_cached_inverse(&self) -> bool {
        self.inverse.get().is_some()
    }
}

/// Copies the derived state; listeners and handlers stay with the original.
impl Clone for TransformBase {
    fn clone(&self) -> Self {
        Self {
            type_2d: self.type_2d.clone(),
            identity: self.identity.clone(),
            events: EventDispatcher::new(),
            inverse: Cell::new(self.inverse.get()),
        }
    }
}

impl fmt::Debug for TransformBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformBase")
            .field("type_2d", &self.type_2d.get())
            .field("identity", &self.identity.get())
            .field("events", &self.events)
            .finish()
    }
}

/// Borrowed view of a transform's concrete variant, used for pairwise dispatch.
#[derive(Debug, Clone, Copy)]
pub enum TransformRef<'a> {
    Affine(&'a Affine),
    Translate(&'a Translate),
    Scale(&'a Scale),
    Rotate(&'a Rotate),
    Shear(&'a Shear),
}

impl<'a> TransformRef<'a> {
    pub fn as_dyn(self) -> &'a dyn Transform {
        match self {
            Self::Affine(t) => t,
            Self::Translate(t) => t,
            Self::Scale(t) => t,
            Self::Rotate(t) => t,
            Self::Shear(t) => t,
        }
    }

    pub fn to_owned(self) -> AnyTransform {
        match self {
            Self::Affine(t) => AnyTransform::Affine(t.clone()),
            Self::Translate(t) => AnyTransform::Translate(t.clone()),
            Self::Scale(t) => AnyTransform::Scale(t.clone()),
            Self::Rotate(t) => AnyTransform::Rotate(t.clone()),
            Self::Shear(t) => AnyTransform::Shear(t.clone()),
        }
    }
}

/// Reuse `buffer` when it has exactly `len` slots, otherwise allocate.
fn sized_buffer(buffer: Option<Vec<f64>>, len: usize) -> Vec<f64> {
    match buffer {
        Some(buffer) if buffer.len() == len => buffer,
        _ => vec![0.0; len],
    }
}

fn check_points(
    len: usize,
    offset: usize,
    count: usize,
    dim: usize,
    which: &str,
) -> Result<Range<usize>> {
    count
        .checked_mul(dim)
        .and_then(|n| offset.checked_add(n))
        .filter(|end| *end <= len)
        .map(|end| offset..end)
        .ok_or_else(|| {
            TransformError::IndexOutOfBounds(format!(
                "{which} array of length {len} cannot hold {count} points at offset {offset}"
            ))
        })
}

/// Map points between two slices using `f`.
fn map_points(
    src: &[f64],
    src_offset: usize,
    dst: &mut [f64],
    dst_offset: usize,
    count: usize,
    dim: usize,
    f: impl Fn(&[f64], &mut [f64]),
) -> Result<()> {
    let src_range = check_points(src.len(), src_offset, count, dim, "source")?;
    let dst_range = check_points(dst.len(), dst_offset, count, dim, "destination")?;
    f(&src[src_range], &mut dst[dst_range]);
    Ok(())
}

/// Map points within one buffer; the ranges may overlap.
fn map_points_in_place(
    points: &mut [f64],
    src_offset: usize,
    dst_offset: usize,
    count: usize,
    dim: usize,
    f: impl Fn(&[f64], &mut [f64]),
) -> Result<()> {
    let src_range = check_points(points.len(), src_offset, count, dim, "source")?;
    let dst_range = check_points(points.len(), dst_offset, count, dim, "destination")?;
    let overlapping = src_range.start < dst_range.end && dst_range.start < src_range.end;
    if overlapping {
        let src = points[src_range].to_vec();
        f(&src, &mut points[dst_range]);
    } else if src_range.start < dst_range.start {
        let (head, tail) = points.split_at_mut(dst_range.start);
        f(&head[src_range], &mut tail[..dst_range.len()]);
    } else {
        let (head, tail) = points.split_at_mut(src_range.start);
        f(&tail[..src_range.len()], &mut head[dst_range]);
    }
    Ok(())
}

/// A 3D affine transform that can be observed, inspected and applied.
pub trait Transform {
    /// The current matrix. Specialized variants derive it on every call.
    fn to_matrix(&self) -> Matrix3x4;

    fn base(&self) -> &TransformBase;

    fn base_mut(&mut self) -> &mut TransformBase;

    /// The concrete variant, for type-aware composition.
    fn as_variant(&self) -> TransformRef<'_>;

    /// The inverse, typed as the most specific variant that represents it.
    fn create_inverse(&self) -> Result<AnyTransform>;

    fn mxx(&self) -> f64 {
        self.to_matrix().mxx
    }

    fn mxy(&self) -> f64 {
        self.to_matrix().mxy
    }

    fn mxz(&self) -> f64 {
        self.to_matrix().mxz
    }

    fn tx(&self) -> f64 {
        self.to_matrix().tx
    }

    fn myx(&self) -> f64 {
        self.to_matrix().myx
    }

    fn myy(&self) -> f64 {
        self.to_matrix().myy
    }

    fn myz(&self) -> f64 {
        self.to_matrix().myz
    }

    fn ty(&self) -> f64 {
        self.to_matrix().ty
    }

    fn mzx(&self) -> f64 {
        self.to_matrix().mzx
    }

    fn mzy(&self) -> f64 {
        self.to_matrix().mzy
    }

    fn mzz(&self) -> f64 {
        self.to_matrix().mzz
    }

    fn tz(&self) -> f64 {
        self.to_matrix().tz
    }

    /// Element `(row, column)` of the matrix viewed as `ty`.
    fn element(&self, ty: MatrixType, row: usize, column: usize) -> Result<f64> {
        self.to_matrix().element(ty, row, column)
    }

    /// The matrix as a flat row-major array of shape `ty`.
    fn to_array(&self, ty: MatrixType) -> Result<Vec<f64>> {
        self.to_array_into(ty, None)
    }

    /// Like [`Transform::to_array`], filling `buffer` when it is exactly sized.
    fn to_array_into(&self, ty: MatrixType, buffer: Option<Vec<f64>>) -> Result<Vec<f64>> {
        let m = self.to_matrix();
        m.check_shape(ty)?;
        let mut out = sized_buffer(buffer, ty.elements());
        m.write_array(ty, &mut out);
        Ok(out)
    }

    fn row(&self, ty: MatrixType, row: usize) -> Result<Vec<f64>> {
        self.row_into(ty, row, None)
    }

    fn row_into(&self, ty: MatrixType, row: usize, buffer: Option<Vec<f64>>) -> Result<Vec<f64>> {
        let m = self.to_matrix();
        m.check_shape(ty)?;
        if row >= ty.rows() {
            return Err(TransformError::IndexOutOfBounds(format!(
                "cannot get row {row} from {ty}"
            )));
        }
        let mut out = sized_buffer(buffer, ty.columns());
        m.write_row(ty, row, &mut out);
        Ok(out)
    }

    fn column(&self, ty: MatrixType, column: usize) -> Result<Vec<f64>> {
        self.column_into(ty, column, None)
    }

    fn column_into(
        &self,
        ty: MatrixType,
        column: usize,
        buffer: Option<Vec<f64>>,
    ) -> Result<Vec<f64>> {
        let m = self.to_matrix();
        m.check_shape(ty)?;
        if column >= ty.columns() {
            return Err(TransformError::IndexOutOfBounds(format!(
                "cannot get column {column} from {ty}"
            )));
        }
        let mut out = sized_buffer(buffer, ty.rows());
        m.write_column(ty, column, &mut out);
        Ok(out)
    }

    fn determinant(&self) -> f64 {
        self.to_matrix().determinant()
    }

    /// Whether the transform has no out-of-plane effect.
    fn is_type_2d(&self) -> bool {
        self.base().type_2d.get()
    }

    fn type_2d_property(&mut self) -> &mut Property<bool> {
        &mut self.base_mut().type_2d
    }

    fn is_identity(&self) -> bool {
        self.base().identity.get()
    }

    fn identity_property(&mut self) -> &mut Property<bool> {
        &mut self.base_mut().identity
    }

    /// `self ∘ other`: a transform applying `other` first, then `self`.
    fn create_concatenation(&self, other: &dyn Transform) -> AnyTransform {
        concat::concatenate(self.as_variant(), other.as_variant())
    }

    /// An independent copy of the same variant, without listeners.
    fn clone_transform(&self) -> AnyTransform {
        self.as_variant().to_owned()
    }

    fn transform_point2d(&self, point: Point2D) -> Result<Point2D> {
        self.transform_xy(point.x, point.y)
    }

    fn transform_xy(&self, x: f64, y: f64) -> Result<Point2D> {
        if !self.is_type_2d() {
            return Err(TransformError::not_2d("transform 2D point"));
        }
        Ok(self.to_matrix().apply_point_2d(x, y))
    }

    fn transform_point3d(&self, point: Point3D) -> Point3D {
        self.transform_xyz(point.x, point.y, point.z)
    }

    fn transform_xyz(&self, x: f64, y: f64, z: f64) -> Point3D {
        self.to_matrix().apply_point(x, y, z)
    }

    fn delta_transform_point2d(&self, point: Point2D) -> Result<Point2D> {
        self.delta_transform_xy(point.x, point.y)
    }

    fn delta_transform_xy(&self, x: f64, y: f64) -> Result<Point2D> {
        if !self.is_type_2d() {
            return Err(TransformError::not_2d("transform 2D point"));
        }
        Ok(self.to_matrix().apply_vector_2d(x, y))
    }

    fn delta_transform_point3d(&self, point: Point3D) -> Point3D {
        self.delta_transform_xyz(point.x, point.y, point.z)
    }

    fn delta_transform_xyz(&self, x: f64, y: f64, z: f64) -> Point3D {
        self.to_matrix().apply_vector(x, y, z)
    }

    /// Axis-aligned bounds of the transformed corners of `bounds`.
    fn transform_bounds(&self, bounds: &Bounds) -> Bounds {
        bounds_through(&self.to_matrix(), self.is_type_2d(), bounds)
    }

    /// Transform `count` packed `x, y` points from `src[src_offset..]` into `dst[dst_offset..]`.
    fn transform_2d_points(
        &self,
        src: &[f64],
        src_offset: usize,
        dst: &mut [f64],
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        if !self.is_type_2d() {
            return Err(TransformError::not_2d("transform 2D points"));
        }
        let m = self.to_matrix();
        map_points(src, src_offset, dst, dst_offset, count, 2, |s, d| m.apply_points_2d(s, d))
    }

    /// Like [`Transform::transform_2d_points`] within one buffer; ranges may overlap.
    fn transform_2d_points_in_place(
        &self,
        points: &mut [f64],
        src_offset: usize,
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        if !self.is_type_2d() {
            return Err(TransformError::not_2d("transform 2D points"));
        }
        let m = self.to_matrix();
        map_points_in_place(points, src_offset, dst_offset, count, 2, |s, d| {
            m.apply_points_2d(s, d)
        })
    }

    fn transform_3d_points(
        &self,
        src: &[f64],
        src_offset: usize,
        dst: &mut [f64],
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        let m = self.to_matrix();
        map_points(src, src_offset, dst, dst_offset, count, 3, |s, d| m.apply_points_3d(s, d))
    }

    fn transform_3d_points_in_place(
        &self,
        points: &mut [f64],
        src_offset: usize,
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        let m = self.to_matrix();
        map_points_in_place(points, src_offset, dst_offset, count, 3, |s, d| {
            m.apply_points_3d(s, d)
        })
    }

    /// The inverse matrix, cached until the transform next changes.
    fn inverse_matrix(&self) -> Result<Matrix3x4> {
        self.base().cached_inverse(&self.to_matrix())
    }

    fn inverse_transform_point2d(&self, point: Point2D) -> Result<Point2D> {
        self.inverse_transform_xy(point.x, point.y)
    }

    fn inverse_transform_xy(&self, x: f64, y: f64) -> Result<Point2D> {
        if !self.is_type_2d() {
            return Err(TransformError::not_2d("inverse transform 2D point"));
        }
        Ok(self.inverse_matrix()?.apply_point_2d(x, y))
    }

    fn inverse_transform_point3d(&self, point: Point3D) -> Result<Point3D> {
        self.inverse_transform_xyz(point.x, point.y, point.z)
    }

    fn inverse_transform_xyz(&self, x: f64, y: f64, z: f64) -> Result<Point3D> {
        Ok(self.inverse_matrix()?.apply_point(x, y, z))
    }

    fn inverse_delta_transform_point2d(&self, point: Point2D) -> Result<Point2D> {
        self.inverse_delta_transform_xy(point.x, point.y)
    }

    fn inverse_delta_transform_xy(&self, x: f64, y: f64) -> Result<Point2D> {
        if !self.is_type_2d() {
            return Err(TransformError::not_2d("inverse transform 2D point"));
        }
        Ok(self.inverse_matrix()?.apply_vector_2d(x, y))
    }

    fn inverse_delta_transform_point3d(&self, point: Point3D) -> Result<Point3D> {
        self.inverse_delta_transform_xyz(point.x, point.y, point.z)
    }

    fn inverse_delta_transform_xyz(&self, x: f64, y: f64, z: f64) -> Result<Point3D> {
        Ok(self.inverse_matrix()?.apply_vector(x, y, z))
    }

    fn inverse_transform_bounds(&self, bounds: &Bounds) -> Result<Bounds> {
        let inverse = self.inverse_matrix()?;
        Ok(bounds_through(&inverse, self.is_type_2d(), bounds))
    }

    fn inverse_transform_2d_points(
        &self,
        src: &[f64],
        src_offset: usize,
        dst: &mut [f64],
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        if !self.is_type_2d() {
            return Err(TransformError::not_2d("inverse transform 2D points"));
        }
        let inverse = self.inverse_matrix()?;
        map_points(src, src_offset, dst, dst_offset, count, 2, |s, d| inverse.apply_points_2d(s, d))
    }

    fn inverse_transform_2d_points_in_place(
        &self,
        points: &mut [f64],
        src_offset: usize,
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        if !self.is_type_2d() {
            return Err(TransformError::not_2d("inverse transform 2D points"));
        }
        let inverse = self.inverse_matrix()?;
        map_points_in_place(points, src_offset, dst_offset, count, 2, |s, d| {
            inverse.apply_points_2d(s, d)
        })
    }

    fn inverse_transform_3d_points(
        &self,
        src: &[f64],
        src_offset: usize,
        dst: &mut [f64],
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        let inverse = self.inverse_matrix()?;
        map_points(src, src_offset, dst, dst_offset, count, 3, |s, d| inverse.apply_points_3d(s, d))
    }

    fn inverse_transform_3d_points_in_place(
        &self,
        points: &mut [f64],
        src_offset: usize,
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        let inverse = self.inverse_matrix()?;
        map_points_in_place(points, src_offset, dst_offset, count, 3, |s, d| {
            inverse.apply_points_3d(s, d)
        })
    }

    /// Whether `self` and `other` map every corner of `range` to points at
    /// most `max_delta` apart.
    fn similar_to(&self, other: &dyn Transform, range: &Bounds, max_delta: f64) -> bool {
        let a = self.to_matrix();
        let b = other.to_matrix();

        if self.is_type_2d() && other.is_type_2d() {
            return range.corners_2d().iter().all(|p| {
                a.apply_point_2d(p.x, p.y).distance(b.apply_point_2d(p.x, p.y)) <= max_delta
            });
        }

        let corners = range.corners();
        let near = corners.iter().filter(|p| p.z == range.min_z);
        let far = corners.iter().filter(|p| p.z == range.max_z && range.depth() != 0.0);
        near.chain(far).all(|p| {
            a.apply_point(p.x, p.y, p.z).distance(b.apply_point(p.x, p.y, p.z)) <= max_delta
        })
    }

    fn add_event_filter(
        &mut self,
        event_type: TransformEventType,
        filter: impl FnMut(&mut TransformChangedEvent) + 'static,
    ) -> ListenerId
    where
        Self: Sized,
    {
        self.base_mut().events.add_event_filter(event_type, filter)
    }

    fn remove_event_filter(&mut self, id: ListenerId) -> bool {
        self.base_mut().events.remove_event_filter(id)
    }

    fn add_event_handler(
        &mut self,
        event_type: TransformEventType,
        handler: impl FnMut(&mut TransformChangedEvent) + 'static,
    ) -> ListenerId
    where
        Self: Sized,
    {
        self.base_mut().events.add_event_handler(event_type, handler)
    }

    fn remove_event_handler(&mut self, id: ListenerId) -> bool {
        self.base_mut().events.remove_event_handler(id)
    }

    /// Set the convenience handler invoked after all other handlers.
    fn set_on_transform_changed(&mut self, handler: Option<EventCallback>) {
        self.base_mut().events.set_on_transform_changed(handler);
    }

    fn event_dispatcher(&mut self) -> &mut EventDispatcher {
        &mut self.base_mut().events
    }
}

fn bounds_through(matrix: &Matrix3x4, is_2d: bool, bounds: &Bounds) -> Bounds {
    if is_2d && bounds.is_planar() {
        return Bounds::enclosing(
            bounds
                .corners_2d()
                .iter()
                .map(|p| Point3D::from(matrix.apply_point_2d(p.x, p.y))),
        );
    }
    Bounds::enclosing(bounds.corners().iter().map(|p| matrix.apply_point(p.x, p.y, p.z)))
}

/// Resolve `(row, column)` for a write: the stored element to update, or
/// `None` when the write targets a structural constant with its own value.
pub(crate) fn writable_slot(
    matrix: &Matrix3x4,
    ty: MatrixType,
    row: usize,
    column: usize,
    value: f64,
) -> Result<Option<crate::MatrixElement>> {
    match matrix.slot(ty, row, column)? {
        ElementSlot::Stored(element) => Ok(Some(element)),
        ElementSlot::Structural(constant) if constant == value => Ok(None),
        ElementSlot::Structural(_) => Err(TransformError::InvalidArgument(format!(
            "cannot set affine matrix {ty} element [{row}, {column}] to {value}"
        ))),
    }
}
