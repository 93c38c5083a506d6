//! General mutable affine transform.

use std::fmt;

use tracing::trace;

use crate::any::AnyTransform;
use crate::error::Result;
use crate::geometry::{Point2D, Point3D};
use crate::matrix::{Matrix3x4, MatrixElement};
use crate::matrix_type::MatrixType;
use crate::property::{Property, assign_all};
use crate::transform::{Transform, TransformBase, TransformRef, writable_slot};

/// An affine transform backed by twelve independently settable elements.
///
/// Every mutating operation computes the resulting matrix first and then
/// commits it in one step: all elements are stored before any element
/// listener runs, and exactly one transform-changed event follows. An
/// operation that fails (a singular [`Affine::invert`], a malformed array)
/// leaves the transform untouched and fires nothing.
#[derive(Debug, Clone)]
pub struct Affine {
    elements: [Property<f64>; 12],
    base: TransformBase,
}

impl Default for Affine {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Matrix3x4> for Affine {
    fn from(matrix: Matrix3x4) -> Self {
        let values = matrix.to_elements();
        Self {
            elements: std::array::from_fn(|i| {
                Property::new(MatrixElement::ALL[i].name(), values[i])
            }),
            base: TransformBase::new(&matrix),
        }
    }
}

impl Affine {
    /// Identity transform.
    pub fn new() -> Self {
        Self::from(Matrix3x4::IDENTITY)
    }

    pub fn new_2d(mxx: f64, mxy: f64, tx: f64, myx: f64, myy: f64, ty: f64) -> Self {
        Self::from(Matrix3x4::new_2d(mxx, mxy, tx, myx, myy, ty))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_3d(
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
        Self::from(Matrix3x4::new(mxx, mxy, mxz, tx, myx, myy, myz, ty, mzx, mzy, mzz, tz))
    }

    /// Copy of the matrix of any transform.
    pub fn from_transform(transform: &dyn Transform) -> Self {
        Self::from(transform.to_matrix())
    }

    /// Read the elements from `matrix[offset..]`, laid out as `ty`.
    pub fn from_array(matrix: &[f64], ty: MatrixType, offset: usize) -> Result<Self> {
        Ok(Self::from(Matrix3x4::from_array(matrix, ty, offset)?))
    }

    pub fn get(&self, element: MatrixElement) -> f64 {
        self.elements[element.index()].get()
    }

    /// Set a single element. Nothing fires if the value is unchanged.
    pub fn set(&mut self, element: MatrixElement, value: f64) {
        let property = &mut self.elements[element.index()];
        if let Some(old) = property.replace(value) {
            property.notify(old);
            let matrix = self.to_matrix();
            self.base.matrix_changed(&matrix);
        }
    }

    /// The observable property holding `element`.
    pub fn property(&mut self, element: MatrixElement) -> &mut Property<f64> {
        &mut self.elements[element.index()]
    }

    pub fn set_mxx(&mut self, value: f64) {
        self.set(MatrixElement::Mxx, value);
    }

    pub fn set_mxy(&mut self, value: f64) {
        self.set(MatrixElement::Mxy, value);
    }

    pub fn set_mxz(&mut self, value: f64) {
        self.set(MatrixElement::Mxz, value);
    }

    pub fn set_tx(&mut self, value: f64) {
        self.set(MatrixElement::Tx, value);
    }

    pub fn set_myx(&mut self, value: f64) {
        self.set(MatrixElement::Myx, value);
    }

    pub fn set_myy(&mut self, value: f64) {
        self.set(MatrixElement::Myy, value);
    }

    pub fn set_myz(&mut self, value: f64) {
        self.set(MatrixElement::Myz, value);
    }

    pub fn set_ty(&mut self, value: f64) {
        self.set(MatrixElement::Ty, value);
    }

    pub fn set_mzx(&mut self, value: f64) {
        self.set(MatrixElement::Mzx, value);
    }

    pub fn set_mzy(&mut self, value: f64) {
        self.set(MatrixElement::Mzy, value);
    }

    pub fn set_mzz(&mut self, value: f64) {
        self.set(MatrixElement::Mzz, value);
    }

    pub fn set_tz(&mut self, value: f64) {
        self.set(MatrixElement::Tz, value);
    }

    /// Set element `(row, column)` of the matrix viewed as `ty`.
    ///
    /// Writing the structural last row of a square shape is accepted only
    /// when the value equals the constant already there.
    pub fn set_element(
        &mut self,
        ty: MatrixType,
        row: usize,
        column: usize,
        value: f64,
    ) -> Result<()> {
        if let Some(element) = writable_slot(&self.to_matrix(), ty, row, column, value)? {
            self.set(element, value);
        }
        Ok(())
    }

    /// Store `matrix` and report the change once.
    fn commit(&mut self, matrix: Matrix3x4) {
        assign_all(self.elements.each_mut(), matrix.to_elements());
        self.base.matrix_changed(&matrix);
    }

    fn append_matrix(&mut self, other: &Matrix3x4) {
        let matrix = self.to_matrix().then(other);
        self.commit(matrix);
    }

    fn prepend_matrix(&mut self, other: &Matrix3x4) {
        let matrix = self.to_matrix().pre_multiply(other);
        self.commit(matrix);
    }

    pub fn set_to_transform(&mut self, transform: &dyn Transform) {
        self.commit(transform.to_matrix());
    }

    pub fn set_to_transform_2d(
        &mut self,
        mxx: f64,
        mxy: f64,
        tx: f64,
        myx: f64,
        myy: f64,
        ty: f64,
    ) {
        self.commit(Matrix3x4::new_2d(mxx, mxy, tx, myx, myy, ty));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_to_transform_3d(
        &mut self,
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
    ) {
        self.commit(Matrix3x4::new(mxx, mxy, mxz, tx, myx, myy, myz, ty, mzx, mzy, mzz, tz));
    }

    pub fn set_to_transform_array(
        &mut self,
        matrix: &[f64],
        ty: MatrixType,
        offset: usize,
    ) -> Result<()> {
        let matrix = Matrix3x4::from_array(matrix, ty, offset)?;
        self.commit(matrix);
        Ok(())
    }

    pub fn set_to_identity(&mut self) {
        self.commit(Matrix3x4::IDENTITY);
    }

    /// Replace this transform with its inverse.
    pub fn invert(&mut self) -> Result<()> {
        let inverse = self.inverse_matrix()?;
        self.commit(inverse);
        Ok(())
    }

    /// Recompute the 2D classification from the current elements.
    pub fn compute_is_2d(&self) -> bool {
        self.to_matrix().is_2d()
    }

    /// `self = self * transform`: `transform` applies first.
    pub fn append(&mut self, transform: &dyn Transform) {
        self.append_matrix(&transform.to_matrix());
    }

    pub fn append_2d(&mut self, mxx: f64, mxy: f64, tx: f64, myx: f64, myy: f64, ty: f64) {
        self.append_matrix(&Matrix3x4::new_2d(mxx, mxy, tx, myx, myy, ty));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn append_3d(
        &mut self,
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
    ) {
        self.append_matrix(&Matrix3x4::new(
            mxx, mxy, mxz, tx, myx, myy, myz, ty, mzx, mzy, mzz, tz,
        ));
    }

    pub fn append_array(&mut self, matrix: &[f64], ty: MatrixType, offset: usize) -> Result<()> {
        let other = Matrix3x4::from_array(matrix, ty, offset)?;
        self.append_matrix(&other);
        Ok(())
    }

    /// `self = transform * self`: `transform` applies last.
    pub fn prepend(&mut self, transform: &dyn Transform) {
        self.prepend_matrix(&transform.to_matrix());
    }

    pub fn prepend_2d(&mut self, mxx: f64, mxy: f64, tx: f64, myx: f64, myy: f64, ty: f64) {
        self.prepend_matrix(&Matrix3x4::new_2d(mxx, mxy, tx, myx, myy, ty));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn prepend_3d(
        &mut self,
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
    ) {
        self.prepend_matrix(&Matrix3x4::new(
            mxx, mxy, mxz, tx, myx, myy, myz, ty, mzx, mzy, mzz, tz,
        ));
    }

    pub fn prepend_array(&mut self, matrix: &[f64], ty: MatrixType, offset: usize) -> Result<()> {
        let other = Matrix3x4::from_array(matrix, ty, offset)?;
        self.prepend_matrix(&other);
        Ok(())
    }

    pub fn append_translation(&mut self, tx: f64, ty: f64) {
        self.append_matrix(&Matrix3x4::translation(tx, ty, 0.0));
    }

    pub fn append_translation_3d(&mut self, tx: f64, ty: f64, tz: f64) {
        self.append_matrix(&Matrix3x4::translation(tx, ty, tz));
    }

    pub fn prepend_translation(&mut self, tx: f64, ty: f64) {
        self.prepend_matrix(&Matrix3x4::translation(tx, ty, 0.0));
    }

    pub fn prepend_translation_3d(&mut self, tx: f64, ty: f64, tz: f64) {
        self.prepend_matrix(&Matrix3x4::translation(tx, ty, tz));
    }

    pub fn append_scale(&mut self, sx: f64, sy: f64) {
        self.append_matrix(&Matrix3x4::scaling(sx, sy, 1.0));
    }

    pub fn append_scale_with_pivot(&mut self, sx: f64, sy: f64, pivot_x: f64, pivot_y: f64) {
        self.append_matrix(&Matrix3x4::scaling(sx, sy, 1.0).about_pivot(pivot_x, pivot_y, 0.0));
    }

    pub fn append_scale_at(&mut self, sx: f64, sy: f64, pivot: Point2D) {
        self.append_scale_with_pivot(sx, sy, pivot.x, pivot.y);
    }

    pub fn append_scale_3d(&mut self, sx: f64, sy: f64, sz: f64) {
        self.append_matrix(&Matrix3x4::scaling(sx, sy, sz));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn append_scale_3d_with_pivot(
        &mut self,
        sx: f64,
        sy: f64,
        sz: f64,
        pivot_x: f64,
        pivot_y: f64,
        pivot_z: f64,
    ) {
        self.append_matrix(&Matrix3x4::scaling(sx, sy, sz).about_pivot(pivot_x, pivot_y, pivot_z));
    }

    pub fn append_scale_3d_at(&mut self, sx: f64, sy: f64, sz: f64, pivot: Point3D) {
        self.append_scale_3d_with_pivot(sx, sy, sz, pivot.x, pivot.y, pivot.z);
    }

    pub fn prepend_scale(&mut self, sx: f64, sy: f64) {
        self.prepend_matrix(&Matrix3x4::scaling(sx, sy, 1.0));
    }

    pub fn prepend_scale_with_pivot(&mut self, sx: f64, sy: f64, pivot_x: f64, pivot_y: f64) {
        self.prepend_matrix(&Matrix3x4::scaling(sx, sy, 1.0).about_pivot(pivot_x, pivot_y, 0.0));
    }

    pub fn prepend_scale_at(&mut self, sx: f64, sy: f64, pivot: Point2D) {
        self.prepend_scale_with_pivot(sx, sy, pivot.x, pivot.y);
    }

    pub fn prepend_scale_3d(&mut self, sx: f64, sy: f64, sz: f64) {
        self.prepend_matrix(&Matrix3x4::scaling(sx, sy, sz));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn prepend_scale_3d_with_pivot(
        &mut self,
        sx: f64,
        sy: f64,
        sz: f64,
        pivot_x: f64,
        pivot_y: f64,
        pivot_z: f64,
    ) {
        self.prepend_matrix(&Matrix3x4::scaling(sx, sy, sz).about_pivot(pivot_x, pivot_y, pivot_z));
    }

    pub fn prepend_scale_3d_at(&mut self, sx: f64, sy: f64, sz: f64, pivot: Point3D) {
        self.prepend_scale_3d_with_pivot(sx, sy, sz, pivot.x, pivot.y, pivot.z);
    }

    pub fn append_shear(&mut self, shx: f64, shy: f64) {
        self.append_matrix(&Matrix3x4::shearing(shx, shy));
    }

    pub fn append_shear_with_pivot(&mut self, shx: f64, shy: f64, pivot_x: f64, pivot_y: f64) {
        self.append_matrix(&Matrix3x4::shearing(shx, shy).about_pivot(pivot_x, pivot_y, 0.0));
    }

    pub fn append_shear_at(&mut self, shx: f64, shy: f64, pivot: Point2D) {
        self.append_shear_with_pivot(shx, shy, pivot.x, pivot.y);
    }

    pub fn prepend_shear(&mut self, shx: f64, shy: f64) {
        self.prepend_matrix(&Matrix3x4::shearing(shx, shy));
    }

    pub fn prepend_shear_with_pivot(&mut self, shx: f64, shy: f64, pivot_x: f64, pivot_y: f64) {
        self.prepend_matrix(&Matrix3x4::shearing(shx, shy).about_pivot(pivot_x, pivot_y, 0.0));
    }

    pub fn prepend_shear_at(&mut self, shx: f64, shy: f64, pivot: Point2D) {
        self.prepend_shear_with_pivot(shx, shy, pivot.x, pivot.y);
    }

    /// Append a rotation of `angle` degrees about the z axis.
    pub fn append_rotation(&mut self, angle: f64) {
        self.append_matrix(&Matrix3x4::rotation_2d(angle));
    }

    pub fn append_rotation_with_pivot(&mut self, angle: f64, pivot_x: f64, pivot_y: f64) {
        self.append_matrix(&Matrix3x4::rotation_2d(angle).about_pivot(pivot_x, pivot_y, 0.0));
    }

    pub fn append_rotation_at(&mut self, angle: f64, pivot: Point2D) {
        self.append_rotation_with_pivot(angle, pivot.x, pivot.y);
    }

    /// Append a rotation about an arbitrary axis through a pivot.
    ///
    /// A zero-length axis leaves the transform unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn append_rotation_3d(
        &mut self,
        angle: f64,
        pivot_x: f64,
        pivot_y: f64,
        pivot_z: f64,
        axis_x: f64,
        axis_y: f64,
        axis_z: f64,
    ) {
        self.append_rotation_about(
            angle,
            Point3D::new(pivot_x, pivot_y, pivot_z),
            Point3D::new(axis_x, axis_y, axis_z),
        );
    }

    pub fn append_rotation_about(&mut self, angle: f64, pivot: Point3D, axis: Point3D) {
        if let Some(rotation) = pivoted_rotation(angle, pivot, axis) {
            self.append_matrix(&rotation);
        }
    }

    pub fn prepend_rotation(&mut self, angle: f64) {
        self.prepend_matrix(&Matrix3x4::rotation_2d(angle));
    }

    pub fn prepend_rotation_with_pivot(&mut self, angle: f64, pivot_x: f64, pivot_y: f64) {
        self.prepend_matrix(&Matrix3x4::rotation_2d(angle).about_pivot(pivot_x, pivot_y, 0.0));
    }

    pub fn prepend_rotation_at(&mut self, angle: f64, pivot: Point2D) {
        self.prepend_rotation_with_pivot(angle, pivot.x, pivot.y);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn prepend_rotation_3d(
        &mut self,
        angle: f64,
        pivot_x: f64,
        pivot_y: f64,
        pivot_z: f64,
        axis_x: f64,
        axis_y: f64,
        axis_z: f64,
    ) {
        self.prepend_rotation_about(
            angle,
            Point3D::new(pivot_x, pivot_y, pivot_z),
            Point3D::new(axis_x, axis_y, axis_z),
        );
    }

    pub fn prepend_rotation_about(&mut self, angle: f64, pivot: Point3D, axis: Point3D) {
        if let Some(rotation) = pivoted_rotation(angle, pivot, axis) {
            self.prepend_matrix(&rotation);
        }
    }
}

fn pivoted_rotation(angle: f64, pivot: Point3D, axis: Point3D) -> Option<Matrix3x4> {
    let Some(rotation) = Matrix3x4::rotation(angle, axis) else {
        trace!(?axis, "ignoring rotation about a zero-length axis");
        return None;
    };
    Some(rotation.about_pivot(pivot.x, pivot.y, pivot.z))
}

impl Transform for Affine {
    fn to_matrix(&self) -> Matrix3x4 {
        Matrix3x4::from_elements(std::array::from_fn(|i| self.elements[i].get()))
    }

    fn base(&self) -> &TransformBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        &mut self.base
    }

    fn as_variant(&self) -> TransformRef<'_> {
        TransformRef::Affine(self)
    }

    fn create_inverse(&self) -> Result<AnyTransform> {
        Ok(Affine::from(self.inverse_matrix()?).into())
    }
}

impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Affine [")?;
        for (i, element) in MatrixElement::ALL.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", element.name(), self.elements[i].get())?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::events::{TransformChangedEvent, TransformEventType};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const EPSILON: f64 = 1e-10;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn assert_matrix(actual: &Matrix3x4, expected: &Matrix3x4) {
        for (a, e) in actual.to_elements().iter().zip(expected.to_elements()) {
            assert!(approx_eq(*a, e), "expected {expected}, got {actual}");
        }
    }

    /// Count transform-changed events delivered to `affine`.
    fn count_events(affine: &mut Affine) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        affine.add_event_handler(TransformEventType::TransformChanged, move |_| c.set(c.get() + 1));
        count
    }

    #[test]
    fn test_append_scale_on_translation() {
        let original = Affine::new_2d(1.0, 0.0, 2.0, 0.0, 1.0, 3.0);
        let mut a = original.clone();
        a.append_scale(2.0, 2.0);
        assert_eq!(a.mxx(), 2.0);
        assert_eq!(a.myy(), 2.0);
        assert_eq!(a.tx(), 2.0);
        assert_eq!(a.ty(), 3.0);

        let expected = original.create_concatenation(&crate::Scale::new_2d(2.0, 2.0));
        assert_matrix(&a.to_matrix(), &expected.to_matrix());
    }

    #[test]
    fn test_append_shear() {
        let mut a = Affine::new();
        a.append_shear(2.0, 0.0);
        assert_eq!(a.to_array(MatrixType::Mt2d2x3).unwrap(), vec![1.0, 2.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_append_versus_prepend() {
        let mut appended = Affine::new();
        appended.append_translation(10.0, 0.0);
        appended.append_scale(2.0, 2.0);
        assert_eq!(appended.transform_xy(1.0, 1.0).unwrap(), Point2D::new(12.0, 2.0));

        let mut prepended = Affine::new();
        prepended.prepend_translation(10.0, 0.0);
        prepended.prepend_scale(2.0, 2.0);
        assert_eq!(prepended.transform_xy(1.0, 1.0).unwrap(), Point2D::new(22.0, 2.0));
    }

    #[test]
    fn test_pivoted_rotation_keeps_pivot() {
        let mut a = Affine::new();
        a.append_rotation_with_pivot(90.0, 5.0, 5.0);
        let p = a.transform_xy(5.0, 5.0).unwrap();
        assert!(approx_eq(p.x, 5.0));
        assert!(approx_eq(p.y, 5.0));

        let mut b = Affine::new();
        b.prepend_rotation_about(90.0, Point3D::new(1.0, 2.0, 3.0), Point3D::new(1.0, 0.0, 0.0));
        let p = b.transform_xyz(1.0, 2.0, 3.0);
        assert!(approx_eq(p.x, 1.0));
        assert!(approx_eq(p.y, 2.0));
        assert!(approx_eq(p.z, 3.0));
        assert!(!b.is_type_2d());
    }

    #[test]
    fn test_zero_axis_rotation_is_noop() {
        let mut a = Affine::new_2d(2.0, 0.0, 1.0, 0.0, 2.0, 1.0);
        let events = count_events(&mut a);
        let before = a.to_matrix();

        a.append_rotation_3d(30.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        a.prepend_rotation_3d(30.0, 0.0, 0.0, 0.0, 1e-200, 1e-200, 0.0);
        assert_eq!(a.to_matrix(), before);
        assert_eq!(events.get(), 0);
    }

    #[test]
    fn test_compound_operation_fires_once() {
        let mut a = Affine::new();
        let events = count_events(&mut a);
        let invalidations = Rc::new(Cell::new(0));
        for element in [MatrixElement::Mxx, MatrixElement::Tx, MatrixElement::Mzz] {
            let i = invalidations.clone();
            a.property(element).add_invalidation_listener(move || i.set(i.get() + 1));
        }

        a.append_scale_3d_with_pivot(2.0, 3.0, 1.0, 4.0, 0.0, 0.0);
        assert_eq!(events.get(), 1);
        // mxx and tx changed, mzz stayed 1
        assert_eq!(invalidations.get(), 2);

        a.set_to_identity();
        assert_eq!(events.get(), 2);
        assert_eq!(invalidations.get(), 4);
    }

    #[test]
    fn test_observer_sees_committed_state() {
        let mut a = Affine::new();
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        a.set_on_transform_changed(Some(Box::new(move |event: &mut TransformChangedEvent| {
            *s.borrow_mut() = Some(*event.matrix());
        })));

        a.append_translation_3d(1.0, 2.0, 3.0);
        assert_eq!(*seen.borrow(), Some(Matrix3x4::translation(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_flags_fire_only_when_flipped() {
        let mut a = Affine::new();
        let flips = Rc::new(RefCell::new(Vec::new()));
        let f = flips.clone();
        a.type_2d_property().add_change_listener(move |old, new| f.borrow_mut().push((old, new)));
        let identity_changes = Rc::new(Cell::new(0));
        let c = identity_changes.clone();
        a.identity_property().add_invalidation_listener(move || c.set(c.get() + 1));

        a.append_translation(1.0, 1.0);
        a.append_translation(1.0, 1.0);
        assert!(flips.borrow().is_empty());
        assert_eq!(identity_changes.get(), 1);

        a.set_tz(5.0);
        a.set_tz(0.0);
        assert_eq!(*flips.borrow(), vec![(true, false), (false, true)]);
        assert!(!a.is_identity());
    }

    #[test]
    fn test_invert() {
        let mut a = Affine::new_3d(7.0, 3.0, 4.0, 5.0, 6.0, 7.0, 5.0, 9.0, 10.0, 11.0, 12.0, 13.0);
        let original = a.to_matrix();
        a.invert().unwrap();
        assert_matrix(&a.to_matrix().then(&original), &Matrix3x4::IDENTITY);
    }

    #[test]
    fn test_singular_invert_leaves_state() {
        let mut a = Affine::new_3d(0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 6.0);
        let events = count_events(&mut a);
        let before = a.to_matrix();

        assert!(matches!(a.invert(), Err(TransformError::NonInvertible(_))));
        assert_eq!(a.to_matrix(), before);
        assert_eq!(events.get(), 0);
    }

    #[test]
    fn test_inverse_cache_invalidated_by_mutation() {
        let mut a = Affine::new_2d(2.0, 0.0, 0.0, 0.0, 2.0, 0.0);
        assert!(!a.base().has_cached_inverse());
        let p = a.inverse_transform_xy(4.0, 4.0).unwrap();
        assert_eq!(p, Point2D::new(2.0, 2.0));
        assert!(a.base().has_cached_inverse());

        a.set_mxx(4.0);
        assert!(!a.base().has_cached_inverse());
        let p = a.inverse_transform_xy(4.0, 4.0).unwrap();
        assert_eq!(p, Point2D::new(1.0, 2.0));
    }

    #[test]
    fn test_set_element() {
        let mut a = Affine::new();
        a.set_element(MatrixType::Mt3d4x4, 1, 3, 7.0).unwrap();
        assert_eq!(a.ty(), 7.0);
        assert_eq!(a.element(MatrixType::Mt3d4x4, 1, 3).unwrap(), 7.0);

        a.set_element(MatrixType::Mt2d3x3, 2, 2, 1.0).unwrap();
        assert!(matches!(
            a.set_element(MatrixType::Mt2d3x3, 2, 2, 2.0),
            Err(TransformError::InvalidArgument(_))
        ));
        assert!(matches!(
            a.set_element(MatrixType::Mt3d3x4, 3, 0, 0.0),
            Err(TransformError::IndexOutOfBounds(_))
        ));

        a.set_mzx(1.0);
        assert!(matches!(
            a.set_element(MatrixType::Mt2d2x3, 0, 0, 1.0),
            Err(TransformError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_array_append_rejects_non_affine() {
        let mut a = Affine::new_2d(1.0, 0.0, 5.0, 0.0, 1.0, 6.0);
        let events = count_events(&mut a);
        let before = a.to_matrix();

        let data = [0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.5, 1.0];
        assert!(matches!(
            a.append_array(&data, MatrixType::Mt2d3x3, 1),
            Err(TransformError::InvalidArgument(_))
        ));
        assert!(matches!(
            a.prepend_array(&data, MatrixType::Mt3d3x4, 0),
            Err(TransformError::IndexOutOfBounds(_))
        ));
        assert_eq!(a.to_matrix(), before);
        assert_eq!(events.get(), 0);

        let data = [2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0];
        a.append_array(&data, MatrixType::Mt2d3x3, 0).unwrap();
        assert_eq!(a.to_matrix(), Matrix3x4::new_2d(2.0, 0.0, 5.0, 0.0, 2.0, 6.0));
        assert_eq!(events.get(), 1);
    }

    #[test]
    fn test_4x4_round_trip() {
        let data = [
            -1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 0.0, 0.0, 0.0, 1.0,
        ];
        let a = Affine::from_array(&data, MatrixType::Mt3d4x4, 1).unwrap();
        assert_eq!(a.to_array(MatrixType::Mt3d4x4).unwrap(), data[1..].to_vec());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = Affine::new_2d(1.0, 0.0, 3.0, 0.0, 1.0, 4.0);
        let events = count_events(&mut a);
        let mut b = a.clone();
        b.set_tx(10.0);
        assert_eq!(a.tx(), 3.0);
        assert_eq!(events.get(), 0);
    }

    #[test]
    fn test_display() {
        let a = Affine::new();
        let text = a.to_string();
        assert!(text.starts_with("Affine [mxx=1, mxy=0"));
        assert!(text.ends_with("tz=0]"));
    }
}
