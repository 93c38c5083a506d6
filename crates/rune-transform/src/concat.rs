//! Type-preserving concatenation.
//!
//! `concatenate(first, second)` is `first ∘ second` (apply `second`, then
//! `first`). Pairs whose product is exactly representable by a specialized
//! variant produce that variant; everything else becomes an [`Affine`].

use crate::any::AnyTransform;
use crate::transform::{Transform, TransformRef};
use crate::{Affine, Rotate, Scale, Translate};

pub(crate) fn concatenate(first: TransformRef<'_>, second: TransformRef<'_>) -> AnyTransform {
    use TransformRef as T;

    let narrowed = match (first, second) {
        (T::Affine(affine), other) => {
            let mut result = affine.clone();
            result.append(other.as_dyn());
            return result.into();
        }
        (other, T::Affine(affine)) => {
            let mut result = affine.clone();
            result.prepend(other.as_dyn());
            return result.into();
        }
        (T::Translate(a), T::Translate(b)) => {
            Some(Translate::new_3d(a.x() + b.x(), a.y() + b.y(), a.z() + b.z()).into())
        }
        (T::Translate(t), T::Scale(s)) => translate_then_scale(t, s),
        (T::Scale(s), T::Translate(t)) => scale_then_translate(s, t),
        (T::Scale(a), T::Scale(b)) => scale_then_scale(a, b),
        (T::Rotate(a), T::Rotate(b)) => rotate_then_rotate(a, b),
        _ => None,
    };

    narrowed.unwrap_or_else(|| {
        let matrix = first.as_dyn().to_matrix().then(&second.as_dyn().to_matrix());
        Affine::from(matrix).into()
    })
}

/// `T(t) ∘ S(s, p)` is `S(s, p + t / (1 - s))` per axis, as long as no axis
/// with a unit factor carries a translation.
fn translate_then_scale(t: &Translate, s: &Scale) -> Option<AnyTransform> {
    let offsets = [t.x(), t.y(), t.z()];
    let factors = s.factors();
    let pivots = s.pivots();

    let mut pivot = [0.0; 3];
    for i in 0..3 {
        let (t, s, p) = (offsets[i], factors[i], pivots[i]);
        pivot[i] = match (t == 0.0, s == 1.0) {
            (true, _) => p,
            (false, false) => p + t / (1.0 - s),
            (false, true) => return None,
        };
    }
    Some(with_factors_and_pivot(factors, pivot))
}

/// `S(s, p) ∘ T(t)` is `S(s, p + s * t / (1 - s))` per axis, as long as
/// every translated axis has a factor other than 0 and 1.
fn scale_then_translate(s: &Scale, t: &Translate) -> Option<AnyTransform> {
    let offsets = [t.x(), t.y(), t.z()];
    let factors = s.factors();
    let pivots = s.pivots();

    let mut pivot = [0.0; 3];
    for i in 0..3 {
        let (t, s, p) = (offsets[i], factors[i], pivots[i]);
        pivot[i] = if t == 0.0 {
            p
        } else if s != 1.0 && s != 0.0 {
            p + s * t / (1.0 - s)
        } else {
            return None;
        };
    }
    Some(with_factors_and_pivot(factors, pivot))
}

fn scale_then_scale(a: &Scale, b: &Scale) -> Option<AnyTransform> {
    if a.pivots() != b.pivots() {
        return None;
    }
    let [ax, ay, az] = a.factors();
    let [bx, by, bz] = b.factors();
    Some(with_factors_and_pivot([ax * bx, ay * by, az * bz], a.pivots()))
}

fn rotate_then_rotate(a: &Rotate, b: &Rotate) -> Option<AnyTransform> {
    if a.pivot() != b.pivot() || !a.same_axis(b) {
        return None;
    }
    Some(Rotate::with_pivot_and_axis(a.angle() + b.angle(), a.pivot(), a.axis()).into())
}

fn with_factors_and_pivot([x, y, z]: [f64; 3], [px, py, pz]: [f64; 3]) -> AnyTransform {
    Scale::with_pivot_3d(x, y, z, px, py, pz).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3D;
    use crate::matrix::Matrix3x4;
    use crate::Shear;

    const EPSILON: f64 = 1e-10;

    fn assert_same_matrix(actual: &dyn Transform, expected: &Matrix3x4) {
        for (a, e) in actual.to_matrix().to_elements().iter().zip(expected.to_elements()) {
            assert!((a - e).abs() < EPSILON, "expected {expected}, got {}", actual.to_matrix());
        }
    }

    fn product(first: &dyn Transform, second: &dyn Transform) -> Matrix3x4 {
        first.to_matrix().then(&second.to_matrix())
    }

    #[test]
    fn test_translations_add() {
        let a = Translate::new_3d(1.0, 2.0, 3.0);
        let b = Translate::new_3d(10.0, 20.0, 30.0);
        let AnyTransform::Translate(t) = a.create_concatenation(&b) else {
            panic!("two translations should stay a translation");
        };
        assert_eq!((t.x(), t.y(), t.z()), (11.0, 22.0, 33.0));
    }

    #[test]
    fn test_translate_then_scale() {
        let t = Translate::new(4.0, 0.0);
        let s = Scale::with_pivot(2.0, 1.0, 1.0, 5.0);
        let result = t.create_concatenation(&s);
        let AnyTransform::Scale(ref scale) = result else {
            panic!("expected a scale");
        };
        assert_eq!(scale.pivots(), [1.0 + 4.0 / (1.0 - 2.0), 5.0, 0.0]);
        assert_same_matrix(&result, &product(&t, &s));

        // translation along an axis the scale leaves alone
        let t = Translate::new(0.0, 4.0);
        assert!(matches!(t.create_concatenation(&s), AnyTransform::Affine(_)));
    }

    #[test]
    fn test_scale_then_translate() {
        let s = Scale::with_pivot(3.0, 0.5, 2.0, 2.0);
        let t = Translate::new(1.0, 2.0);
        let result = s.create_concatenation(&t);
        assert!(matches!(result, AnyTransform::Scale(_)));
        assert_same_matrix(&result, &product(&s, &t));

        let flat = Scale::new_2d(0.0, 2.0);
        assert!(matches!(flat.create_concatenation(&t), AnyTransform::Affine(_)));
        // zero factor only matters where there is a translation
        let t = Translate::new(0.0, 2.0);
        assert!(matches!(flat.create_concatenation(&t), AnyTransform::Scale(_)));
    }

    #[test]
    fn test_scales_multiply_with_shared_pivot() {
        let a = Scale::with_pivot(2.0, 3.0, 1.0, 1.0);
        let b = Scale::with_pivot(4.0, 5.0, 1.0, 1.0);
        let AnyTransform::Scale(s) = a.create_concatenation(&b) else {
            panic!("expected a scale");
        };
        assert_eq!(s.factors(), [8.0, 15.0, 1.0]);

        let c = Scale::with_pivot(4.0, 5.0, 0.0, 1.0);
        let result = a.create_concatenation(&c);
        assert!(matches!(result, AnyTransform::Affine(_)));
        assert_same_matrix(&result, &product(&a, &c));
    }

    #[test]
    fn test_rotations_add_with_same_axis() {
        let a = Rotate::with_pivot_and_axis(
            30.0,
            Point3D::new(1.0, 1.0, 0.0),
            Point3D::new(0.0, 0.0, 2.0),
        );
        let b = Rotate::with_pivot(15.0, 1.0, 1.0);
        let result = a.create_concatenation(&b);
        let AnyTransform::Rotate(ref r) = result else {
            panic!("expected a rotation");
        };
        assert_eq!(r.angle(), 45.0);
        assert_same_matrix(&result, &product(&a, &b));

        let c = Rotate::with_axis(15.0, Rotate::X_AXIS);
        assert!(matches!(a.create_concatenation(&c), AnyTransform::Affine(_)));
    }

    #[test]
    fn test_rotations_about_degenerate_axes_add() {
        let a = Rotate::with_axis(10.0, Point3D::ZERO);
        let b = Rotate::with_axis(20.0, Point3D::new(0.0, f64::MIN_POSITIVE / 1e10, 0.0));
        let result = a.create_concatenation(&b);
        let AnyTransform::Rotate(ref r) = result else {
            panic!("expected a rotation");
        };
        assert_eq!(r.angle(), 30.0);
        assert_same_matrix(&result, &product(&a, &b));
    }

    #[test]
    fn test_affine_operand_is_extended() {
        let a = Affine::new_2d(1.0, 0.0, 5.0, 0.0, 1.0, 0.0);
        let s = Scale::new_2d(8.0, 9.0);

        let appended = a.create_concatenation(&s);
        let mut expected = a.clone();
        expected.append_scale(8.0, 9.0);
        assert_same_matrix(&appended, &expected.to_matrix());

        let prepended = s.create_concatenation(&a);
        assert!(matches!(prepended, AnyTransform::Affine(_)));
        assert_same_matrix(&prepended, &product(&s, &a));
    }

    #[test]
    fn test_other_pairs_become_affine() {
        let sh = Shear::new(1.0, 0.0);
        let t = Translate::new(1.0, 1.0);
        let result = sh.create_concatenation(&t);
        assert!(matches!(result, AnyTransform::Affine(_)));
        assert_same_matrix(&result, &product(&sh, &t));
    }
}
