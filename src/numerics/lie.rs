extern crate nalgebra as na;

use na::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use crate::{constant, Float, GenericFloat};

/**
 * Below this squared angle the axis of an angle-axis vector is numerically undefined
 * and the exponential map falls back to its series expansion.
 */
pub const SMALL_ANGLE_SQR: Float = 1e-12;

pub fn skew_symmetric<F: GenericFloat>(w: &Vector3<F>) -> Matrix3<F> {
    Matrix3::<F>::new(F::zero(), -w[2], w[1],
                      w[2], F::zero(), -w[0],
                      -w[1], w[0], F::zero())
}

pub fn vector_from_skew_symmetric<F: GenericFloat>(w_x: &Matrix3<F>) -> Vector3<F> {
    Vector3::<F>::new(w_x[(2,1)],w_x[(0,2)],w_x[(1,0)])
}

/**
 * Exponential map so(3) -> SO(3) of an angle-axis vector (axis * angle) via Rodrigues' formula.
 * Near zero the second order series I + [w]x + 1/2 [w]x^2 is used.
 */
#[allow(non_snake_case)]
pub fn angle_axis_to_rotation_matrix<F: GenericFloat>(w: &Vector3<F>) -> Matrix3<F> {
    let omega_sqr = w.norm_squared();
    let w_x = skew_symmetric(w);
    let w_x_sqr = w_x*w_x;
    let I = Matrix3::<F>::identity();

    match omega_sqr {
        o if o > constant::<F>(SMALL_ANGLE_SQR) => {
            let omega = num_traits::Float::sqrt(o);
            let A = num_traits::Float::sin(omega)/omega;
            let B = (F::one() - num_traits::Float::cos(omega))/o;
            I + w_x*A + w_x_sqr*B
        },
        _ => I + w_x + w_x_sqr*constant::<F>(0.5)
    }
}

/**
 * Log map SO(3) -> so(3), returned as axis * angle with angle in [0, pi].
 * Goes through the unit quaternion so that angles close to pi keep a well defined axis.
 * The half angle is recovered with atan2 which stays accurate for small rotations, where
 * angle/sin(angle/2) tends to 2.
 */
pub fn rotation_matrix_to_angle_axis<F: GenericFloat>(rotation: &Matrix3<F>) -> Vector3<F> {
    let quaternion = UnitQuaternion::<F>::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*rotation));
    let cos_half = quaternion.scalar();
    let imag = quaternion.imag();
    let sin_half_sqr = imag.norm_squared();

    let factor = match sin_half_sqr {
        s if s > F::zero() => {
            let sin_half = num_traits::Float::sqrt(s);
            let two = constant::<F>(2.0);
            let angle = match cos_half {
                c if c < F::zero() => two*num_traits::Float::atan2(-sin_half, -c),
                c => two*num_traits::Float::atan2(sin_half, c)
            };
            angle/sin_half
        },
        _ => constant::<F>(2.0)
    };

    imag*factor
}

/**
 * Projects a nearly orthonormal matrix onto SO(3).
 * 3D Rotations - Kanatani p.35
 */
pub fn optimal_correction_of_rotation(rotation: &Matrix3<Float>) -> Option<Matrix3<Float>> {
    let mut svd = rotation.svd(true,true);
    let det = match (&svd.u, &svd.v_t) {
        (Some(u), Some(v_t)) => (u*v_t).determinant(),
        _ => return None
    };
    svd.singular_values[0] = 1.0;
    svd.singular_values[1] = 1.0;
    svd.singular_values[2] = det;
    svd.recompose().ok()
}
