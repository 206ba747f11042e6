extern crate nalgebra as na;

use na::{Matrix3, Matrix3x4, Vector3};
use log::debug;
use crate::GenericFloat;

/**
 * K = [[f, s, px], [0, f*a, py], [0, 0, 1]]
 */
pub fn intrinsics_to_calibration_matrix<F: GenericFloat>(focal_length: F, skew: F, aspect_ratio: F, principal_point_x: F, principal_point_y: F) -> Matrix3<F> {
    Matrix3::<F>::new(focal_length, skew, principal_point_x,
                      F::zero(), focal_length*aspect_ratio, principal_point_y,
                      F::zero(), F::zero(), F::one())
}

/**
 * Inverse of intrinsics_to_calibration_matrix. K is normalized by K[2,2] first.
 * Returns (focal_length, skew, aspect_ratio, principal_point_x, principal_point_y).
 */
pub fn calibration_matrix_to_intrinsics<F: GenericFloat>(calibration_matrix: &Matrix3<F>) -> (F, F, F, F, F) {
    let k = calibration_matrix/calibration_matrix[(2,2)];
    let focal_length = k[(0,0)];
    (focal_length, k[(0,1)], k[(1,1)]/focal_length, k[(0,2)], k[(1,2)])
}

/**
 * RQ decomposition A = U*Q with U upper triangular and Q a rotation, by Givens rotations (Hartley & Zisserman A4.1.1).
 * U[1,1] and U[2,2] come out non-negative, the sign of U[0,0] is left as is.
 * A rotation whose pivot pair is zero is skipped, so the axes of a singular input stay where they are
 * and its rank deficiency shows up as zero entries on the diagonal of U.
 */
#[allow(non_snake_case)]
pub fn rq_decomposition<F: GenericFloat>(matrix: &Matrix3<F>) -> (Matrix3<F>, Matrix3<F>) {
    let mut U = *matrix;
    let mut Q_t = Matrix3::<F>::identity();
    // (row, pivot column, column to zero)
    for &(row, pivot, other) in &[(2, 2, 1), (2, 2, 0), (1, 1, 0)] {
        let givens = givens_rotation(U[(row,pivot)], U[(row,other)], pivot, other);
        U = U*givens;
        U[(row,other)] = F::zero();
        Q_t = Q_t*givens;
    }
    (U, Q_t.transpose())
}

/**
 * Rotation G in the (pivot, other) plane with (.., a_pivot, a_other, ..)*G = (.., hypot, 0, ..).
 */
fn givens_rotation<F: GenericFloat>(pivot_value: F, other_value: F, pivot: usize, other: usize) -> Matrix3<F> {
    let mut rotation = Matrix3::<F>::identity();
    let norm = num_traits::Float::hypot(pivot_value, other_value);
    if norm > F::zero() {
        let c = pivot_value/norm;
        let s = other_value/norm;
        rotation[(pivot,pivot)] = c;
        rotation[(other,other)] = c;
        rotation[(pivot,other)] = -s;
        rotation[(other,pivot)] = s;
    }
    rotation
}

/**
 * Right null vector of P as an inhomogeneous point (Hartley & Zisserman 6.2.4):
 * C = (det[p2,p3,p4], -det[p1,p3,p4], det[p1,p2,p4]) / -det[p1,p2,p3].
 * Lies at infinity when the left 3x3 block of P is singular.
 */
pub fn camera_center<F: GenericFloat>(projection_matrix: &Matrix3x4<F>) -> Vector3<F> {
    let x = column_minor(projection_matrix, 0);
    let y = -column_minor(projection_matrix, 1);
    let z = column_minor(projection_matrix, 2);
    let t = -column_minor(projection_matrix, 3);
    Vector3::<F>::new(x/t, y/t, z/t)
}

fn column_minor<F: GenericFloat>(projection_matrix: &Matrix3x4<F>, skipped_column: usize) -> F {
    let columns = (0..4).filter(|&c| c != skipped_column).map(|c| projection_matrix.column(c).into_owned()).collect::<Vec<Vector3<F>>>();
    Matrix3::<F>::from_columns(&columns).determinant()
}

/**
 * Photogrammetric Computer Vision p.498
 * Decomposes a general camera projection P into K[R|-RC].
 * Where K is the camera intrinsics and R,C are the world to camera rotation and the camera center.
 *
 * P is only defined up to scale, its sign is chosen such that the left block has a positive determinant.
 * K gets a non-negative diagonal and is normalized to K[2,2] = 1, R is a proper rotation.
 */
#[allow(non_snake_case)]
pub fn decompose_projection_matrix<F: GenericFloat>(projection_matrix: &Matrix3x4<F>) -> (Matrix3<F>, Matrix3<F>, Vector3<F>) {
    let A = projection_matrix.fixed_columns::<3>(0).into_owned();
    let C = camera_center(projection_matrix);

    let A_norm = match A.determinant() {
        det if det < F::zero() => -A,
        _ => A
    };

    let (mut K, mut R) = rq_decomposition(&A_norm);
    for i in 0..3 {
        if K[(i,i)] < F::zero() {
            flip_axis(&mut K, &mut R, i);
        }
    }

    // Only reachable for a singular left block. Flipping the axis with the vanishing diagonal term keeps the diagonal of K,
    // ties go to the later axis.
    if R.determinant() < F::zero() {
        let degenerate_axis = (0..3).fold(0, |acc, i| match num_traits::Float::abs(K[(i,i)]) <= num_traits::Float::abs(K[(acc,acc)]) {
            true => i,
            false => acc
        });
        debug!("decompose_projection_matrix: singular calibration block, flipping axis {}", degenerate_axis);
        flip_axis(&mut K, &mut R, degenerate_axis);
    }

    if K[(2,2)] != F::zero() {
        K = K/K[(2,2)];
    }

    (K, R, C)
}

/**
 * K*R is invariant under K <- K*D, R <- D*R with D = diag(..,-1,..).
 */
#[allow(non_snake_case)]
fn flip_axis<F: GenericFloat>(K: &mut Matrix3<F>, R: &mut Matrix3<F>, axis: usize) {
    for j in 0..3 {
        K[(j,axis)] = -K[(j,axis)];
        R[(axis,j)] = -R[(axis,j)];
    }
}

/**
 * P = K[R|-RC]
 */
#[allow(non_snake_case)]
pub fn compose_projection_matrix<F: GenericFloat>(calibration_matrix: &Matrix3<F>, rotation: &Matrix3<F>, position: &Vector3<F>) -> Matrix3x4<F> {
    let mut pose = Matrix3x4::<F>::zeros();
    pose.fixed_view_mut::<3,3>(0,0).copy_from(rotation);
    pose.fixed_view_mut::<3,1>(0,3).copy_from(&(-(rotation*position)));
    calibration_matrix*pose
}
