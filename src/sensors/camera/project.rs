extern crate nalgebra as na;

use na::{Matrix3, Vector2, Vector3, Vector4};
use crate::GenericFloat;
use crate::numerics::lie::angle_axis_to_rotation_matrix;
use crate::sensors::camera::compose_rotation;
use crate::sensors::camera::intrinsics::{IntrinsicsIndex, INTRINSICS_SIZE};
use crate::sensors::camera::shared_extrinsics::{ExtrinsicsIndex, EXTRINSICS_SIZE};
use crate::sensors::camera::projection_matrix::intrinsics_to_calibration_matrix;
use crate::sensors::camera::radial_distortion::radial_distort_point;

/**
 * Projects a homogeneous world point with the raw parameter buffers of a camera and returns (pixel, depth).
 * Works on any GenericFloat so an optimizer can evaluate it with its own scalar type.
 *
 * The translation is removed in homogeneous form, X - w*C, so points at infinity (w = 0) keep their direction.
 * Their depth is reported as +infinity. Negative depth means the point lies behind the camera.
 */
pub fn project_point_to_image<F: GenericFloat>(extrinsics: &[F; EXTRINSICS_SIZE], intrinsics: &[F; INTRINSICS_SIZE], point: &Vector4<F>, shared_to_camera_rotation: &Matrix3<F>) -> (Vector2<F>, F) {
    let p = ExtrinsicsIndex::Position as usize;
    let o = ExtrinsicsIndex::Orientation as usize;
    let position = Vector3::<F>::new(extrinsics[p], extrinsics[p+1], extrinsics[p+2]);
    let orientation = Vector3::<F>::new(extrinsics[o], extrinsics[o+1], extrinsics[o+2]);

    let w = point[3];
    let adjusted_point = point.fixed_rows::<3>(0).into_owned() - position*w;
    let world_to_camera = compose_rotation(shared_to_camera_rotation, &angle_axis_to_rotation_matrix(&orientation));
    let rotated_point = world_to_camera*adjusted_point;

    let depth = match w == F::zero() {
        true => <F as num_traits::Float>::infinity(),
        false => rotated_point[2]/w
    };

    let normalized_point = Vector2::<F>::new(rotated_point[0]/rotated_point[2], rotated_point[1]/rotated_point[2]);
    let distorted_point = radial_distort_point(
        &normalized_point,
        intrinsics[IntrinsicsIndex::RadialDistortion1 as usize],
        intrinsics[IntrinsicsIndex::RadialDistortion2 as usize]);

    let calibration_matrix = intrinsics_to_calibration_matrix(
        intrinsics[IntrinsicsIndex::FocalLength as usize],
        intrinsics[IntrinsicsIndex::Skew as usize],
        intrinsics[IntrinsicsIndex::AspectRatio as usize],
        intrinsics[IntrinsicsIndex::PrincipalPointX as usize],
        intrinsics[IntrinsicsIndex::PrincipalPointY as usize]);
    let pixel = calibration_matrix*Vector3::<F>::new(distorted_point[0], distorted_point[1], F::one());

    (Vector2::<F>::new(pixel[0], pixel[1]), depth)
}
