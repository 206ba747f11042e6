extern crate nalgebra as na;

use na::{Matrix3, Matrix3x4, Vector2, Vector3, Vector4};
use log::info;
use crate::{Float, GenericFloat};
use crate::numerics::lie::{angle_axis_to_rotation_matrix, rotation_matrix_to_angle_axis};

pub mod config;
pub mod error;
pub mod intrinsics;
pub mod project;
pub mod projection_matrix;
pub mod radial_distortion;
pub mod shared_extrinsics;

use self::error::CameraError;
use self::intrinsics::{Intrinsics, INTRINSICS_SIZE};
use self::project::project_point_to_image;
use self::projection_matrix::{compose_projection_matrix, decompose_projection_matrix};
use self::radial_distortion::UndistortionParameters;
use self::shared_extrinsics::SharedExtrinsics;

/**
 * A decomposed focal term at or below this fraction of |K| is treated as zero.
 */
const ZERO_FOCAL_LENGTH_EPS: Float = 64.0*Float::EPSILON;

/**
 * Effective world to camera rotation of a rig camera: R = shared_to_camera * world_to_shared.
 */
pub fn compose_rotation<F: GenericFloat>(shared_to_camera_rotation: &Matrix3<F>, world_to_shared_rotation: &Matrix3<F>) -> Matrix3<F> {
    shared_to_camera_rotation*world_to_shared_rotation
}

/**
 * Inverse of compose_rotation with respect to the shared part: world_to_shared = shared_to_camera^T * R.
 * shared_to_camera has to be a rotation.
 */
pub fn remove_local_rotation<F: GenericFloat>(shared_to_camera_rotation: &Matrix3<F>, world_to_camera_rotation: &Matrix3<F>) -> Matrix3<F> {
    shared_to_camera_rotation.transpose()*world_to_camera_rotation
}

/**
 * Pinhole camera with two coefficient radial distortion.
 *
 * Intrinsics and the fixed shared to camera rotation belong to the camera, the pose is a SharedExtrinsics
 * handle that other cameras of the same rig may hold as well. Cloning a camera copies its intrinsics and
 * keeps pointing at the same pose.
 *
 * Setters do no validation. A zero focal length or an unset image size (0) simply propagate into the
 * derived quantities.
 *
 * The pose handle is an Rc<RefCell<..>>, so a Camera is neither Send nor Sync and stays on the thread
 * that built it, projection included. To work on several threads, copy the buffers out with
 * intrinsics() and extrinsics().to_parameters(), use project::project_point_to_image on the copies and
 * write results back through mutable_intrinsics() and extrinsics().parameters_mut().
 */
#[derive(Debug,Clone)]
pub struct Camera {
    intrinsics: Intrinsics,
    extrinsics: SharedExtrinsics,
    shared_to_camera_rotation: Matrix3<Float>,
    image_size: [usize; 2],
    undistortion_parameters: UndistortionParameters
}

impl Default for Camera {
    fn default() -> Camera {
        Camera::new()
    }
}

impl Camera {
    /**
     * Identity intrinsics (f = 1, a = 1, rest 0), identity pose owned by this camera alone, unset image size.
     */
    pub fn new() -> Camera {
        Camera::with_shared_extrinsics(SharedExtrinsics::new())
    }

    pub fn with_shared_extrinsics(extrinsics: SharedExtrinsics) -> Camera {
        Camera {
            intrinsics: Intrinsics::default(),
            extrinsics,
            shared_to_camera_rotation: Matrix3::<Float>::identity(),
            image_size: [0, 0],
            undistortion_parameters: UndistortionParameters::default()
        }
    }

    /**
     * Sets image size, pose and the linear intrinsics from a decomposition of the projection matrix.
     * Radial distortion cannot be recovered from P and is left untouched.
     *
     * On ZeroFocalLength the image size and the pose have already been written, the camera should be discarded.
     */
    pub fn initialize_from_projection_matrix(&mut self, image_width: usize, image_height: usize, projection_matrix: &Matrix3x4<Float>) -> Result<(), CameraError> {
        debug_assert!(image_width > 0, "image width has to be positive");
        debug_assert!(image_height > 0, "image height has to be positive");
        self.set_image_size(image_width, image_height);

        let (calibration_matrix, world_to_camera_rotation, position) = decompose_projection_matrix(projection_matrix);
        self.set_orientation_from_rotation_matrix(&world_to_camera_rotation);
        self.set_position(&position);

        let fx = calibration_matrix[(0,0)];
        let fy = calibration_matrix[(1,1)];
        let zero_threshold = ZERO_FOCAL_LENGTH_EPS*calibration_matrix.norm();
        if fx.abs() <= zero_threshold || fy.abs() <= zero_threshold {
            info!("Cannot set focal lengths to zero! fx: {}, fy: {}", fx, fy);
            return Err(CameraError::ZeroFocalLength{fx, fy});
        }

        self.intrinsics.set_from_calibration_matrix(&calibration_matrix);
        Ok(())
    }

    /**
     * K[R|-RC] with the effective rotation. Does not include radial distortion.
     */
    pub fn projection_matrix(&self) -> Matrix3x4<Float> {
        compose_projection_matrix(&self.calibration_matrix(), &self.orientation_as_rotation_matrix(), &self.position())
    }

    pub fn calibration_matrix(&self) -> Matrix3<Float> {
        self.intrinsics.calibration_matrix()
    }

    /**
     * Projects a homogeneous point into the image, distortion included. Returns (pixel, depth).
     * Negative depth: behind the camera. Points at infinity (w = 0) have depth +infinity.
     */
    pub fn project_point(&self, point: &Vector4<Float>) -> (Vector2<Float>, Float) {
        project_point_to_image(&self.extrinsics.to_parameters(), self.intrinsics.parameters(), point, &self.shared_to_camera_rotation)
    }

    /**
     * World frame ray through the pixel, scaled to unit depth so that for d = project_point(X).1
     * and r = pixel_to_unit_depth_ray(pixel) the point is X = C + r*d.
     */
    pub fn pixel_to_unit_depth_ray(&self, pixel: &Vector2<Float>) -> Result<Vector3<Float>, CameraError> {
        let focal_length_y = self.focal_length_y();
        let y_normalized = (pixel[1] - self.principal_point_y())/focal_length_y;
        let x_normalized = (pixel[0] - self.principal_point_x() - y_normalized*self.skew())/self.focal_length();

        let undistorted_point = self.intrinsics.radial_distortion().undistort(
            &Vector2::<Float>::new(x_normalized, y_normalized),
            &self.undistortion_parameters)?;

        let rotation = self.orientation_as_rotation_matrix();
        Ok(rotation.transpose()*undistorted_point.push(1.0))
    }

    pub fn set_position(&mut self, position: &Vector3<Float>) {
        self.extrinsics.set_position(position);
    }

    pub fn position(&self) -> Vector3<Float> {
        self.extrinsics.position()
    }

    /**
     * Takes the effective world to camera rotation, the shared pose stores it without the local rotation.
     */
    pub fn set_orientation_from_rotation_matrix(&mut self, world_to_camera_rotation: &Matrix3<Float>) {
        let world_to_shared_rotation = remove_local_rotation(&self.shared_to_camera_rotation, world_to_camera_rotation);
        self.extrinsics.set_orientation(&rotation_matrix_to_angle_axis(&world_to_shared_rotation));
    }

    pub fn set_orientation_from_angle_axis(&mut self, world_to_camera_angle_axis: &Vector3<Float>) {
        self.set_orientation_from_rotation_matrix(&angle_axis_to_rotation_matrix(world_to_camera_angle_axis));
    }

    pub fn orientation_as_rotation_matrix(&self) -> Matrix3<Float> {
        compose_rotation(&self.shared_to_camera_rotation, &self.extrinsics.rotation_matrix())
    }

    pub fn orientation_as_angle_axis(&self) -> Vector3<Float> {
        rotation_matrix_to_angle_axis(&self.orientation_as_rotation_matrix())
    }

    pub fn set_focal_length(&mut self, focal_length: Float) {
        self.intrinsics.set_focal_length(focal_length);
    }

    pub fn focal_length(&self) -> Float {
        self.intrinsics.focal_length()
    }

    pub fn focal_length_y(&self) -> Float {
        self.intrinsics.focal_length_y()
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: Float) {
        self.intrinsics.set_aspect_ratio(aspect_ratio);
    }

    pub fn aspect_ratio(&self) -> Float {
        self.intrinsics.aspect_ratio()
    }

    pub fn set_skew(&mut self, skew: Float) {
        self.intrinsics.set_skew(skew);
    }

    pub fn skew(&self) -> Float {
        self.intrinsics.skew()
    }

    pub fn set_principal_point(&mut self, principal_point_x: Float, principal_point_y: Float) {
        self.intrinsics.set_principal_point(principal_point_x, principal_point_y);
    }

    pub fn principal_point_x(&self) -> Float {
        self.intrinsics.principal_point_x()
    }

    pub fn principal_point_y(&self) -> Float {
        self.intrinsics.principal_point_y()
    }

    pub fn set_radial_distortion(&mut self, radial_distortion_1: Float, radial_distortion_2: Float) {
        self.intrinsics.set_radial_distortion(radial_distortion_1, radial_distortion_2);
    }

    pub fn radial_distortion_1(&self) -> Float {
        self.intrinsics.radial_distortion_1()
    }

    pub fn radial_distortion_2(&self) -> Float {
        self.intrinsics.radial_distortion_2()
    }

    pub fn set_image_size(&mut self, image_width: usize, image_height: usize) {
        self.image_size = [image_width, image_height];
    }

    pub fn image_width(&self) -> usize { self.image_size[0] }
    pub fn image_height(&self) -> usize { self.image_size[1] }

    pub fn intrinsics(&self) -> &[Float; INTRINSICS_SIZE] {
        self.intrinsics.parameters()
    }

    pub fn mutable_intrinsics(&mut self) -> &mut [Float; INTRINSICS_SIZE] {
        self.intrinsics.parameters_mut()
    }

    pub fn extrinsics(&self) -> &SharedExtrinsics {
        &self.extrinsics
    }

    pub fn set_shared_extrinsics(&mut self, extrinsics: SharedExtrinsics) {
        self.extrinsics = extrinsics;
    }

    pub fn shared_to_camera_rotation(&self) -> &Matrix3<Float> {
        &self.shared_to_camera_rotation
    }

    pub fn set_shared_to_camera_rotation(&mut self, shared_to_camera_rotation: &Matrix3<Float>) {
        self.shared_to_camera_rotation = *shared_to_camera_rotation;
    }

    pub fn undistortion_parameters(&self) -> &UndistortionParameters {
        &self.undistortion_parameters
    }

    pub fn set_undistortion_parameters(&mut self, undistortion_parameters: UndistortionParameters) {
        self.undistortion_parameters = undistortion_parameters;
    }
}
