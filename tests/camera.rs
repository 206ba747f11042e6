extern crate nalgebra as na;

use approx::assert_relative_eq;
use na::{Matrix3, Rotation3, Vector2, Vector3, Vector4};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};
use sfm_camera::Float;
use sfm_camera::numerics::lie::{angle_axis_to_rotation_matrix, rotation_matrix_to_angle_axis};
use sfm_camera::sensors::camera::{Camera, compose_rotation};
use sfm_camera::sensors::camera::error::CameraError;
use sfm_camera::sensors::camera::intrinsics::IntrinsicsIndex;
use sfm_camera::sensors::camera::project::project_point_to_image;
use sfm_camera::sensors::camera::shared_extrinsics::{ExtrinsicsIndex, SharedExtrinsics};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn distorted_camera() -> Camera {
    let mut camera = Camera::new();
    camera.set_focal_length(1200.0);
    camera.set_aspect_ratio(1.05);
    camera.set_skew(0.4);
    camera.set_principal_point(640.0, 360.0);
    camera.set_radial_distortion(-0.08, 0.006);
    camera.set_image_size(1280, 720);
    camera.set_orientation_from_angle_axis(&Vector3::new(0.1, -0.3, 0.2));
    camera.set_position(&Vector3::new(1.0, -2.0, 0.5));
    camera
}

#[test]
fn default_camera() {
    let camera = Camera::new();
    assert_eq!(camera.focal_length(), 1.0);
    assert_eq!(camera.aspect_ratio(), 1.0);
    assert_eq!(camera.skew(), 0.0);
    assert_eq!(camera.principal_point_x(), 0.0);
    assert_eq!(camera.principal_point_y(), 0.0);
    assert_eq!(camera.radial_distortion_1(), 0.0);
    assert_eq!(camera.radial_distortion_2(), 0.0);
    assert_eq!(camera.image_width(), 0);
    assert_eq!(camera.image_height(), 0);
    assert_eq!(camera.orientation_as_rotation_matrix(), Matrix3::<Float>::identity());
    assert_eq!(camera.orientation_as_angle_axis(), Vector3::<Float>::zeros());
    assert_eq!(camera.position(), Vector3::<Float>::zeros());
    assert_eq!(camera.shared_to_camera_rotation(), &Matrix3::<Float>::identity());
    assert_eq!(camera.extrinsics().reference_count(), 1);
}

#[test]
fn intrinsics_setters_and_getters() {
    let mut camera = Camera::new();
    camera.set_focal_length(812.5);
    camera.set_aspect_ratio(0.75);
    camera.set_skew(-1.5);
    camera.set_principal_point(311.0, 247.5);
    camera.set_radial_distortion(0.125, -0.0625);

    assert_eq!(camera.focal_length(), 812.5);
    assert_eq!(camera.aspect_ratio(), 0.75);
    assert_eq!(camera.focal_length_y(), 812.5*0.75);
    assert_eq!(camera.skew(), -1.5);
    assert_eq!(camera.principal_point_x(), 311.0);
    assert_eq!(camera.principal_point_y(), 247.5);
    assert_eq!(camera.radial_distortion_1(), 0.125);
    assert_eq!(camera.radial_distortion_2(), -0.0625);
    assert_eq!(camera.intrinsics(), &[812.5, 0.75, -1.5, 311.0, 247.5, 0.125, -0.0625]);

    camera.set_image_size(1920, 1080);
    assert_eq!(camera.image_width(), 1920);
    assert_eq!(camera.image_height(), 1080);
}

#[test]
fn setters_do_not_validate() {
    let mut camera = Camera::new();
    camera.set_focal_length(0.0);
    assert_eq!(camera.focal_length(), 0.0);

    let ray = camera.pixel_to_unit_depth_ray(&Vector2::new(10.0, 10.0)).unwrap();
    assert!(!ray.iter().all(|v| v.is_finite()));
}

#[test]
fn raw_parameter_writes_are_visible() {
    let mut camera = Camera::new();
    camera.mutable_intrinsics()[IntrinsicsIndex::FocalLength as usize] = 2.0;
    camera.mutable_intrinsics()[IntrinsicsIndex::RadialDistortion2 as usize] = 0.5;
    camera.extrinsics().parameters_mut()[ExtrinsicsIndex::Position as usize] = 3.0;
    camera.extrinsics().parameters_mut()[ExtrinsicsIndex::Orientation as usize + 2] = 0.25;

    assert_eq!(camera.focal_length(), 2.0);
    assert_eq!(camera.radial_distortion_2(), 0.5);
    assert_eq!(camera.position(), Vector3::new(3.0, 0.0, 0.0));
    assert_relative_eq!(camera.orientation_as_angle_axis(), Vector3::new(0.0, 0.0, 0.25), epsilon = 1e-15);
}

#[test]
fn shared_pose_is_visible_from_every_camera() {
    let pose = SharedExtrinsics::new();
    let mut left = Camera::with_shared_extrinsics(pose.clone());
    let right = Camera::with_shared_extrinsics(pose.clone());
    assert_eq!(pose.reference_count(), 3);

    left.set_position(&Vector3::new(0.5, -1.5, 2.0));
    assert_eq!(right.position(), Vector3::new(0.5, -1.5, 2.0));

    left.set_orientation_from_angle_axis(&Vector3::new(0.0, 0.2, 0.0));
    assert_relative_eq!(right.orientation_as_rotation_matrix(), left.orientation_as_rotation_matrix());

    left.set_shared_extrinsics(SharedExtrinsics::new());
    assert_eq!(pose.reference_count(), 2);
    assert_eq!(left.position(), Vector3::zeros());
    assert_eq!(right.position(), Vector3::new(0.5, -1.5, 2.0));
}

#[test]
fn rig_cameras_keep_their_relative_rotation() {
    let pose = SharedExtrinsics::new();
    let offset_left = Rotation3::<Float>::new(Vector3::new(0.0, 0.1, 0.0)).into_inner();
    let offset_right = Rotation3::<Float>::new(Vector3::new(0.0, -0.1, 0.05)).into_inner();

    let mut left = Camera::with_shared_extrinsics(pose.clone());
    left.set_shared_to_camera_rotation(&offset_left);
    let mut right = Camera::with_shared_extrinsics(pose.clone());
    right.set_shared_to_camera_rotation(&offset_right);

    let relative = offset_right*offset_left.transpose();
    for angle_axis in &[Vector3::new(0.3, 0.0, 0.0), Vector3::new(-0.2, 1.1, 0.4), Vector3::new(0.0, 0.0, 3.0)] {
        pose.set_orientation(angle_axis);
        let r_left = left.orientation_as_rotation_matrix();
        let r_right = right.orientation_as_rotation_matrix();
        assert_relative_eq!(r_right*r_left.transpose(), relative, epsilon = 1e-12);
        assert_relative_eq!(r_left, compose_rotation(&offset_left, &angle_axis_to_rotation_matrix(angle_axis)), epsilon = 1e-15);
    }
}

#[test]
fn orientation_setters_remove_the_local_rotation() {
    let mut camera = Camera::new();
    let offset = Rotation3::<Float>::new(Vector3::new(0.05, 0.1, -0.2)).into_inner();
    camera.set_shared_to_camera_rotation(&offset);

    let world_to_camera = Vector3::new(0.4, -0.2, 0.9);
    camera.set_orientation_from_angle_axis(&world_to_camera);
    assert_relative_eq!(camera.orientation_as_angle_axis(), world_to_camera, epsilon = 1e-12);

    let world_to_shared = rotation_matrix_to_angle_axis(&(offset.transpose()*angle_axis_to_rotation_matrix(&world_to_camera)));
    assert_relative_eq!(camera.extrinsics().orientation(), world_to_shared, epsilon = 1e-12);

    let rotation = Rotation3::<Float>::new(Vector3::new(-1.0, 0.5, 0.25)).into_inner();
    camera.set_orientation_from_rotation_matrix(&rotation);
    assert_relative_eq!(camera.orientation_as_rotation_matrix(), rotation, epsilon = 1e-12);
}

#[test]
fn project_point_applies_calibration() {
    let mut camera = Camera::new();
    camera.set_focal_length(1000.0);
    camera.set_aspect_ratio(2.0);
    camera.set_skew(10.0);
    camera.set_principal_point(320.0, 240.0);
    camera.set_position(&Vector3::new(0.0, 0.0, -2.0));

    let (pixel, depth) = camera.project_point(&Vector4::new(0.4, 0.2, 2.0, 1.0));
    assert_relative_eq!(depth, 4.0);
    assert_relative_eq!(pixel, Vector2::new(1000.0*0.1 + 10.0*0.05 + 320.0, 2000.0*0.05 + 240.0), epsilon = 1e-12);
}

#[test]
fn negative_depth_is_reported_not_rejected() {
    let camera = distorted_camera();
    let behind = camera.position() - camera.orientation_as_rotation_matrix().transpose()*Vector3::new(0.1, 0.1, 3.0);
    let (pixel, depth) = camera.project_point(&behind.push(1.0));
    assert_relative_eq!(depth, -3.0, epsilon = 1e-12);
    assert!(pixel.iter().all(|v| v.is_finite()));
}

#[test]
fn point_at_infinity_carries_direction_only() {
    let mut camera = Camera::new();
    camera.set_focal_length(1000.0);
    camera.set_principal_point(320.0, 240.0);
    camera.set_position(&Vector3::new(5.0, 5.0, 5.0));

    let (pixel, depth) = camera.project_point(&Vector4::new(0.1, 0.2, 1.0, 0.0));
    assert_eq!(depth, Float::INFINITY);
    assert_relative_eq!(pixel, Vector2::new(420.0, 440.0), epsilon = 1e-12);

    camera.set_position(&Vector3::new(-50.0, 10.0, 0.0));
    let (pixel_moved, _) = camera.project_point(&Vector4::new(0.1, 0.2, 1.0, 0.0));
    assert_eq!(pixel, pixel_moved);
}

#[test]
fn back_projection_inverts_projection() {
    init_logging();
    let camera = distorted_camera();
    let rotation = camera.orientation_as_rotation_matrix();
    let position = camera.position();

    let mut rng = SmallRng::seed_from_u64(42);
    let depth_distribution = Uniform::new(1.0, 20.0);
    let normalized_distribution = Uniform::new(-0.5, 0.5);

    for _ in 0..200 {
        let z: Float = depth_distribution.sample(&mut rng);
        let point_camera = Vector3::new(normalized_distribution.sample(&mut rng)*z, normalized_distribution.sample(&mut rng)*z, z);
        let point_world = rotation.transpose()*point_camera + position;
        let w: Float = rng.gen_range(0.5..2.0);

        let (pixel, depth) = camera.project_point(&(point_world.push(1.0)*w));
        assert_relative_eq!(depth, z, epsilon = 1e-9);

        let ray = camera.pixel_to_unit_depth_ray(&pixel).unwrap();
        assert_relative_eq!(position + ray*depth, point_world, epsilon = 1e-8);
    }
}

#[test]
fn undistortion_failure_is_propagated() {
    let mut camera = Camera::new();
    camera.set_radial_distortion(-1.0, 0.0);
    match camera.pixel_to_unit_depth_ray(&Vector2::new(1.0, 0.0)) {
        Err(CameraError::UndistortionDidNotConverge{..}) => (),
        other => panic!("expected undistortion failure, got {:?}", other)
    }
}

#[test]
fn cloned_camera_keeps_the_pose() {
    let camera = distorted_camera();
    let mut copy = camera.clone();
    copy.set_focal_length(10.0);
    copy.set_position(&Vector3::new(7.0, 7.0, 7.0));

    assert_eq!(camera.focal_length(), 1200.0);
    assert_eq!(camera.position(), Vector3::new(7.0, 7.0, 7.0));
}

#[test]
fn copied_buffers_project_on_worker_threads() {
    let camera = distorted_camera();
    let extrinsics = camera.extrinsics().to_parameters();
    let intrinsics = *camera.intrinsics();
    let shared_to_camera_rotation = *camera.shared_to_camera_rotation();
    let points = (0..4).map(|i| Vector4::<Float>::new(i as Float, 1.0, 10.0, 1.0)).collect::<Vec<Vector4<Float>>>();

    let handles = points.iter().map(|&point| std::thread::spawn(move || {
        project_point_to_image(&extrinsics, &intrinsics, &point, &shared_to_camera_rotation)
    })).collect::<Vec<_>>();

    for (handle, point) in handles.into_iter().zip(points.iter()) {
        let (pixel, depth) = handle.join().unwrap();
        let (expected_pixel, expected_depth) = camera.project_point(point);
        assert_eq!(pixel, expected_pixel);
        assert_eq!(depth, expected_depth);
    }
}
