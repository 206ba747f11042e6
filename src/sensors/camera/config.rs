extern crate nalgebra as na;

use na::{Matrix3, Vector3};
use log::debug;
use serde::{Serialize, Deserialize};
use crate::Float;
use crate::numerics::lie::optimal_correction_of_rotation;
use crate::sensors::camera::Camera;
use crate::sensors::camera::intrinsics::Intrinsics;
use crate::sensors::camera::radial_distortion::UndistortionParameters;
use crate::sensors::camera::shared_extrinsics::SharedExtrinsics;

/**
 * Rotations read from text are rounded. Beyond this Frobenius distance from orthonormality
 * they are projected back onto SO(3).
 */
const ORTHONORMALITY_EPS: Float = 1e-9;

#[derive(Debug,Clone,Copy,PartialEq,Default,Serialize,Deserialize)]
#[serde(default)]
pub struct ExtrinsicsConfig {
    pub position: [Float; 3],
    /// world to shared angle-axis
    pub orientation: [Float; 3]
}

/**
 * Intrinsics are the raw 7 slot buffer, shared_to_camera_rotation is row major.
 */
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub intrinsics: Intrinsics,
    pub shared_to_camera_rotation: [Float; 9],
    pub image_width: usize,
    pub image_height: usize,
    pub undistortion: UndistortionParameters
}

impl Default for CameraConfig {
    fn default() -> CameraConfig {
        CameraConfig {
            intrinsics: Intrinsics::default(),
            shared_to_camera_rotation: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            image_width: 0,
            image_height: 0,
            undistortion: UndistortionParameters::default()
        }
    }
}

/**
 * One pose shared by all listed cameras.
 */
#[derive(Debug,Clone,PartialEq,Default,Serialize,Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub extrinsics: ExtrinsicsConfig,
    pub cameras: Vec<CameraConfig>
}

impl CameraConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<CameraConfig, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn rotation_matrix(&self) -> Matrix3<Float> {
        let rotation = Matrix3::<Float>::from_row_slice(&self.shared_to_camera_rotation);
        match (rotation*rotation.transpose() - Matrix3::<Float>::identity()).norm() {
            deviation if deviation > ORTHONORMALITY_EPS => {
                debug!("shared to camera rotation is off by {:e}, correcting", deviation);
                optimal_correction_of_rotation(&rotation).unwrap_or(rotation)
            },
            _ => rotation
        }
    }
}

impl RigConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<RigConfig, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /**
     * Creates the pose once and hands it to every camera of the rig.
     */
    pub fn build(&self) -> (SharedExtrinsics, Vec<Camera>) {
        let extrinsics = SharedExtrinsics::from_config(&self.extrinsics);
        let cameras = self.cameras.iter().map(|c| Camera::from_config(c, extrinsics.clone())).collect::<Vec<Camera>>();
        (extrinsics, cameras)
    }
}

impl SharedExtrinsics {
    pub fn from_config(config: &ExtrinsicsConfig) -> SharedExtrinsics {
        let extrinsics = SharedExtrinsics::new();
        extrinsics.set_position(&Vector3::from(config.position));
        extrinsics.set_orientation(&Vector3::from(config.orientation));
        extrinsics
    }

    pub fn to_config(&self) -> ExtrinsicsConfig {
        ExtrinsicsConfig {
            position: self.position().into(),
            orientation: self.orientation().into()
        }
    }
}

impl Camera {
    pub fn from_config(config: &CameraConfig, extrinsics: SharedExtrinsics) -> Camera {
        let mut camera = Camera::with_shared_extrinsics(extrinsics);
        *camera.mutable_intrinsics() = *config.intrinsics.parameters();
        camera.set_shared_to_camera_rotation(&config.rotation_matrix());
        camera.set_image_size(config.image_width, config.image_height);
        camera.set_undistortion_parameters(config.undistortion);
        camera
    }

    pub fn to_config(&self) -> CameraConfig {
        let mut shared_to_camera_rotation = [0.0; 9];
        shared_to_camera_rotation.copy_from_slice(self.shared_to_camera_rotation().transpose().as_slice());
        CameraConfig {
            intrinsics: Intrinsics::from_parameters(*self.intrinsics()),
            shared_to_camera_rotation,
            image_width: self.image_width(),
            image_height: self.image_height(),
            undistortion: *self.undistortion_parameters()
        }
    }
}
