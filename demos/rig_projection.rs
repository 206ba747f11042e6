extern crate nalgebra as na;
extern crate color_eyre;

use color_eyre::eyre::Result;
use log::info;
use na::Vector4;
use sfm_camera::sensors::camera::config::RigConfig;

const STEREO_RIG: &str = "
extrinsics:
  position: [0.0, 0.0, -1.0]
  orientation: [0.0, 0.05, 0.0]
cameras:
  - intrinsics: [718.856, 1.0, 0.0, 607.19, 185.21, -0.05, 0.002]
    image_width: 1241
    image_height: 376
  - intrinsics: [718.856, 1.0, 0.0, 607.19, 185.21, -0.05, 0.002]
    shared_to_camera_rotation: [0.9998, 0.0, 0.02, 0.0, 1.0, 0.0, -0.02, 0.0, 0.9998]
    image_width: 1241
    image_height: 376
";

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let rig_config = match std::env::args().nth(1) {
        Some(path) => RigConfig::from_yaml_str(&std::fs::read_to_string(path)?)?,
        None => RigConfig::from_yaml_str(STEREO_RIG)?
    };
    let (extrinsics, cameras) = rig_config.build();
    info!("rig with {} cameras, pose shared by {} holders", cameras.len(), extrinsics.reference_count());

    let point = Vector4::new(0.8, -0.3, 12.0, 1.0);
    for (i, camera) in cameras.iter().enumerate() {
        let (pixel, depth) = camera.project_point(&point);
        let ray = camera.pixel_to_unit_depth_ray(&pixel)?;
        let reconstructed = camera.position() + ray*depth;
        println!("camera {}: pixel ({:.3}, {:.3}) depth {:.3} -> point ({:.6}, {:.6}, {:.6})", i, pixel.x, pixel.y, depth, reconstructed.x, reconstructed.y, reconstructed.z);
    }

    Ok(())
}
