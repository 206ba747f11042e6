extern crate nalgebra as na;

use std::ops::{Index, IndexMut};
use na::Matrix3;
use serde::{Serialize, Deserialize};
use crate::Float;
use crate::sensors::camera::radial_distortion::RadialDistortion;
use crate::sensors::camera::projection_matrix::{intrinsics_to_calibration_matrix, calibration_matrix_to_intrinsics};

pub const INTRINSICS_SIZE: usize = 7;

/**
 * Slot of each intrinsic parameter in the flat buffer handed to an optimizer.
 * The order is part of the optimizer interface and must not change.
 */
#[derive(Hash,PartialEq,Eq,Copy,Clone,Debug)]
pub enum IntrinsicsIndex {
    FocalLength = 0,
    AspectRatio = 1,
    Skew = 2,
    PrincipalPointX = 3,
    PrincipalPointY = 4,
    RadialDistortion1 = 5,
    RadialDistortion2 = 6
}

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(transparent)]
pub struct Intrinsics {
    parameters: [Float; INTRINSICS_SIZE]
}

impl Default for Intrinsics {
    fn default() -> Intrinsics {
        Intrinsics::from_parameters([1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }
}

impl Index<IntrinsicsIndex> for Intrinsics {
    type Output = Float;

    fn index(&self, index: IntrinsicsIndex) -> &Float {
        &self.parameters[index as usize]
    }
}

impl IndexMut<IntrinsicsIndex> for Intrinsics {
    fn index_mut(&mut self, index: IntrinsicsIndex) -> &mut Float {
        &mut self.parameters[index as usize]
    }
}

impl Intrinsics {
    pub fn from_parameters(parameters: [Float; INTRINSICS_SIZE]) -> Intrinsics {
        Intrinsics{parameters}
    }

    pub fn parameters(&self) -> &[Float; INTRINSICS_SIZE] {
        &self.parameters
    }

    /**
     * Raw view for an optimizer which treats every slot as an independent variable.
     */
    pub fn parameters_mut(&mut self) -> &mut [Float; INTRINSICS_SIZE] {
        &mut self.parameters
    }

    pub fn focal_length(&self) -> Float { self[IntrinsicsIndex::FocalLength] }
    pub fn aspect_ratio(&self) -> Float { self[IntrinsicsIndex::AspectRatio] }
    pub fn skew(&self) -> Float { self[IntrinsicsIndex::Skew] }
    pub fn principal_point_x(&self) -> Float { self[IntrinsicsIndex::PrincipalPointX] }
    pub fn principal_point_y(&self) -> Float { self[IntrinsicsIndex::PrincipalPointY] }
    pub fn radial_distortion_1(&self) -> Float { self[IntrinsicsIndex::RadialDistortion1] }
    pub fn radial_distortion_2(&self) -> Float { self[IntrinsicsIndex::RadialDistortion2] }

    pub fn focal_length_y(&self) -> Float {
        self.focal_length()*self.aspect_ratio()
    }

    pub fn radial_distortion(&self) -> RadialDistortion {
        RadialDistortion::new(self.radial_distortion_1(), self.radial_distortion_2())
    }

    pub fn set_focal_length(&mut self, focal_length: Float) {
        self[IntrinsicsIndex::FocalLength] = focal_length;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: Float) {
        self[IntrinsicsIndex::AspectRatio] = aspect_ratio;
    }

    pub fn set_skew(&mut self, skew: Float) {
        self[IntrinsicsIndex::Skew] = skew;
    }

    pub fn set_principal_point(&mut self, principal_point_x: Float, principal_point_y: Float) {
        self[IntrinsicsIndex::PrincipalPointX] = principal_point_x;
        self[IntrinsicsIndex::PrincipalPointY] = principal_point_y;
    }

    pub fn set_radial_distortion(&mut self, radial_distortion_1: Float, radial_distortion_2: Float) {
        self[IntrinsicsIndex::RadialDistortion1] = radial_distortion_1;
        self[IntrinsicsIndex::RadialDistortion2] = radial_distortion_2;
    }

    /**
     * K = [[f, s, px], [0, f*a, py], [0, 0, 1]]. Radial distortion is not part of K.
     */
    pub fn calibration_matrix(&self) -> Matrix3<Float> {
        intrinsics_to_calibration_matrix(self.focal_length(), self.skew(), self.aspect_ratio(), self.principal_point_x(), self.principal_point_y())
    }

    /**
     * Overwrites the five linear intrinsics from K, radial distortion is kept.
     */
    pub fn set_from_calibration_matrix(&mut self, calibration_matrix: &Matrix3<Float>) {
        let (focal_length, skew, aspect_ratio, principal_point_x, principal_point_y) = calibration_matrix_to_intrinsics(calibration_matrix);
        self.set_focal_length(focal_length);
        self.set_skew(skew);
        self.set_aspect_ratio(aspect_ratio);
        self.set_principal_point(principal_point_x, principal_point_y);
    }
}
