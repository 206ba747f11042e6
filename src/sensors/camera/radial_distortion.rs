extern crate nalgebra as na;

use na::Vector2;
use log::debug;
use serde::{Serialize, Deserialize};
use crate::{Float, GenericFloat};
use crate::sensors::camera::error::CameraError;

/**
 * Stopping rule of the Newton iteration used to invert the radial distortion.
 * The iteration stops once a step is smaller than tolerance*max(r,1).
 */
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct UndistortionParameters {
    pub tolerance: Float,
    pub max_iterations: usize
}

impl Default for UndistortionParameters {
    fn default() -> UndistortionParameters {
        UndistortionParameters{tolerance: 1e-12, max_iterations: 100}
    }
}

/**
 * Two coefficient radial model d(r) = 1 + k1*r^2 + k2*r^4 acting on normalized image coordinates.
 */
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct RadialDistortion {
    pub k1: Float,
    pub k2: Float
}

impl RadialDistortion {
    pub fn new(k1: Float, k2: Float) -> RadialDistortion {
        RadialDistortion{k1,k2}
    }

    pub fn distort(&self, point: &Vector2<Float>) -> Vector2<Float> {
        radial_distort_point(point, self.k1, self.k2)
    }

    pub fn undistort(&self, distorted_point: &Vector2<Float>, parameters: &UndistortionParameters) -> Result<Vector2<Float>, CameraError> {
        radial_undistort_point(distorted_point, self.k1, self.k2, parameters)
    }
}

/**
 * p' = p*(1 + k1*r^2 + k2*r^4). Not clamped, large radii produce large values.
 */
pub fn radial_distort_point<F: GenericFloat>(point: &Vector2<F>, k1: F, k2: F) -> Vector2<F> {
    let r_sqr = point[0]*point[0] + point[1]*point[1];
    let distortion = F::one() + k1*r_sqr + k2*r_sqr*r_sqr;
    Vector2::<F>::new(point[0]*distortion, point[1]*distortion)
}

/**
 * Inverts radial_distort_point by solving r*(1 + k1*r^2 + k2*r^4) = |p'| for the undistorted radius r
 * with Newton's method, starting at r = |p'|. The direction of the point is unchanged by the model.
 *
 * Zero coefficients return the input as is. A hit iteration cap, a vanishing derivative or a root at
 * non-positive radius are reported as UndistortionDidNotConverge.
 */
pub fn radial_undistort_point(distorted_point: &Vector2<Float>, k1: Float, k2: Float, parameters: &UndistortionParameters) -> Result<Vector2<Float>, CameraError> {
    if k1 == 0.0 && k2 == 0.0 {
        return Ok(*distorted_point);
    }

    let r_distorted = distorted_point.norm();
    if r_distorted == 0.0 {
        return Ok(*distorted_point);
    }

    let mut r = r_distorted;
    let mut residual = Float::INFINITY;
    for iteration in 0..parameters.max_iterations {
        let r_sqr = r*r;
        let f = r*(1.0 + k1*r_sqr + k2*r_sqr*r_sqr) - r_distorted;
        let df = 1.0 + 3.0*k1*r_sqr + 5.0*k2*r_sqr*r_sqr;
        residual = f.abs();

        if !f.is_finite() || !df.is_finite() || df == 0.0 {
            return Err(CameraError::UndistortionDidNotConverge{iterations: iteration, residual});
        }

        let delta = f/df;
        r -= delta;

        if delta.abs() <= parameters.tolerance*r.abs().max(1.0) {
            if r <= 0.0 {
                return Err(CameraError::UndistortionDidNotConverge{iterations: iteration+1, residual});
            }
            debug!("radial undistortion converged after {} iterations", iteration+1);
            return Ok(distorted_point*(r/r_distorted));
        }
    }

    Err(CameraError::UndistortionDidNotConverge{iterations: parameters.max_iterations, residual})
}
