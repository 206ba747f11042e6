use std::error;
use std::fmt;

use crate::Float;

#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    /// The calibration matrix recovered from a projection matrix has a zero focal term.
    ZeroFocalLength { fx: Float, fy: Float },
    /// Newton iteration on the distorted radius hit its cap or left the finite range.
    UndistortionDidNotConverge { iterations: usize, residual: Float }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CameraError::ZeroFocalLength { fx, fy } =>
                write!(f, "Camera error: cannot set focal lengths to zero (fx: {}, fy: {})", fx, fy),
            CameraError::UndistortionDidNotConverge { iterations, residual } =>
                write!(f, "Camera error: radial undistortion did not converge after {} iterations (residual: {:e})", iterations, residual)
        }
    }
}

impl error::Error for CameraError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}
