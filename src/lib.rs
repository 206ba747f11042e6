extern crate nalgebra as na;
extern crate num_traits;
extern crate simba;

use std::fmt::{Debug, Display};
use simba::scalar::SupersetOf;

pub mod numerics;
pub mod sensors;

macro_rules! define_float {
    ($f:tt) => {
        pub use std::$f as float;
        pub type Float = $f;
    }
}

define_float!(f64);

/**
 * Scalar type accepted by the generic camera kernels.
 * Both halves are needed: nalgebra decompositions want a RealField, the kernels themselves use num_traits::Float.
 * Call ambiguous methods (abs, sqrt, atan2, ..) through num_traits::Float explicitly.
 */
pub trait GenericFloat: na::RealField + num_traits::Float + Copy + Debug + Display {}
impl<F> GenericFloat for F where F: na::RealField + num_traits::Float + Copy + Debug + Display {}

/**
 * Lifts an f64 constant into a generic scalar.
 */
pub fn constant<F: GenericFloat>(value: Float) -> F {
    <F as SupersetOf<Float>>::from_subset(&value)
}
