extern crate nalgebra as na;

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use na::{Matrix3, Vector3};
use crate::Float;
use crate::numerics::lie::angle_axis_to_rotation_matrix;

pub const EXTRINSICS_SIZE: usize = 6;

/**
 * Offsets into the pose buffer: position at 0..3, world to shared angle-axis (axis * angle) at 3..6.
 */
#[derive(Hash,PartialEq,Eq,Copy,Clone,Debug)]
pub enum ExtrinsicsIndex {
    Position = 0,
    Orientation = 3
}

/**
 * Pose of a physical sensor or rig, referenced by every camera mounted on it.
 * Cloning clones the handle, not the pose: all clones read and write the same buffer and the pose
 * lives as long as its last holder. No synchronization is done here.
 */
#[derive(Debug,Clone)]
pub struct SharedExtrinsics {
    parameters: Rc<RefCell<[Float; EXTRINSICS_SIZE]>>
}

impl Default for SharedExtrinsics {
    fn default() -> SharedExtrinsics {
        SharedExtrinsics::new()
    }
}

impl SharedExtrinsics {
    pub fn new() -> SharedExtrinsics {
        SharedExtrinsics::from_parameters([0.0; EXTRINSICS_SIZE])
    }

    pub fn from_parameters(parameters: [Float; EXTRINSICS_SIZE]) -> SharedExtrinsics {
        SharedExtrinsics{parameters: Rc::new(RefCell::new(parameters))}
    }

    pub fn parameters(&self) -> Ref<'_, [Float; EXTRINSICS_SIZE]> {
        self.parameters.borrow()
    }

    /**
     * Raw view for an optimizer. Writers keep the layout of ExtrinsicsIndex.
     * Panics if another view of the same pose is alive.
     */
    pub fn parameters_mut(&self) -> RefMut<'_, [Float; EXTRINSICS_SIZE]> {
        self.parameters.borrow_mut()
    }

    pub fn to_parameters(&self) -> [Float; EXTRINSICS_SIZE] {
        *self.parameters.borrow()
    }

    pub fn position(&self) -> Vector3<Float> {
        self.block(ExtrinsicsIndex::Position)
    }

    pub fn set_position(&self, position: &Vector3<Float>) {
        self.set_block(ExtrinsicsIndex::Position, position);
    }

    /**
     * World to shared rotation as angle-axis.
     */
    pub fn orientation(&self) -> Vector3<Float> {
        self.block(ExtrinsicsIndex::Orientation)
    }

    pub fn set_orientation(&self, angle_axis: &Vector3<Float>) {
        self.set_block(ExtrinsicsIndex::Orientation, angle_axis);
    }

    pub fn rotation_matrix(&self) -> Matrix3<Float> {
        angle_axis_to_rotation_matrix(&self.orientation())
    }

    pub fn ptr_eq(&self, other: &SharedExtrinsics) -> bool {
        Rc::ptr_eq(&self.parameters, &other.parameters)
    }

    /**
     * Number of live handles, i.e. cameras (and other holders) sharing this pose.
     */
    pub fn reference_count(&self) -> usize {
        Rc::strong_count(&self.parameters)
    }

    fn block(&self, index: ExtrinsicsIndex) -> Vector3<Float> {
        let offset = index as usize;
        let parameters = self.parameters.borrow();
        Vector3::<Float>::new(parameters[offset], parameters[offset+1], parameters[offset+2])
    }

    fn set_block(&self, index: ExtrinsicsIndex, value: &Vector3<Float>) {
        let offset = index as usize;
        let mut parameters = self.parameters.borrow_mut();
        parameters[offset..offset+3].copy_from_slice(value.as_slice());
    }
}
