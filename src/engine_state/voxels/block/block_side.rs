//! # Block Side Module
//!
//! The six faces of a voxel, in the order the mesher emits them and the
//! renderer expects them: bottom, top, back, front, left, right.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminant is the packed face direction stored in each mesh quad.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
#[repr(u8)]
pub enum BlockSide {
    /// The bottom face (facing negative Y)
    BOTTOM = 0,

    /// The top face (facing positive Y)
    TOP = 1,

    /// The back face (facing negative Z)
    BACK = 2,

    /// The front face (facing positive Z)
    FRONT = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns all six block faces in packed-direction order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::BACK,
            BlockSide::FRONT,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Decodes a packed face direction.
    ///
    /// # Arguments
    /// * `packed` - A value previously produced by `side as u8`
    ///
    /// # Returns
    /// The matching side, or `None` if `packed` is not in `0..6`
    pub fn from_packed(packed: u8) -> Option<BlockSide> {
        Self::all().get(packed as usize).copied()
    }

    /// Integer step from a voxel to the neighbour across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Outward unit normal of this face.
    pub fn normal(self) -> Vector3<f32> {
        self.offset().map(|c| c as f32)
    }
}
