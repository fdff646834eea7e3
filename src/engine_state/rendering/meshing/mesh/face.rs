use bytemuck::{Pod, Zeroable};
use cgmath::{InnerSpace, Point3, Vector3};

use crate::engine_state::voxels::block::{block_side::BlockSide, BlockTypeSize};

/// A single exposed unit face of a voxel.
///
/// The layout is `#[repr(C)]` and `Pod` so a chunk's quads can be handed to
/// the renderer as raw bytes via `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadFace {
    /// Face centre in chunk-local coordinates.
    pub position: [f32; 3],
    /// Extent along the first in-plane axis.
    pub width: f32,
    /// Extent along the second in-plane axis.
    pub height: f32,
    /// Block id of the voxel the face belongs to.
    pub block_type: BlockTypeSize,
    /// Packed face direction, `BlockSide as u8`.
    pub face_dir: u8,
    _padding: [u8; 2],
}

impl QuadFace {
    /// Creates the unit face on `side` of the voxel at chunk-local `voxel`.
    ///
    /// # Arguments
    /// * `voxel` - Integer position of the voxel inside the chunk
    /// * `side` - Which face of the voxel
    /// * `block_type` - Block id used for texturing
    pub fn new(voxel: Point3<i32>, side: BlockSide, block_type: BlockTypeSize) -> Self {
        let centre = voxel.map(|c| c as f32 + 0.5) + side.normal() * 0.5;
        QuadFace {
            position: centre.into(),
            width: 1.0,
            height: 1.0,
            block_type,
            face_dir: side as u8,
            _padding: [0; 2],
        }
    }

    /// The face direction, decoded.
    pub fn side(&self) -> Option<BlockSide> {
        BlockSide::from_packed(self.face_dir)
    }

    /// Outward normal; zero for a corrupt direction byte.
    pub fn normal(&self) -> Vector3<f32> {
        self.side().map_or(Vector3::new(0.0, 0.0, 0.0), BlockSide::normal)
    }

    /// Face centre as a point.
    pub fn centre(&self) -> Point3<f32> {
        Point3::from(self.position)
    }
}

/// A face of the collision mesh: a bounded plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionFace {
    /// Face centre in chunk-local coordinates.
    pub position: Point3<f32>,
    /// Outward unit normal.
    pub normal: Vector3<f32>,
    /// Extent along the first in-plane axis.
    pub width: f32,
    /// Extent along the second in-plane axis.
    pub height: f32,
}

impl From<&QuadFace> for CollisionFace {
    fn from(quad: &QuadFace) -> Self {
        CollisionFace {
            position: quad.centre(),
            normal: quad.normal(),
            width: quad.width,
            height: quad.height,
        }
    }
}

/// The closest intersection found by a ray test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Intersection point in the space the ray was given in.
    pub point: Point3<f32>,
    /// Normal of the face that was hit.
    pub normal: Vector3<f32>,
    /// Distance along the ray, in units of the direction's length.
    pub distance: f32,
}

impl CollisionFace {
    /// Ray/face intersection.
    ///
    /// # Returns
    /// The ray parameter `t` of the hit, if the ray crosses the face's plane
    /// in `[0, max_t]` inside the face's extents
    pub fn intersect(&self, origin: Point3<f32>, direction: Vector3<f32>, max_t: f32) -> Option<f32> {
        let denom = direction.dot(self.normal);
        if denom.abs() < 1e-6 {
            return None;
        }

        let t = (self.position - origin).dot(self.normal) / denom;
        if t < 0.0 || t > max_t {
            return None;
        }

        let local = origin + direction * t - self.position;
        let (half_w, half_h) = (self.width * 0.5, self.height * 0.5);
        let within = if self.normal.x.abs() > 0.5 {
            local.y.abs() <= half_w && local.z.abs() <= half_h
        } else if self.normal.y.abs() > 0.5 {
            local.x.abs() <= half_w && local.z.abs() <= half_h
        } else {
            local.x.abs() <= half_w && local.y.abs() <= half_h
        };

        within.then_some(t)
    }
}
