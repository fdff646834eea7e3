//! # Island Module
//!
//! An island is a rigid body made of chunks. Its voxels live in island-local
//! space, which is mapped into the world by the island's position and Euler
//! rotation:
//!
//! ```text
//! M = Translate(position) · RotateY(yaw) · RotateX(pitch) · RotateZ(roll)
//! ```
//!
//! Island-local positions are continuous. The voxel containing a position is
//! found by flooring each axis; from there the chunk coordinate is the floor
//! division by `CHUNK_DIMENSION` and the local coordinate is the positive
//! remainder. Both are correct for negative positions, which every generated
//! island has.
//!
//! ## Thread Safety
//!
//! Chunks are held as `MtResource<Chunk>`. A caller may clone a chunk handle,
//! release the island, and keep working with the chunk; destroying the island
//! only drops the island's own handles.

use std::collections::HashMap;

use cgmath::{
    EuclideanSpace, InnerSpace, Matrix, Matrix3, Matrix4, Point3, Rad, Vector3, Vector4,
};

use super::block::{is_structural, BlockTypeSize, AIR};
use super::chunk::{Chunk, CHUNK_DIMENSION};
use crate::core::MtResource;

/// Identifier of an island. `0` is never assigned.
pub type IslandId = u32;

/// Anything that names a single voxel cell in island-local space.
pub trait VoxelCoord: Copy {
    /// The integer cell containing this position.
    fn voxel(self) -> Point3<i32>;
}

impl VoxelCoord for Point3<i32> {
    #[inline]
    fn voxel(self) -> Point3<i32> {
        self
    }
}

impl VoxelCoord for Point3<f32> {
    #[inline]
    fn voxel(self) -> Point3<i32> {
        self.map(|c| c.floor() as i32)
    }
}

/// Chunk coordinate containing an island-relative position.
#[inline]
pub fn chunk_coord(pos: impl VoxelCoord) -> Point3<i32> {
    pos.voxel().map(|c| c.div_euclid(CHUNK_DIMENSION))
}

/// Position within its chunk, each axis in `[0, CHUNK_DIMENSION)`.
#[inline]
pub fn local_coord(pos: impl VoxelCoord) -> Point3<i32> {
    pos.voxel().map(|c| c.rem_euclid(CHUNK_DIMENSION))
}

/// Island-space position of a chunk's `(0, 0, 0)` corner.
#[inline]
pub fn chunk_origin(chunk: Point3<i32>) -> Point3<f32> {
    chunk.map(|c| (c * CHUNK_DIMENSION) as f32)
}

/// Island-space voxel from a chunk coordinate and a local coordinate.
#[inline]
pub fn island_voxel(chunk: Point3<i32>, local: Point3<i32>) -> Point3<i32> {
    Point3::new(
        chunk.x * CHUNK_DIMENSION + local.x,
        chunk.y * CHUNK_DIMENSION + local.y,
        chunk.z * CHUNK_DIMENSION + local.z,
    )
}

/// The six face-neighbour offsets in search order: +X, -X, +Y, -Y, +Z, -Z.
pub const FACE_OFFSETS: [Vector3<i32>; 6] = [
    Vector3 { x: 1, y: 0, z: 0 },
    Vector3 { x: -1, y: 0, z: 0 },
    Vector3 { x: 0, y: 1, z: 0 },
    Vector3 { x: 0, y: -1, z: 0 },
    Vector3 { x: 0, y: 0, z: 1 },
    Vector3 { x: 0, y: 0, z: -1 },
];

/// Outcome of a single voxel write on an island.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelWrite {
    /// Chunk the voxel falls in.
    pub chunk: Point3<i32>,
    /// Whether the stored value changed.
    pub changed: bool,
    /// Whether the chunk had to be created for this write.
    pub created_chunk: bool,
}

/// A floating island: chunks plus rigid-body state.
pub struct Island {
    /// Registry-assigned identifier.
    pub id: IslandId,
    /// World-space position of the island origin.
    pub physics_center: Point3<f32>,
    /// Linear velocity, world units per second.
    pub velocity: Vector3<f32>,
    /// External acceleration, applied by gameplay systems rather than by
    /// `integrate`.
    pub acceleration: Vector3<f32>,
    /// Euler angles in radians: x = pitch, y = yaw, z = roll.
    pub rotation: Vector3<f32>,
    /// Angular velocity, radians per second per axis.
    pub angular_velocity: Vector3<f32>,
    /// Set when the transform changed; cleared by whoever consumes it.
    pub needs_physics_update: bool,
    /// Chunks keyed by chunk coordinate.
    pub chunks: HashMap<Point3<i32>, MtResource<Chunk>>,
}

impl Island {
    /// Creates an empty, stationary island at `center`.
    pub fn new(id: IslandId, center: Point3<f32>) -> Self {
        Island {
            id,
            physics_center: center,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            acceleration: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            angular_velocity: Vector3::new(0.0, 0.0, 0.0),
            needs_physics_update: true,
            chunks: HashMap::new(),
        }
    }

    /// `RotY(yaw) · RotX(pitch) · RotZ(roll)`.
    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        Matrix3::from_angle_y(Rad(self.rotation.y))
            * Matrix3::from_angle_x(Rad(self.rotation.x))
            * Matrix3::from_angle_z(Rad(self.rotation.z))
    }

    /// Island-local to world transform.
    pub fn transform_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.physics_center.to_vec()) * Matrix4::from(self.rotation_matrix())
    }

    /// World to island-local transform.
    ///
    /// The rotation part is orthonormal, so the inverse is its transpose
    /// followed by the negated translation; no general inversion is needed.
    pub fn inverse_transform_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.rotation_matrix().transpose())
            * Matrix4::from_translation(-self.physics_center.to_vec())
    }

    /// Transform of a chunk's local space into the world, for rendering.
    pub fn chunk_transform(&self, chunk: Point3<i32>) -> Matrix4<f32> {
        self.transform_matrix() * Matrix4::from_translation(chunk_origin(chunk).to_vec())
    }

    /// Maps an island-local point into world space.
    pub fn local_to_world(&self, local: Point3<f32>) -> Point3<f32> {
        Point3::from_homogeneous(self.transform_matrix() * local.to_homogeneous())
    }

    /// Maps a world point into island-local space.
    pub fn world_to_local(&self, world: Point3<f32>) -> Point3<f32> {
        Point3::from_homogeneous(self.inverse_transform_matrix() * world.to_homogeneous())
    }

    /// Rotates an island-local direction into world space (w = 0).
    pub fn local_dir_to_world(&self, local: Vector3<f32>) -> Vector3<f32> {
        (self.transform_matrix() * local.extend(0.0)).truncate()
    }

    /// Rotates a world direction into island-local space (w = 0).
    pub fn world_dir_to_local(&self, world: Vector3<f32>) -> Vector3<f32> {
        let v: Vector4<f32> = self.inverse_transform_matrix() * world.extend(0.0);
        v.truncate()
    }

    /// Advances position and rotation by `dt` seconds.
    ///
    /// Axes whose squared speed is at or below `epsilon` are left alone.
    ///
    /// # Returns
    /// `true` if anything moved; `needs_physics_update` is raised in that case
    pub fn integrate(&mut self, dt: f32, epsilon: f32) -> bool {
        let mut moved = false;

        if self.velocity.magnitude2() > epsilon {
            self.physics_center += self.velocity * dt;
            moved = true;
        }

        if self.angular_velocity.magnitude2() > epsilon {
            self.rotation += self.angular_velocity * dt;
            moved = true;
        }

        if moved {
            self.needs_physics_update = true;
        }
        moved
    }

    /// Reads and clears `needs_physics_update`.
    pub fn take_physics_update(&mut self) -> bool {
        std::mem::replace(&mut self.needs_physics_update, false)
    }

    /// Handle to the chunk at a chunk coordinate.
    pub fn get_chunk(&self, coord: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get(&coord).cloned()
    }

    /// Returns the chunk at `coord`, creating an empty one if needed.
    ///
    /// # Returns
    /// The chunk handle and whether it was just created
    pub fn ensure_chunk(&mut self, coord: Point3<i32>) -> (MtResource<Chunk>, bool) {
        if let Some(chunk) = self.chunks.get(&coord) {
            return (chunk.clone(), false);
        }
        let chunk = MtResource::new(Chunk::new(coord));
        self.chunks.insert(coord, chunk.clone());
        (chunk, true)
    }

    /// The face neighbours of a chunk, indexed by `BlockSide as usize`.
    pub fn neighbour_chunks(&self, coord: Point3<i32>) -> [Option<MtResource<Chunk>>; 6] {
        use super::block::block_side::BlockSide;
        BlockSide::all().map(|side| self.get_chunk(coord + side.offset()))
    }

    /// Voxel at an island-relative position; air where no chunk exists.
    pub fn get_voxel(&self, pos: impl VoxelCoord) -> BlockTypeSize {
        match self.chunks.get(&chunk_coord(pos)) {
            Some(chunk) => chunk.get().get_local(local_coord(pos)),
            None => AIR,
        }
    }

    /// Whether the voxel at a position counts for connectivity.
    pub fn is_structural(&self, pos: impl VoxelCoord) -> bool {
        let local = local_coord(pos);
        self.chunks
            .get(&chunk_coord(pos))
            .is_some_and(|chunk| chunk.get().is_structural_at(local.x, local.y, local.z))
    }

    /// Client-side write; marks the chunk dirty.
    pub fn set_voxel(&mut self, pos: impl VoxelCoord, block_type: BlockTypeSize) -> VoxelWrite {
        self.write_voxel(pos, block_type, true)
    }

    /// Server-side write; leaves mesh state alone.
    pub fn set_voxel_data_only(
        &mut self,
        pos: impl VoxelCoord,
        block_type: BlockTypeSize,
    ) -> VoxelWrite {
        self.write_voxel(pos, block_type, false)
    }

    fn write_voxel(
        &mut self,
        pos: impl VoxelCoord,
        block_type: BlockTypeSize,
        invalidate_mesh: bool,
    ) -> VoxelWrite {
        let coord = chunk_coord(pos);
        let local = local_coord(pos);

        // clearing a voxel never allocates a chunk
        let (chunk, created_chunk) = if block_type == AIR {
            match self.get_chunk(coord) {
                Some(chunk) => (chunk, false),
                None => {
                    return VoxelWrite {
                        chunk: coord,
                        changed: false,
                        created_chunk: false,
                    }
                }
            }
        } else {
            self.ensure_chunk(coord)
        };

        let mut chunk = chunk.get_mut();
        let changed = if invalidate_mesh {
            chunk.set(local.x, local.y, local.z, block_type)
        } else {
            chunk.set_data_only(local.x, local.y, local.z, block_type)
        };

        VoxelWrite {
            chunk: coord,
            changed,
            created_chunk,
        }
    }

    /// Total number of non-air voxels.
    pub fn voxel_count(&self) -> usize {
        self.chunks.values().map(|c| c.get().voxel_count()).sum()
    }

    /// Every non-air voxel as `(island position, block id)`, in a stable
    /// order (chunks by coordinate, then wire order).
    pub fn voxels(&self) -> Vec<(Point3<i32>, BlockTypeSize)> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort_by_key(|c| (c.x, c.y, c.z));

        let mut out = Vec::new();
        for coord in coords {
            let chunk = self.chunks[&coord].get();
            out.extend(
                chunk
                    .iter_voxels()
                    .map(|(local, voxel)| (island_voxel(coord, local), voxel)),
            );
        }
        out
    }

    /// Positions of every structural voxel, in the same order as [`Island::voxels`].
    pub fn solid_positions(&self) -> Vec<Point3<i32>> {
        self.voxels()
            .into_iter()
            .filter(|&(_, voxel)| is_structural(voxel))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Approximate memory held by this island's chunks.
    pub fn memory_usage(&self) -> usize {
        self.chunks.values().map(|c| c.get().memory_usage()).sum()
    }
}
