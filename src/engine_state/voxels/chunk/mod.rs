//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed 16x16x16 grid of voxel ids
//! owned by an island, together with the mesh most recently built from it.
//!
//! ## Storage
//!
//! Voxels are stored densely, one byte per cell, at
//! `index = x + y * CHUNK_DIMENSION + z * CHUNK_PLANE_SIZE`. This is also the
//! exact wire layout returned by [`Chunk::raw_bytes`], so a chunk can be sent
//! to a peer and restored with [`Chunk::load_raw_bytes`] without re-encoding.
//!
//! Alongside the bytes, `solid_array` keeps one bit per cell recording whether
//! the voxel is structural (not air, not water). Flood fills only ever ask
//! that question, so they never need to interpret block ids.
//!
//! ## Mesh Ownership
//!
//! The live mesh is an `Arc<ChunkMesh>`. Mesh builds run on worker threads
//! against a snapshot and hand back a fresh `Arc`; installing it is a single
//! pointer swap, and readers that cloned the old `Arc` keep a consistent mesh
//! for as long as they hold it.
//!
//! ### Performance Characteristics
//! - **Voxel Lookup**: O(1)
//! - **Solidity Check**: O(1), one bit
//! - **Memory Usage**: 4096 bytes + 512 bytes of bitmask per chunk, plus the mesh

use std::sync::Arc;

use bitvec::prelude::{bitvec, BitVec};
use cgmath::{Point3, Vector3};

use super::block::{is_structural, BlockTypeSize, AIR};
use crate::engine_state::rendering::meshing::mesh::{face::RayHit, mesh::ChunkMesh};
use crate::error::EngineError;

pub mod chunk_iteration;
pub mod chunk_snapshot;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;
/// The dimension of a chunk including an extra layer of blocks on each side for neighbor lookups.
pub const CHUNK_DIMENSION_WRAPPED: usize = (CHUNK_DIMENSION + 2) as usize;
/// The number of blocks in a wrapped 2D chunk plane.
pub const CHUNK_PLANE_SIZE_WRAPPED: usize = CHUNK_DIMENSION_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// The total number of blocks in a wrapped chunk.
pub const CHUNK_SIZE_WRAPPED: usize = CHUNK_PLANE_SIZE_WRAPPED * CHUNK_DIMENSION_WRAPPED;

/// A 16x16x16 block of voxels belonging to one island.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates),
    /// relative to the owning island's origin.
    pub position: Point3<i32>,

    /// One byte per cell, in wire order.
    voxels: Vec<BlockTypeSize>,

    /// One bit per cell: set when the voxel is structural.
    solid_array: BitVec,

    /// Set by client-side edits; cleared once a mesh built from the current
    /// revision is installed.
    dirty: bool,

    /// Incremented on every voxel change, regardless of write path.
    revision: u64,

    /// The mesh currently handed to readers.
    mesh: Arc<ChunkMesh>,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    pub fn new(position: Point3<i32>) -> Self {
        Chunk {
            position,
            voxels: vec![AIR; CHUNK_SIZE as usize],
            solid_array: bitvec![0; CHUNK_SIZE as usize],
            dirty: false,
            revision: 0,
            mesh: Arc::new(ChunkMesh::default()),
        }
    }

    /// Maps local coordinates to a flat index, or `None` if outside `[0, 16)`.
    #[inline]
    pub fn index_of(x: i32, y: i32, z: i32) -> Option<usize> {
        let range = 0..CHUNK_DIMENSION;
        if range.contains(&x) && range.contains(&y) && range.contains(&z) {
            Some((x + y * CHUNK_DIMENSION + z * CHUNK_PLANE_SIZE) as usize)
        } else {
            None
        }
    }

    /// Returns the voxel at local coordinates; air outside the chunk bounds.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        Self::index_of(x, y, z).map_or(AIR, |i| self.voxels[i])
    }

    /// Same as [`Chunk::get`], taking a point.
    #[inline]
    pub fn get_local(&self, local: Point3<i32>) -> BlockTypeSize {
        self.get(local.x, local.y, local.z)
    }

    /// Whether the voxel at local coordinates is structural; `false` outside bounds.
    #[inline]
    pub fn is_structural_at(&self, x: i32, y: i32, z: i32) -> bool {
        Self::index_of(x, y, z).is_some_and(|i| self.solid_array[i])
    }

    /// Client-side write: stores the voxel and marks the chunk dirty.
    ///
    /// Out-of-range coordinates are ignored.
    ///
    /// # Returns
    /// `true` if the stored value changed
    pub fn set(&mut self, x: i32, y: i32, z: i32, block_type: BlockTypeSize) -> bool {
        let changed = self.write(x, y, z, block_type);
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Server-side write: stores the voxel without touching mesh state.
    ///
    /// # Returns
    /// `true` if the stored value changed
    pub fn set_data_only(&mut self, x: i32, y: i32, z: i32, block_type: BlockTypeSize) -> bool {
        self.write(x, y, z, block_type)
    }

    fn write(&mut self, x: i32, y: i32, z: i32, block_type: BlockTypeSize) -> bool {
        let Some(i) = Self::index_of(x, y, z) else {
            return false;
        };
        if self.voxels[i] == block_type {
            return false;
        }
        self.voxels[i] = block_type;
        self.solid_array.set(i, is_structural(block_type));
        self.revision += 1;
        true
    }

    /// The voxel array in wire order, exactly `CHUNK_SIZE` bytes.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.voxels
    }

    /// Replaces the whole voxel array from a wire payload.
    ///
    /// The chunk is marked dirty so the new contents get meshed.
    ///
    /// # Errors
    /// `EngineError::InvalidChunkPayload` if `bytes` is not exactly
    /// `CHUNK_SIZE` long; the chunk is left untouched in that case.
    pub fn load_raw_bytes(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        if bytes.len() != self.voxels.len() {
            return Err(EngineError::InvalidChunkPayload {
                expected: self.voxels.len(),
                actual: bytes.len(),
            });
        }
        self.voxels.copy_from_slice(bytes);
        for (i, &voxel) in bytes.iter().enumerate() {
            self.solid_array.set(i, is_structural(voxel));
        }
        self.revision += 1;
        self.dirty = true;
        Ok(())
    }

    /// Whether a client-side edit has happened since the last installed mesh.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flags the chunk for remeshing.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Monotonic edit counter, used to detect edits made during a mesh build.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The currently installed mesh.
    pub fn mesh(&self) -> Arc<ChunkMesh> {
        self.mesh.clone()
    }

    /// Installs a mesh built from revision `built_from`.
    ///
    /// The dirty flag is cleared only if no edit happened since the snapshot
    /// the mesh was built from.
    ///
    /// # Returns
    /// `true` if the chunk is now clean
    pub fn swap_mesh(&mut self, mesh: Arc<ChunkMesh>, built_from: u64) -> bool {
        self.mesh = mesh;
        if built_from == self.revision {
            self.dirty = false;
        }
        !self.dirty
    }

    /// Number of non-air voxels.
    pub fn voxel_count(&self) -> usize {
        self.voxels.iter().filter(|&&v| v != AIR).count()
    }

    /// Number of structural voxels.
    pub fn solid_count(&self) -> usize {
        self.solid_array.count_ones()
    }

    /// `true` if every cell is air.
    pub fn is_empty(&self) -> bool {
        self.voxels.iter().all(|&v| v == AIR)
    }

    /// Approximate heap footprint of the voxel data and installed mesh.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.voxels.capacity()
            + self.solid_array.capacity() / 8
            + self.mesh.memory_usage()
    }

    /// Ray test against the installed collision mesh, in chunk-local space.
    pub fn check_ray_collision(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit> {
        self.mesh
            .collision
            .check_ray_collision(origin, direction, max_distance)
    }
}
