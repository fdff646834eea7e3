//! # Chunk Iteration
//!
//! Walks the occupied cells of a chunk in wire order, skipping air.

use cgmath::Point3;

use super::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE, CHUNK_SIZE};
use crate::engine_state::voxels::block::{BlockTypeSize, AIR};

/// Iterator over `(local position, voxel)` for every non-air cell of a chunk.
pub struct ChunkVoxelIterator<'a> {
    chunk_ref: &'a Chunk,
    offset: i32,
}

impl<'a> ChunkVoxelIterator<'a> {
    /// Starts an iteration at local `(0, 0, 0)`.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkVoxelIterator {
            chunk_ref,
            offset: 0,
        }
    }
}

impl Iterator for ChunkVoxelIterator<'_> {
    type Item = (Point3<i32>, BlockTypeSize);

    fn next(&mut self) -> Option<Self::Item> {
        let voxels = self.chunk_ref.raw_bytes();
        while self.offset < CHUNK_SIZE {
            let offset = self.offset;
            self.offset += 1;

            let voxel = voxels[offset as usize];
            if voxel != AIR {
                let position = Point3::new(
                    offset % CHUNK_DIMENSION,
                    (offset / CHUNK_DIMENSION) % CHUNK_DIMENSION,
                    offset / CHUNK_PLANE_SIZE,
                );
                return Some((position, voxel));
            }
        }
        None
    }
}

impl Chunk {
    /// Iterates over every non-air voxel with its local position.
    pub fn iter_voxels(&self) -> ChunkVoxelIterator<'_> {
        ChunkVoxelIterator::new(self)
    }
}
