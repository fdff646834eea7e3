//! # Chunk Snapshot
//!
//! A copy of one chunk plus a one-cell border taken from its six face
//! neighbours. Mesh builds run against a snapshot so a worker never holds a
//! chunk lock while it generates geometry, and faces on chunk borders are
//! culled against the real neighbouring voxels.
//!
//! Border cells come only from face neighbours; the edge and corner cells of
//! the padded cube stay air since face culling never reads them.

use cgmath::Point3;

use super::{
    Chunk, CHUNK_DIMENSION, CHUNK_DIMENSION_WRAPPED, CHUNK_PLANE_SIZE_WRAPPED, CHUNK_SIZE_WRAPPED,
};
use crate::engine_state::voxels::block::{block_side::BlockSide, BlockTypeSize, AIR};

/// An immutable padded copy of a chunk's voxels.
#[derive(Clone)]
pub struct ChunkSnapshot {
    /// Chunk coordinate the snapshot was taken from.
    pub position: Point3<i32>,
    /// Revision of the centre chunk at capture time.
    pub revision: u64,
    voxels: Vec<BlockTypeSize>,
}

impl ChunkSnapshot {
    /// Captures `center` and the border layers of its neighbours.
    ///
    /// # Arguments
    /// * `center` - The chunk to mesh
    /// * `neighbours` - Face neighbours indexed by `BlockSide as usize`; missing
    ///   chunks read as air
    pub fn capture(center: &Chunk, neighbours: [Option<&Chunk>; 6]) -> Self {
        let mut snapshot = ChunkSnapshot {
            position: center.position,
            revision: center.revision(),
            voxels: vec![AIR; CHUNK_SIZE_WRAPPED],
        };

        for (local, voxel) in center.iter_voxels() {
            snapshot.put(local.x, local.y, local.z, voxel);
        }

        let last = CHUNK_DIMENSION - 1;
        for side in BlockSide::all() {
            let Some(neighbour) = neighbours[side as usize] else {
                continue;
            };
            let step = side.offset();
            for a in 0..CHUNK_DIMENSION {
                for b in 0..CHUNK_DIMENSION {
                    // (x, y, z) inside the neighbour, and where it lands in the border
                    let (source, target) = match (step.x, step.y, step.z) {
                        (1, _, _) => ((0, a, b), (CHUNK_DIMENSION, a, b)),
                        (-1, _, _) => ((last, a, b), (-1, a, b)),
                        (_, 1, _) => ((a, 0, b), (a, CHUNK_DIMENSION, b)),
                        (_, -1, _) => ((a, last, b), (a, -1, b)),
                        (_, _, 1) => ((a, b, 0), (a, b, CHUNK_DIMENSION)),
                        _ => ((a, b, last), (a, b, -1)),
                    };
                    let voxel = neighbour.get(source.0, source.1, source.2);
                    if voxel != AIR {
                        snapshot.put(target.0, target.1, target.2, voxel);
                    }
                }
            }
        }

        snapshot
    }

    #[inline]
    fn wrapped_index(x: i32, y: i32, z: i32) -> Option<usize> {
        let range = -1..=CHUNK_DIMENSION;
        if range.contains(&x) && range.contains(&y) && range.contains(&z) {
            Some(
                (x + 1) as usize
                    + (y + 1) as usize * CHUNK_DIMENSION_WRAPPED
                    + (z + 1) as usize * CHUNK_PLANE_SIZE_WRAPPED,
            )
        } else {
            None
        }
    }

    fn put(&mut self, x: i32, y: i32, z: i32, voxel: BlockTypeSize) {
        if let Some(i) = Self::wrapped_index(x, y, z) {
            self.voxels[i] = voxel;
        }
    }

    /// Voxel at local coordinates in `[-1, 16]`; air beyond the border.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        Self::wrapped_index(x, y, z).map_or(AIR, |i| self.voxels[i])
    }
}
