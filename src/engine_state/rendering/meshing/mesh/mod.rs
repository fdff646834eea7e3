//! Chunk mesh generation.
//!
//! Turns a [`ChunkSnapshot`](crate::engine_state::voxels::chunk::chunk_snapshot::ChunkSnapshot)
//! into the geometry the renderer and the collision system consume.
//!
//! # Architecture
//! - [`ChunkMesh`]: render quads, the derived collision mesh, and decoration anchors
//! - [`QuadFace`]: one exposed unit face, laid out for direct GPU upload
//! - [`CollisionMesh`]: the same faces as planes with extents, for ray tests
//!
//! Faces are not merged: every exposed unit face becomes exactly one quad.

pub mod face;
pub mod mesh;

pub use face::{CollisionFace, QuadFace, RayHit};
pub use mesh::{ChunkMesh, CollisionMesh, ModelInstance};
