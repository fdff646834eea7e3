//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: builds the mesh of one chunk from a padded snapshot

pub mod chunk_mesh_generation_task;
