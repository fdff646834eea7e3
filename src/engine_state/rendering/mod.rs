//! Rendering seam of the island engine.
//!
//! The engine itself never touches a GPU. It builds chunk meshes on worker
//! threads and reports chunk lifecycle and finished meshes to whatever
//! renderer is attached through [`RenderHooks`]. Servers and tests attach
//! [`NoopRenderHooks`].

use std::sync::Arc;

use cgmath::Point3;

use crate::engine_state::voxels::island::IslandId;

pub mod meshing;
pub mod tasks;

pub use meshing::MeshManager;

use meshing::mesh::ChunkMesh;

/// Callbacks into the renderer.
///
/// Called from the thread that owns the world, never from workers. None of
/// them may call back into the `IslandWorld`.
pub trait RenderHooks: Send + Sync {
    /// A chunk now exists and will receive meshes.
    fn register_chunk(&self, island_id: IslandId, chunk: Point3<i32>);

    /// A chunk is gone; drop its GPU resources.
    fn unregister_chunk(&self, island_id: IslandId, chunk: Point3<i32>);

    /// A new mesh was installed for a chunk.
    fn upload_mesh(&self, island_id: IslandId, chunk: Point3<i32>, mesh: &Arc<ChunkMesh>);
}

/// Renderer hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderHooks;

impl RenderHooks for NoopRenderHooks {
    fn register_chunk(&self, _island_id: IslandId, _chunk: Point3<i32>) {}

    fn unregister_chunk(&self, _island_id: IslandId, _chunk: Point3<i32>) {}

    fn upload_mesh(&self, _island_id: IslandId, _chunk: Point3<i32>, _mesh: &Arc<ChunkMesh>) {}
}
