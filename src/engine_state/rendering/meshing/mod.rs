//! Mesh generation and management for island chunks.
//!
//! # Architecture
//! - `MeshManager`: owns the worker pool that builds chunk meshes and drains
//!   the world's dirty-chunk queue into it
//! - `mesh/`: the face-list mesh and collision mesh built from a chunk snapshot
//!
//! # Flow
//! 1. Voxel writes mark chunks dirty and queue them on the `IslandWorld`
//! 2. `MeshManager::schedule_dirty_chunks` turns the queue into build tasks
//! 3. Workers snapshot the chunk with its borders and build a `ChunkMesh`
//! 4. `MeshManager::poll` installs finished meshes and notifies the renderer

use log::debug;

use crate::engine_state::{
    task_management::TaskManager,
    voxels::{island::IslandId, world::IslandWorld},
};

use super::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask;
use cgmath::Point3;

/// Chunk mesh geometry and collision data.
pub mod mesh;

/// Schedules chunk mesh builds and applies their results.
pub struct MeshManager {
    task_manager: TaskManager,
}

impl MeshManager {
    /// Creates a mesh manager with its own worker pool.
    ///
    /// # Arguments
    /// * `num_workers` - Worker threads; `0` builds every mesh inline in `poll`
    pub fn new(num_workers: usize) -> Self {
        MeshManager {
            task_manager: TaskManager::new(num_workers),
        }
    }

    /// The worker pool, shared with other background work such as island
    /// generation.
    pub fn task_manager(&mut self) -> &mut TaskManager {
        &mut self.task_manager
    }

    /// Schedules a mesh build for one chunk.
    ///
    /// # Returns
    /// `false` if the island or the chunk does not exist
    pub fn submit(&mut self, world: &IslandWorld, island_id: IslandId, chunk: Point3<i32>) -> bool {
        match ChunkMeshGenerationTask::for_chunk(world, (island_id, chunk)) {
            Some(task) => {
                self.task_manager.publish_task(Box::new(task));
                true
            }
            None => false,
        }
    }

    /// Drains the world's dirty queue into build tasks.
    ///
    /// # Returns
    /// The number of builds scheduled
    pub fn schedule_dirty_chunks(&mut self, world: &IslandWorld) -> usize {
        let dirty = world.take_dirty_chunks();
        let scheduled = dirty
            .into_iter()
            .filter(|&(island_id, chunk)| self.submit(world, island_id, chunk))
            .count();
        if scheduled > 0 {
            debug!("Scheduled {scheduled} chunk mesh builds");
        }
        scheduled
    }

    /// Installs finished meshes and keeps the workers fed. Call once per tick.
    ///
    /// With no workers, every pending build runs here on the calling thread.
    ///
    /// # Returns
    /// The number of meshes installed
    pub fn poll(&mut self, world: &IslandWorld) -> usize {
        if self.task_manager.worker_count() == 0 {
            return self.task_manager.run_queued_inline(world);
        }
        let handled = self.task_manager.process_completed_tasks(world);
        self.task_manager.process_queued_tasks();
        handled
    }

    /// Whether builds are queued or running.
    pub fn has_pending_work(&self) -> bool {
        self.task_manager.has_pending_work()
    }
}
