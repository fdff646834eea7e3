//! Task for building a chunk mesh on a worker thread.
//!
//! The task carries handles to the chunk and its six face neighbours. On the
//! worker it takes a padded snapshot under short read locks, releases them,
//! and builds the mesh from the snapshot alone. The result installs the mesh
//! on the owning thread.

use std::sync::Arc;

use log::debug;
use web_time::Instant;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::mesh::ChunkMesh,
        task_management::task::{Task, TaskResult},
        voxels::{
            chunk::{chunk_snapshot::ChunkSnapshot, Chunk},
            world::{ChunkKey, IslandWorld},
        },
    },
};

/// Builds the mesh of one chunk.
pub struct ChunkMeshGenerationTask {
    /// Island and chunk coordinate being meshed
    key: ChunkKey,
    /// The chunk itself
    chunk: MtResource<Chunk>,
    /// Face neighbours, indexed by `BlockSide as usize`
    neighbours: [Option<MtResource<Chunk>>; 6],
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `key` - Island and chunk coordinate of the chunk
    /// * `chunk` - The chunk to mesh
    /// * `neighbours` - Its face neighbours, where they exist
    pub fn new(
        key: ChunkKey,
        chunk: MtResource<Chunk>,
        neighbours: [Option<MtResource<Chunk>>; 6],
    ) -> Self {
        ChunkMeshGenerationTask {
            key,
            chunk,
            neighbours,
        }
    }

    /// Resolves the chunk and its neighbours through the world.
    ///
    /// # Returns
    /// `None` if the island or the chunk no longer exists
    pub fn for_chunk(world: &IslandWorld, key: ChunkKey) -> Option<Self> {
        let island = world.get_island(key.0)?;
        let island = island.get();
        let chunk = island.get_chunk(key.1)?;
        let neighbours = island.neighbour_chunks(key.1);
        Some(Self::new(key, chunk, neighbours))
    }

    fn snapshot(&self) -> ChunkSnapshot {
        let center = self.chunk.get();
        let guards = self.neighbours.each_ref().map(|n| n.as_ref().map(|c| c.get()));
        let neighbours = guards.each_ref().map(|g| g.as_deref());
        ChunkSnapshot::capture(&center, neighbours)
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let start = Instant::now();
        let snapshot = self.snapshot();
        let mesh = ChunkMesh::build(&snapshot);

        debug!(
            "Meshed chunk {:?} of island {} in {:?}: {} quads, {} models",
            self.key.1,
            self.key.0,
            start.elapsed(),
            mesh.quads.len(),
            mesh.model_instances.len()
        );

        Box::new(ChunkMeshGenerationTaskResult {
            key: self.key,
            mesh: Arc::new(mesh),
            built_from: snapshot.revision,
        })
    }
}

/// A finished mesh waiting to be installed.
pub struct ChunkMeshGenerationTaskResult {
    key: ChunkKey,
    mesh: Arc<ChunkMesh>,
    /// Chunk revision the snapshot was taken at
    built_from: u64,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Swaps the mesh into its chunk and hands it to the renderer.
    ///
    /// The mesh is installed even if the chunk changed while it was being
    /// built; in that case the chunk stays dirty and a rebuild is returned.
    fn handle_result(self: Box<Self>, world: &IslandWorld) -> Vec<Box<dyn Task + Send>> {
        if !world.install_mesh(self.key, self.mesh, self.built_from) {
            return Vec::new();
        }

        match ChunkMeshGenerationTask::for_chunk(world, self.key) {
            Some(task) => vec![Box::new(task)],
            None => Vec::new(),
        }
    }
}
