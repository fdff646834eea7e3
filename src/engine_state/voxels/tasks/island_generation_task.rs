//! # Island Generation Task
//!
//! Runs the organic generator for one island on a worker thread. The worker
//! only writes voxel data; registering chunks with the renderer and queueing
//! them for meshing happens when the result is handled.

use log::warn;

use crate::engine_state::{
    task_management::task::{Task, TaskResult},
    voxels::{
        generation::{organic::GenerationReport, BiomePalette, FbmNoise},
        island::IslandId,
        world::IslandWorld,
    },
};

/// Generates the terrain of an existing island.
pub struct IslandGenerationTask {
    /// Handle to the world that owns the island
    world: IslandWorld,
    island_id: IslandId,
    seed: u32,
    radius: f32,
    palette: BiomePalette,
}

impl IslandGenerationTask {
    /// Creates a new island generation task.
    ///
    /// # Arguments
    /// * `world` - World holding the island
    /// * `island_id` - Island to fill
    /// * `seed` - Noise and decoration seed
    /// * `radius` - Nominal radius in voxels
    /// * `palette` - Blocks to paint with
    pub fn new(
        world: IslandWorld,
        island_id: IslandId,
        seed: u32,
        radius: f32,
        palette: BiomePalette,
    ) -> Self {
        IslandGenerationTask {
            world,
            island_id,
            seed,
            radius,
            palette,
        }
    }
}

impl Task for IslandGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let noise = FbmNoise::new(self.seed, &self.world.config().generation);
        let report = self.world.build_organic_island(
            self.island_id,
            self.seed,
            self.radius,
            &self.palette,
            &noise,
        );

        Box::new(IslandGenerationTaskResult {
            island_id: self.island_id,
            report,
        })
    }
}

/// The result of generating an island.
pub struct IslandGenerationTaskResult {
    island_id: IslandId,
    /// `None` if the island vanished before the task ran
    report: Option<GenerationReport>,
}

impl TaskResult for IslandGenerationTaskResult {
    /// Publishes the new chunks; mesh builds follow through the dirty queue.
    fn handle_result(self: Box<Self>, world: &IslandWorld) -> Vec<Box<dyn Task + Send>> {
        match self.report {
            Some(report) => world.publish_generated_chunks(self.island_id, &report.new_chunks),
            None => warn!("Island {} was gone before it could be generated", self.island_id),
        }
        Vec::new()
    }
}
