//! # Engine State Module
//!
//! The top-level context of the island engine.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world, the mesh pipeline and the configuration
//! * `rendering` - Mesh building and the hooks a renderer attaches through
//! * `task_management` - Worker threads for meshing and generation
//! * `voxels` - Islands, chunks, connectivity and generation
//!
//! ## Architecture
//!
//! There is no global world. `EngineState` constructs the `IslandWorld` and
//! hands it to everything that needs it, including worker tasks, which hold
//! cheap clones of the same world handle.
//!
//! A tick (`EngineState::update`) does three things in order:
//!
//! 1. Integrates island physics
//! 2. Turns chunks dirtied since the last tick into mesh build tasks
//! 3. Installs whatever meshes the workers have finished

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::{debug, info, warn};
use web_time::Instant;

use rendering::{MeshManager, NoopRenderHooks, RenderHooks};
use voxels::{
    block::BlockTypeSize,
    connectivity::BreakOutcome,
    generation::{biome_for_position, palette_for, GenerationReport},
    island::IslandId,
    tasks::island_generation_task::IslandGenerationTask,
    world::{IslandWorld, WorldRayHit},
};

use crate::config::EngineConfig;

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// What one call to [`EngineState::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Islands whose transform changed.
    pub islands_moved: usize,
    /// Mesh builds scheduled this tick.
    pub meshes_scheduled: usize,
    /// Meshes installed this tick.
    pub meshes_installed: usize,
}

/// The engine context.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use island_engine::{config::EngineConfig, engine_state::EngineState};
///
/// let mut config = EngineConfig::default();
/// config.worker_count = 0;
/// let mut engine = EngineState::new(config);
///
/// let (id, report) = engine.spawn_island(Point3::new(0.0, 0.0, 0.0), 7, 12.0).unwrap();
/// assert!(report.shape_voxels > 0);
///
/// let stats = engine.update(1.0 / 60.0);
/// assert_eq!(stats.meshes_installed, report.chunks);
/// assert!(engine.world().get_island(id).is_some());
/// ```
pub struct EngineState {
    world: IslandWorld,
    mesh_manager: MeshManager,
    config: Arc<EngineConfig>,
}

impl EngineState {
    /// Creates an engine with no renderer attached.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_render_hooks(config, Arc::new(NoopRenderHooks))
    }

    /// Creates an engine that reports chunks and meshes to `hooks`.
    pub fn with_render_hooks(config: EngineConfig, hooks: Arc<dyn RenderHooks>) -> Self {
        info!(
            "Starting island engine ({} workers, {})",
            config.worker_count,
            if config.is_client { "client" } else { "server" }
        );
        let mesh_manager = MeshManager::new(config.worker_count);
        let config = Arc::new(config);
        EngineState {
            world: IslandWorld::with_render_hooks((*config).clone(), hooks),
            mesh_manager,
            config,
        }
    }

    /// The island registry.
    pub fn world(&self) -> &IslandWorld {
        &self.world
    }

    /// The configuration the engine was started with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The mesh pipeline.
    pub fn mesh_manager(&mut self) -> &mut MeshManager {
        &mut self.mesh_manager
    }

    /// Creates an island and generates it synchronously, painted with the
    /// biome its position selects for `seed`.
    ///
    /// # Returns
    /// The island id and generation report
    pub fn spawn_island(
        &mut self,
        center: Point3<f32>,
        seed: u32,
        radius: f32,
    ) -> Option<(IslandId, GenerationReport)> {
        let biome = biome_for_position(center, seed);
        let id = self.world.create_island(center);
        debug!("Island {id} is {}", biome.name());
        let report = self
            .world
            .generate_organic_island(id, seed, radius, &palette_for(biome))?;
        Some((id, report))
    }

    /// Creates an island and generates it on a worker.
    ///
    /// The island exists, empty, as soon as this returns; its terrain and
    /// meshes arrive over the following ticks.
    pub fn spawn_island_in_background(&mut self, center: Point3<f32>, seed: u32, radius: f32) -> IslandId {
        let biome = biome_for_position(center, seed);
        let id = self.world.create_island(center);
        self.mesh_manager
            .task_manager()
            .publish_task(Box::new(IslandGenerationTask::new(
                self.world.clone(),
                id,
                seed,
                radius,
                palette_for(biome),
            )));
        id
    }

    /// Breaks a voxel, splitting the island if needed.
    pub fn break_voxel(&self, island_id: IslandId, pos: Point3<i32>) -> Option<BreakOutcome> {
        self.world.break_voxel(island_id, pos)
    }

    /// Writes a voxel through the path matching this process: client writes
    /// invalidate meshes, server writes only store data.
    pub fn place_voxel(&self, island_id: IslandId, pos: Point3<i32>, block_type: BlockTypeSize) -> bool {
        if self.config.is_client {
            self.world.set_voxel(island_id, pos, block_type)
        } else {
            self.world.set_voxel_data_only(island_id, pos, block_type)
        }
    }

    /// Nearest island surface along a world-space ray.
    pub fn raycast(&self, origin: Point3<f32>, direction: Vector3<f32>, max_distance: f32) -> Option<WorldRayHit> {
        self.world.raycast(origin, direction, max_distance)
    }

    /// Advances the engine by `dt` seconds.
    pub fn update(&mut self, dt: f32) -> TickStats {
        let islands_moved = self.world.integrate_physics(dt);
        let meshes_scheduled = self.mesh_manager.schedule_dirty_chunks(&self.world);
        let meshes_installed = self.mesh_manager.poll(&self.world);

        TickStats {
            islands_moved,
            meshes_scheduled,
            meshes_installed,
        }
    }

    /// Ticks the mesh pipeline without advancing physics until no build is
    /// queued or running, or `timeout` passes.
    ///
    /// # Returns
    /// `true` if everything finished in time
    pub fn flush(&mut self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            self.mesh_manager.schedule_dirty_chunks(&self.world);
            self.mesh_manager.poll(&self.world);
            if !self.mesh_manager.has_pending_work() {
                // a finished generation task may have queued new chunks
                if self.mesh_manager.schedule_dirty_chunks(&self.world) == 0 {
                    return true;
                }
                continue;
            }
            if start.elapsed() >= timeout {
                warn!("Mesh pipeline still busy after {timeout:?}");
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
}
