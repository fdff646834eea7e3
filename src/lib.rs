#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Island Engine
//!
//! The world model of a floating-island voxel sandbox: islands are rigid
//! bodies made of 16³ voxel chunks that drift through space, can be edited
//! voxel by voxel, and break apart when the last voxel holding two parts
//! together is removed.
//!
//! ## Key Modules
//!
//! * `config` - Engine configuration loaded from JSON and the environment
//! * `core` - Shared-ownership primitives used throughout the engine
//! * `engine_state` - Islands, chunks, generation, meshing and worker tasks
//! * `error` - The engine's error type
//!
//! ## Architecture
//!
//! * Voxel data lives in chunks owned by islands owned by an `IslandWorld`
//! * Edits go through the world, which keeps meshes and renderers in sync
//! * Mesh builds and island generation run on a small worker pool
//! * A renderer attaches through `RenderHooks`; none is required
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     if let Err(err) = island_engine::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::{info, warn};
use web_time::Instant;

use config::EngineConfig;
use engine_state::{
    voxels::{block::block_type::BlockType, island::IslandId},
    EngineState,
};
use error::EngineError;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

/// Name of the stopwatch logged around demo world construction.
pub const WORLD_INITIALIZATION_STOPWATCH: &str = "World Initialization";

/// Seconds simulated per demo tick.
const TICK_SECONDS: f32 = 1.0 / 60.0;

/// Runs a headless demo: builds a small archipelago, simulates a few seconds,
/// then breaks a bridge so one island splits in two.
///
/// The first command line argument, if any, is a JSON config file.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => {
            let mut config = EngineConfig::default();
            config.apply_env_overrides()?;
            config
        }
    };

    let start = Instant::now();
    let mut engine = EngineState::new(config);

    let seed = 1337;
    for (i, center) in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(120.0, 10.0, -40.0),
        Point3::new(-90.0, -15.0, 75.0),
    ]
    .into_iter()
    .enumerate()
    {
        let radius = 18.0 + 6.0 * i as f32;
        if let Some((id, report)) = engine.spawn_island(center, seed + i as u32, radius) {
            info!(
                "Island {id}: {} voxels, {} trees, {} chunks in {:?}",
                report.shape_voxels, report.trees, report.chunks, report.elapsed
            );
        }
    }
    engine.spawn_island_in_background(Point3::new(40.0, 60.0, 200.0), seed + 7, 30.0);

    if !engine.flush(Duration::from_secs(30)) {
        warn!("Continuing with meshes still pending");
    }
    info!("{WORLD_INITIALIZATION_STOPWATCH}: {:?}", start.elapsed());

    let bridge_island = build_bridge_island(&engine, Point3::new(0.0, -80.0, 0.0));

    for _ in 0..180 {
        engine.update(TICK_SECONDS);
    }

    let before = engine.world().island_count();
    match engine.break_voxel(bridge_island, Point3::new(0, 0, 0)) {
        Some(outcome) => match outcome.fragment {
            Some(fragment) => info!(
                "Bridge broke: island {} split off with {} voxels",
                fragment.new_island,
                fragment.removed_positions.len()
            ),
            None => info!("Bridge removed without a split"),
        },
        None => warn!("Bridge voxel was already gone"),
    }
    info!("{before} islands before the break, {} after", engine.world().island_count());

    for _ in 0..60 {
        engine.update(TICK_SECONDS);
    }
    engine.flush(Duration::from_secs(5));

    for id in engine.world().island_ids() {
        if let Some(center) = engine.world().island_center(id) {
            info!("Island {id} at ({:.1}, {:.1}, {:.1})", center.x, center.y, center.z);
        }
    }
    info!(
        "Voxel memory in use: {} KiB",
        engine.world().total_memory_usage() / 1024
    );

    if let Some(hit) = engine.raycast(Point3::new(0.0, 200.0, 0.0), Vector3::new(0.0, -1.0, 0.0), 400.0) {
        info!("Ray from above hit island {} at distance {:.2}", hit.island_id, hit.hit.distance);
    }

    Ok(())
}

/// Two stone slabs joined by a single voxel at the local origin.
fn build_bridge_island(engine: &EngineState, center: Point3<f32>) -> IslandId {
    let id = engine.world().create_island(center);
    let stone = BlockType::STONE.id();
    for x in 1..=4 {
        for z in -2..=2 {
            engine.place_voxel(id, Point3::new(x, 0, z), stone);
            engine.place_voxel(id, Point3::new(-x, 0, z), stone);
        }
    }
    engine.place_voxel(id, Point3::new(0, 0, 0), stone);
    id
}
