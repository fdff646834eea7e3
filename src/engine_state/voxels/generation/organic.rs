//! Organic island generation.
//!
//! Islands are grown rather than carved: a breadth-first search starts at the
//! island origin and only ever steps into cells that pass the density test,
//! so everything it places is face-connected to the origin by construction.
//!
//! The density of a cell is the product of four factors, and a cell is solid
//! when the product exceeds `density_threshold`:
//!
//! ```text
//! cutoff   = dist² <= (radius · spherical_cutoff_factor)²      (0 or 1)
//! vertical = max(0, 1 - (n - 0.5)² · 4),  n = (y + h) / 2h,  h = floor(radius · base_height_ratio)
//! radial   = max(0, 1 - dist / (radius · radial_falloff_factor))²
//! noise    = (noise3(x, y, z) + 1) / 2
//! ```
//!
//! The vertical factor flattens the island into a lens about `2h` thick, the
//! radial factor rounds its rim, and the noise roughens both.
//!
//! Generation then paints the exposed shell with the palette's surface block
//! and the layer under it with the subsurface block, and finally decorates
//! the top of each column with at most one tree or tuft of grass.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::time::Duration;

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, info};
use web_time::Instant;

use super::biome::BiomePalette;
use super::noise::{remap_unit, FbmNoise, NoiseSampler};
use super::tree::stamp_tree;
use crate::config::GenerationConfig;
use crate::engine_state::voxels::{
    block::{block_type::BlockType, AIR},
    island::{Island, IslandId, FACE_OFFSETS},
    world::IslandWorld,
};

/// What a generation run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    /// Island that was generated.
    pub island_id: IslandId,
    /// Cells accepted by the shape pass.
    pub shape_voxels: usize,
    /// Shape cells repainted as surface.
    pub surface_voxels: usize,
    /// Shape cells repainted as subsurface.
    pub subsurface_voxels: usize,
    /// Trees stamped.
    pub trees: usize,
    /// Grass tufts placed.
    pub grass: usize,
    /// Chunks the island owns afterwards.
    pub chunks: usize,
    /// Chunks created by this run.
    pub new_chunks: Vec<Point3<i32>>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

/// Density test for one cell of an island of a given radius.
struct ShapeField<'a> {
    noise: &'a dyn NoiseSampler,
    radius: f32,
    half_height: f32,
    cutoff_sq: f32,
    falloff_divisor: f32,
    threshold: f32,
}

impl<'a> ShapeField<'a> {
    fn new(noise: &'a dyn NoiseSampler, radius: f32, config: &GenerationConfig) -> Self {
        let cutoff = radius * config.spherical_cutoff_factor;
        ShapeField {
            noise,
            radius,
            half_height: (radius * config.base_height_ratio).floor().max(1.0),
            cutoff_sq: cutoff * cutoff,
            falloff_divisor: 1.0 / (radius * config.radial_falloff_factor),
            threshold: config.density_threshold,
        }
    }

    fn density(&self, cell: Point3<i32>) -> f32 {
        let offset = Vector3::new(cell.x as f32, cell.y as f32, cell.z as f32);
        let dist_sq = offset.magnitude2();
        if dist_sq > self.cutoff_sq {
            return 0.0;
        }

        let n = (offset.y + self.half_height) / (2.0 * self.half_height);
        let vertical = (1.0 - (n - 0.5) * (n - 0.5) * 4.0).max(0.0);
        if vertical <= 0.0 {
            return 0.0;
        }

        let radial = (1.0 - dist_sq.sqrt() * self.falloff_divisor).max(0.0);
        let radial = radial * radial;
        if radial <= 0.0 {
            return 0.0;
        }

        let noise = remap_unit(self.noise.noise3(cell.x as f64, cell.y as f64, cell.z as f64));
        vertical * radial * noise
    }

    fn accepts(&self, cell: Point3<i32>) -> bool {
        self.radius > 0.0 && self.density(cell) > self.threshold
    }
}

/// Per-tree seed from the cell the tree grows from.
fn tree_seed(base: Point3<i32>) -> u32 {
    (base.x.wrapping_mul(73_856_093)
        ^ base.y.wrapping_mul(19_349_663)
        ^ base.z.wrapping_mul(83_492_791)) as u32
}

/// Moves a detached island's chunks into the live one. Chunks the live
/// island lacks are adopted whole; existing ones take the new non-air voxels.
///
/// # Returns
/// The chunk coordinates the live island had beforehand
fn install_chunks(live: &mut Island, staged: Island) -> HashSet<Point3<i32>> {
    let existing: HashSet<Point3<i32>> = live.chunks.keys().copied().collect();
    for (coord, chunk) in staged.chunks {
        match live.chunks.get(&coord) {
            Some(target) => {
                let source = chunk.get();
                let mut target = target.get_mut();
                for (local, voxel) in source.iter_voxels() {
                    target.set_data_only(local.x, local.y, local.z, voxel);
                }
            }
            None => {
                live.chunks.insert(coord, chunk);
            }
        }
    }
    existing
}

impl IslandWorld {
    /// Generates an island's terrain with the default fBm noise for `seed`,
    /// then queues its chunks for meshing.
    ///
    /// # Arguments
    /// * `island_id` - Island to fill; existing voxels are kept unless overwritten
    /// * `seed` - Seeds the noise field and the decoration rolls
    /// * `radius` - Nominal island radius in voxels
    /// * `palette` - Blocks and vegetation density to paint with
    ///
    /// # Returns
    /// A report of what was placed, or `None` if the island does not exist
    pub fn generate_organic_island(
        &self,
        island_id: IslandId,
        seed: u32,
        radius: f32,
        palette: &BiomePalette,
    ) -> Option<GenerationReport> {
        let noise = FbmNoise::new(seed, &self.config().generation);
        self.generate_organic_island_with_noise(island_id, seed, radius, palette, &noise)
    }

    /// [`IslandWorld::generate_organic_island`] with a caller-supplied noise field.
    pub fn generate_organic_island_with_noise(
        &self,
        island_id: IslandId,
        seed: u32,
        radius: f32,
        palette: &BiomePalette,
        noise: &dyn NoiseSampler,
    ) -> Option<GenerationReport> {
        let report = self.build_organic_island(island_id, seed, radius, palette, noise)?;
        self.publish_generated_chunks(island_id, &report.new_chunks);
        Some(report)
    }

    /// Runs the three generation passes through the data-only write path.
    ///
    /// The passes work on a detached island that only sees the voxels they
    /// place; the result is merged into the live island under one short
    /// write lock before the trees are stamped.
    ///
    /// Safe to call off the owning thread: no renderer hook is invoked and no
    /// chunk is queued. Follow with [`IslandWorld::publish_generated_chunks`]
    /// on the owning thread.
    pub fn build_organic_island(
        &self,
        island_id: IslandId,
        seed: u32,
        radius: f32,
        palette: &BiomePalette,
        noise: &dyn NoiseSampler,
    ) -> Option<GenerationReport> {
        let start = Instant::now();
        let config = &self.config().generation;
        let island_handle = self.get_island(island_id)?;
        let mut report = GenerationReport {
            island_id,
            ..Default::default()
        };

        // Build into a detached island so the live one stays unlocked while
        // the passes run, even when this runs on a worker
        let mut island = Island::new(island_id, Point3::new(0.0, 0.0, 0.0));
        let mut trees_to_stamp = Vec::new();

        // Pass 1: grow the shape outward from the origin
        let field = ShapeField::new(noise, radius, config);
        let mut solid = Vec::new();
        let origin = Point3::new(0, 0, 0);
        let mut visited = HashSet::from([origin]);
        let mut frontier = VecDeque::new();

        if field.accepts(origin) {
            frontier.push_back(origin);
        }
        while let Some(cell) = frontier.pop_front() {
            island.set_voxel_data_only(cell, palette.deep_block);
            solid.push(cell);

            for offset in FACE_OFFSETS {
                let next = cell + offset;
                if visited.insert(next) && field.accepts(next) {
                    frontier.push_back(next);
                }
            }
        }
        report.shape_voxels = solid.len();
        debug!("Island {island_id}: shape pass placed {} voxels", solid.len());

        // Pass 2: classify the shell, surface first so the subsurface
        // sweep sees the finished surface layer
        let surface: HashSet<Point3<i32>> = solid
            .iter()
            .copied()
            .filter(|&cell| FACE_OFFSETS.iter().any(|&o| island.get_voxel(cell + o) == AIR))
            .collect();
        let subsurface: Vec<Point3<i32>> = solid
            .iter()
            .copied()
            .filter(|cell| !surface.contains(cell))
            .filter(|&cell| FACE_OFFSETS.iter().any(|&o| surface.contains(&(cell + o))))
            .collect();

        for &cell in &surface {
            island.set_voxel_data_only(cell, palette.surface_block);
        }
        for &cell in &subsurface {
            island.set_voxel_data_only(cell, palette.subsurface_block);
        }
        report.surface_voxels = surface.len();
        report.subsurface_voxels = subsurface.len();

        // Pass 3: one decoration roll per column, columns in sorted order
        let mut columns: BTreeMap<(i32, i32), i32> = BTreeMap::new();
        for cell in &solid {
            let top = columns.entry((cell.x, cell.z)).or_insert(cell.y);
            *top = (*top).max(cell.y);
        }

        let mut rng = fastrand::Rng::with_seed(seed as u64);
        let tree_chance = palette.vegetation_density * config.tree_chance_scale;
        let grass_chance = palette.vegetation_density * config.grass_chance_scale;

        for (&(x, z), &y) in &columns {
            let top = Point3::new(x, y, z);
            let above = Point3::new(x, y + 1, z);
            if island.get_voxel(top) != palette.surface_block || island.get_voxel(above) != AIR {
                continue;
            }

            let roll = rng.f32() * 100.0;
            if roll < tree_chance {
                trees_to_stamp.push(above);
            } else if roll < grass_chance {
                island.set_voxel_data_only(above, BlockType::DECOR_GRASS.id());
                report.grass += 1;
            }
        }

        let existing_chunks = install_chunks(&mut island_handle.get_mut(), island);

        // Trees write through the registry, so the island lock must be free
        for base in trees_to_stamp {
            stamp_tree(self, island_id, base, tree_seed(base), palette.vegetation_density);
            report.trees += 1;
        }

        {
            let island = island_handle.get();
            report.chunks = island.chunks.len();
            report.new_chunks = island
                .chunks
                .keys()
                .filter(|coord| !existing_chunks.contains(coord))
                .copied()
                .collect();
        }
        report.new_chunks.sort_by_key(|c| (c.x, c.y, c.z));
        report.elapsed = start.elapsed();

        info!(
            "Generated island {island_id} (radius {radius}) in {:?}: {} voxels, {} surface, {} trees, {} grass, {} chunks",
            report.elapsed,
            report.shape_voxels,
            report.surface_voxels,
            report.trees,
            report.grass,
            report.chunks
        );

        Some(report)
    }

    /// Registers freshly created chunks with the renderer and queues every
    /// chunk of the island for meshing. Does nothing on a server.
    pub fn publish_generated_chunks(&self, island_id: IslandId, new_chunks: &[Point3<i32>]) {
        if !self.is_client() {
            return;
        }
        let Some(island) = self.get_island(island_id) else {
            return;
        };
        for &coord in new_chunks {
            self.render_hooks().register_chunk(island_id, coord);
        }

        let mut all: Vec<_> = island.get().chunks.keys().copied().collect();
        all.sort_by_key(|c| (c.x, c.y, c.z));
        self.mark_chunks_dirty(island_id, all);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine_state::voxels::generation::biome::{palette_for, BiomeType};
    use crate::core::MtResource;
    use crate::engine_state::voxels::generation::noise::ConstantNoise;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn server_world() -> IslandWorld {
        let mut config = EngineConfig::default();
        config.is_client = false;
        config.physics.initial_drift = false;
        IslandWorld::new(config)
    }

    #[test]
    fn test_flat_noise_gives_symmetric_lens() {
        let world = server_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        let palette = palette_for(BiomeType::BARREN);
        let report = world
            .generate_organic_island_with_noise(id, 1, 20.0, &palette, &ConstantNoise(0.0))
            .unwrap();

        assert!(report.shape_voxels > 100);
        assert_eq!(report.trees + report.grass, 0, "barren islands have no vegetation");

        // with constant noise the shape is mirror symmetric in x and z
        for (pos, _) in world.get_island(id).unwrap().get().voxels() {
            assert_ne!(world.get_voxel(id, Point3::new(-pos.x, pos.y, pos.z)), AIR);
            assert_ne!(world.get_voxel(id, Point3::new(pos.x, pos.y, -pos.z)), AIR);
        }
        // h = floor(20 * 0.15) = 3; the lens never reaches |y| >= h
        for (pos, _) in world.get_island(id).unwrap().get().voxels() {
            assert!(pos.y.abs() < 3, "{pos:?}");
        }
    }

    #[test]
    fn test_layers_are_painted() {
        let world = server_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        let palette = palette_for(BiomeType::BARREN);
        world
            .generate_organic_island_with_noise(id, 1, 24.0, &palette, &ConstantNoise(0.0))
            .unwrap();

        // the lens is three voxels thick in the middle: surface, subsurface, surface
        assert_eq!(world.get_voxel(id, Point3::new(0, 2, 0)), AIR);
        assert_eq!(world.get_voxel(id, Point3::new(0, 1, 0)), palette.surface_block);
        assert_eq!(world.get_voxel(id, Point3::new(0, 0, 0)), palette.subsurface_block);
        assert_eq!(world.get_voxel(id, Point3::new(0, -1, 0)), palette.surface_block);
    }

    #[test]
    fn test_rejected_origin_leaves_island_empty() {
        let world = server_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        let report = world
            .generate_organic_island_with_noise(id, 1, 20.0, &palette_for(BiomeType::FOREST), &ConstantNoise(-1.0))
            .unwrap();
        assert_eq!(report.shape_voxels, 0);
        assert!(world.get_island(id).unwrap().get().chunks.is_empty());
    }

    /// Flat noise that records whether the live island was locked whenever
    /// the shape pass sampled it.
    struct LockWatchingNoise {
        island: MtResource<Island>,
        samples: AtomicUsize,
        locked_samples: AtomicUsize,
    }

    impl NoiseSampler for LockWatchingNoise {
        fn noise3(&self, _x: f64, _y: f64, _z: f64) -> f64 {
            self.samples.fetch_add(1, Ordering::SeqCst);
            if self.island.resource.try_write().is_err() {
                self.locked_samples.fetch_add(1, Ordering::SeqCst);
            }
            0.0
        }
    }

    #[test]
    fn test_passes_run_without_locking_the_live_island() {
        let world = server_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        let noise = LockWatchingNoise {
            island: world.get_island(id).unwrap(),
            samples: AtomicUsize::new(0),
            locked_samples: AtomicUsize::new(0),
        };

        let report = world
            .build_organic_island(id, 1, 16.0, &palette_for(BiomeType::BARREN), &noise)
            .unwrap();

        assert!(noise.samples.load(Ordering::SeqCst) > 0);
        assert_eq!(noise.locked_samples.load(Ordering::SeqCst), 0);
        assert_eq!(world.get_island(id).unwrap().get().voxel_count(), report.shape_voxels);
    }

    #[test]
    fn test_generation_keeps_existing_voxels() {
        let world = server_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        let marker = Point3::new(3, 6, 3);
        world.set_voxel_data_only(id, marker, BlockType::LAMP.id());

        let palette = palette_for(BiomeType::BARREN);
        let report = world
            .generate_organic_island_with_noise(id, 1, 20.0, &palette, &ConstantNoise(0.0))
            .unwrap();

        assert_eq!(world.get_voxel(id, marker), BlockType::LAMP.id());
        assert_eq!(world.get_voxel(id, Point3::new(0, 0, 0)), palette.subsurface_block);
        assert!(!report.new_chunks.contains(&Point3::new(0, 0, 0)));
        assert_eq!(
            world.get_island(id).unwrap().get().voxel_count(),
            report.shape_voxels + 1
        );
    }

    #[test]
    fn test_missing_island() {
        let world = server_world();
        assert!(world.generate_organic_island(42, 1, 10.0, &palette_for(BiomeType::FOREST)).is_none());
    }

    #[test]
    fn test_server_generation_queues_nothing() {
        let world = server_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        world.generate_organic_island(id, 3, 16.0, &palette_for(BiomeType::GRASSLAND));
        assert!(world.take_dirty_chunks().is_empty());
    }

    #[test]
    fn test_tree_seed_hash() {
        assert_eq!(tree_seed(Point3::new(0, 0, 0)), 0);
        assert_eq!(tree_seed(Point3::new(1, 0, 0)), 73_856_093);
        assert_eq!(tree_seed(Point3::new(-1, 0, 0)), (-73_856_093i32) as u32);
    }
}
