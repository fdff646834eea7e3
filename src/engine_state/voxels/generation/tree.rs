//! Tree stamps used to decorate generated islands.
//!
//! Every stamp grows up from `base`, the empty cell directly above a surface
//! voxel, and is 6-connected to it: trunks are continuous columns, and
//! canopies are spheres centred on or overlapping the trunk. Trunks and
//! branches overwrite whatever is in their way; leaves only fill empty cells.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::{
    block::{block_type::BlockType, BlockTypeSize, AIR},
    island::IslandId,
    world::IslandWorld,
};

/// Tree species, picked per column from the biome's vegetation density.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TreeKind {
    Oak,
    Pine,
    Birch,
    Jungle,
    Dead,
    Palm,
}

impl TreeKind {
    /// Chooses a species from the vegetation density and the tree seed.
    pub fn select(seed: u32, density: f32) -> Self {
        let roll = seed % 100;
        if density > 0.8 {
            match roll {
                0..=39 => TreeKind::Oak,
                40..=69 => TreeKind::Pine,
                _ => TreeKind::Jungle,
            }
        } else if density > 0.5 {
            if roll < 60 {
                TreeKind::Oak
            } else {
                TreeKind::Birch
            }
        } else if density > 0.15 {
            if roll < 70 {
                TreeKind::Oak
            } else {
                TreeKind::Dead
            }
        } else if roll < 50 {
            TreeKind::Dead
        } else {
            TreeKind::Palm
        }
    }
}

/// Stamps a tree onto an island through the server write path.
///
/// # Arguments
/// * `world` - World holding the island
/// * `island_id` - Target island
/// * `base` - Island-local cell where the trunk starts
/// * `seed` - Per-tree seed; picks the species and its proportions
/// * `density` - Vegetation density of the island's biome
///
/// # Returns
/// The species stamped and the number of voxels written
pub fn stamp_tree(
    world: &IslandWorld,
    island_id: IslandId,
    base: Point3<i32>,
    seed: u32,
    density: f32,
) -> (TreeKind, usize) {
    let kind = TreeKind::select(seed, density);
    let mut stamp = Stamp {
        world,
        island_id,
        written: 0,
    };

    match kind {
        TreeKind::Oak => stamp.oak(base, seed),
        TreeKind::Pine => stamp.pine(base, seed),
        TreeKind::Birch => stamp.birch(base, seed),
        TreeKind::Jungle => stamp.jungle(base, seed),
        TreeKind::Dead => stamp.dead(base, seed),
        TreeKind::Palm => stamp.palm(base, seed),
    }

    (kind, stamp.written)
}

struct Stamp<'a> {
    world: &'a IslandWorld,
    island_id: IslandId,
    written: usize,
}

impl Stamp<'_> {
    fn wood(&mut self, pos: Point3<i32>, block: BlockType) {
        if self.world.set_voxel_data_only(self.island_id, pos, block.id()) {
            self.written += 1;
        }
    }

    fn leaf(&mut self, pos: Point3<i32>, block: BlockTypeSize) {
        if self.world.get_voxel(self.island_id, pos) == AIR
            && self.world.set_voxel_data_only(self.island_id, pos, block)
        {
            self.written += 1;
        }
    }

    fn column(&mut self, base: Point3<i32>, height: i32, block: BlockType) {
        for y in 0..height {
            self.wood(base + Vector3::new(0, y, 0), block);
        }
    }

    /// Ball of leaves around `center`, which itself is left alone.
    fn sphere(&mut self, center: Point3<i32>, radius: i32, block: BlockType) {
        let r2 = radius * radius;
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    let d2 = dx * dx + dy * dy + dz * dz;
                    if d2 <= r2 && d2 != 0 {
                        self.leaf(center + Vector3::new(dx, dy, dz), block.id());
                    }
                }
            }
        }
    }

    fn oak(&mut self, base: Point3<i32>, seed: u32) {
        let height = 12 + (seed % 7) as i32;

        // trunks taller than 14 are 2x2
        let footprint: &[Vector3<i32>] = if height > 14 {
            &[
                Vector3::new(0, 0, 0),
                Vector3::new(1, 0, 0),
                Vector3::new(0, 0, 1),
                Vector3::new(1, 0, 1),
            ]
        } else {
            &[Vector3::new(0, 0, 0)]
        };
        for offset in footprint {
            self.column(base + offset, height, BlockType::WOOD_OAK);
        }

        let canopy = base + Vector3::new(0, height - 4, 0);
        self.sphere(canopy, 5, BlockType::LEAVES_GREEN);
        self.sphere(canopy + Vector3::new(0, 2, 0), 4, BlockType::LEAVES_GREEN);
        self.sphere(canopy + Vector3::new(0, 4, 0), 3, BlockType::LEAVES_GREEN);

        // branch tips sit inside the lowest sphere, so they stay attached
        for (x, z) in [(3, 3), (-3, 3), (3, -3), (-3, -3)] {
            let tip = canopy + Vector3::new(x, 1, z);
            self.wood(tip, BlockType::WOOD_OAK);
            self.sphere(tip, 2, BlockType::LEAVES_GREEN);
        }
    }

    fn pine(&mut self, base: Point3<i32>, seed: u32) {
        let height = 18 + (seed % 11) as i32;
        self.column(base, height, BlockType::WOOD_PINE);

        // cone: radius shrinks from 5 to 1 towards the tip
        let start = height / 2;
        let layers = height - start + 2;
        for layer in 0..layers {
            let radius = 5 - (layer as f32 / layers as f32 * 4.0) as i32;
            if radius > 0 {
                self.sphere(base + Vector3::new(0, start + layer, 0), radius, BlockType::LEAVES_DARK);
            }
        }

        self.leaf(base + Vector3::new(0, height, 0), BlockType::LEAVES_DARK.id());
        self.leaf(base + Vector3::new(0, height + 1, 0), BlockType::LEAVES_DARK.id());
    }

    fn jungle(&mut self, base: Point3<i32>, seed: u32) {
        let height = 20 + (seed % 13) as i32;
        for dx in -1..=1 {
            for dz in -1..=1 {
                self.column(base + Vector3::new(dx, 0, dz), height, BlockType::WOOD_JUNGLE);
            }
        }

        let canopy = base + Vector3::new(0, height - 8, 0);
        for (lift, radius) in [(0, 7), (3, 6), (5, 5), (7, 4), (9, 3)] {
            self.sphere(canopy + Vector3::new(0, lift, 0), radius, BlockType::LEAVES_DARK);
        }

        for (x, z) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let tip = canopy + Vector3::new(5 * x, 2, 5 * z);
            for i in 0..3 {
                self.wood(tip - Vector3::new(i * x, 0, i * z), BlockType::WOOD_JUNGLE);
            }
            self.sphere(tip, 3, BlockType::LEAVES_DARK);
        }
    }

    fn birch(&mut self, base: Point3<i32>, seed: u32) {
        let height = 14 + (seed % 7) as i32;
        self.column(base, height, BlockType::WOOD_BIRCH);

        let canopy = base + Vector3::new(0, height - 5, 0);
        for layer in 0..6 {
            let radius = if (2..=4).contains(&layer) { 3 } else { 2 };
            self.sphere(canopy + Vector3::new(0, layer, 0), radius, BlockType::LEAVES_GREEN);
        }
    }

    fn dead(&mut self, base: Point3<i32>, seed: u32) {
        let height = 4 + (seed % 4) as i32;
        self.column(base, height, BlockType::WOOD_OAK);

        let top = base + Vector3::new(0, height - 1, 0);
        self.wood(top + Vector3::new(1, 0, 0), BlockType::WOOD_OAK);
        self.wood(top + Vector3::new(-1, 0, 0), BlockType::WOOD_OAK);
        self.wood(top + Vector3::new(0, 1, 0), BlockType::WOOD_OAK);
        if seed % 2 == 0 {
            self.wood(top + Vector3::new(1, 1, 0), BlockType::WOOD_OAK);
            self.wood(top + Vector3::new(-1, 1, 0), BlockType::WOOD_OAK);
        }
    }

    fn palm(&mut self, base: Point3<i32>, seed: u32) {
        let height = 12 + (seed % 7) as i32;
        let lean_dir = match seed % 4 {
            0 => Vector3::new(1, 0, 0),
            1 => Vector3::new(-1, 0, 0),
            2 => Vector3::new(0, 0, 1),
            _ => Vector3::new(0, 0, -1),
        };

        // the trunk leans progressively above y = 4; each sideways step gets
        // an extra block at the old offset so the column stays face-connected
        let mut previous = 0;
        let mut top = base;
        for y in 0..height {
            let lean = if y > 4 { (y as f32 / height as f32 * 3.0) as i32 } else { 0 };
            if lean != previous {
                self.wood(base + lean_dir * previous + Vector3::new(0, y, 0), BlockType::WOOD_PALM);
                previous = lean;
            }
            top = base + lean_dir * lean + Vector3::new(0, y, 0);
            self.wood(top, BlockType::WOOD_PALM);
        }

        let crown = top + Vector3::new(0, 1, 0);
        self.sphere(crown, 2, BlockType::LEAVES_PALM);
        self.leaf(crown, BlockType::LEAVES_PALM.id());

        // fronds run out three cells from the crown, then droop one
        for (x, z) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let dir = Vector3::new(x, 0, z);
            for i in 1..=3 {
                self.leaf(crown + dir * i, BlockType::LEAVES_PALM.id());
            }
            self.leaf(crown + dir * 3 - Vector3::new(0, 1, 0), BlockType::LEAVES_PALM.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine_state::voxels::connectivity::find_connected_groups;

    fn world() -> (IslandWorld, IslandId) {
        let mut config = EngineConfig::default();
        config.is_client = false;
        config.physics.initial_drift = false;
        let world = IslandWorld::new(config);
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        // a single ground voxel under the base
        world.set_voxel_data_only(id, Point3::new(0, -1, 0), BlockType::DIRT.id());
        (world, id)
    }

    #[test]
    fn test_species_selection() {
        assert_eq!(TreeKind::select(10, 0.95), TreeKind::Oak);
        assert_eq!(TreeKind::select(45, 0.95), TreeKind::Pine);
        assert_eq!(TreeKind::select(99, 0.95), TreeKind::Jungle);
        assert_eq!(TreeKind::select(160, 0.8), TreeKind::Birch);
        assert_eq!(TreeKind::select(75, 0.3), TreeKind::Dead);
        assert_eq!(TreeKind::select(20, 0.1), TreeKind::Dead);
        assert_eq!(TreeKind::select(51, 0.0), TreeKind::Palm);
    }

    #[test]
    fn test_every_species_is_one_component_with_its_ground() {
        let cases = [(5, 0.95), (45, 0.95), (80, 0.95), (77, 0.6), (81, 0.3), (150, 0.05), (151, 0.05)];
        for (seed, density) in cases {
            for bump in 0..4 {
                let (world, id) = world();
                let (kind, written) = stamp_tree(&world, id, Point3::new(0, 0, 0), seed + bump * 100, density);
                assert!(written > 0, "{kind:?} wrote nothing");

                let island = world.get_island(id).unwrap();
                let groups = find_connected_groups(&island.get());
                assert_eq!(groups.len(), 1, "{kind:?} (seed {}) fell apart", seed + bump * 100);
            }
        }
    }

    #[test]
    fn test_leaves_never_replace_blocks() {
        let (world, id) = world();
        let stone = BlockType::STONE.id();
        world.set_voxel_data_only(id, Point3::new(3, 5, 0), stone);
        stamp_tree(&world, id, Point3::new(0, 0, 0), 0, 0.3);
        assert_eq!(world.get_voxel(id, Point3::new(3, 5, 0)), stone);
    }

    #[test]
    fn test_trunk_height_follows_seed() {
        let (world, id) = world();
        // dead tree, seed % 4 == 2 -> six blocks of trunk
        let (kind, _) = stamp_tree(&world, id, Point3::new(0, 0, 0), 30, 0.05);
        assert_eq!(kind, TreeKind::Dead);
        for y in 0..6 {
            assert_eq!(world.get_voxel(id, Point3::new(0, y, 0)), BlockType::WOOD_OAK.id());
        }
        // branch cap above the trunk, seed is even so the side branches exist
        assert_eq!(world.get_voxel(id, Point3::new(0, 6, 0)), BlockType::WOOD_OAK.id());
        assert_eq!(world.get_voxel(id, Point3::new(1, 6, 0)), BlockType::WOOD_OAK.id());
        assert_eq!(world.get_voxel(id, Point3::new(0, 7, 0)), AIR);
    }
}
