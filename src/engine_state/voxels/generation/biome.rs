//! Biomes and their block palettes.
//!
//! An island's biome is picked from its world position and the world seed by
//! a small integer hash, so the same archipelago layout always produces the
//! same biomes. Each biome maps to a fixed [`BiomePalette`] that the
//! generator paints the island with.

use cgmath::Point3;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};

/// The kinds of island surface.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[allow(missing_docs)]
pub enum BiomeType {
    GRASSLAND = 0,
    FOREST,
    DESERT,
    SNOW,
    VOLCANIC,
    CRYSTAL,
    TROPICAL,
    BARREN,
}

impl BiomeType {
    /// Number of biomes.
    pub const COUNT: usize = 8;

    /// Converts a raw biome index.
    pub fn from_index(index: u8) -> Option<Self> {
        FromPrimitive::from_u8(index)
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            BiomeType::GRASSLAND => "Grassland",
            BiomeType::FOREST => "Forest",
            BiomeType::DESERT => "Desert",
            BiomeType::SNOW => "Snow",
            BiomeType::VOLCANIC => "Volcanic",
            BiomeType::CRYSTAL => "Crystal",
            BiomeType::TROPICAL => "Tropical",
            BiomeType::BARREN => "Barren",
        }
    }
}

/// The blocks and densities an island of some biome is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomePalette {
    /// Exposed top layer.
    pub surface_block: BlockTypeSize,
    /// Layer directly under the surface.
    pub subsurface_block: BlockTypeSize,
    /// Island core.
    pub deep_block: BlockTypeSize,
    /// Ore found in the core.
    pub ore_block: BlockTypeSize,
    /// 0..1, scales tree and grass chances.
    pub vegetation_density: f32,
    /// 0..1 chance of ore veins.
    pub ore_chance: f32,
    /// Liquid used for ponds.
    pub water_block: BlockTypeSize,
    /// Shallowest pond depth.
    pub min_water_depth: i32,
    /// Deepest pond depth.
    pub max_water_depth: i32,
}

#[allow(clippy::too_many_arguments)]
const fn palette(
    surface: BlockType,
    subsurface: BlockType,
    deep: BlockType,
    ore: BlockType,
    vegetation_density: f32,
    ore_chance: f32,
    water: BlockType,
    water_depth: (i32, i32),
) -> BiomePalette {
    BiomePalette {
        surface_block: surface.id(),
        subsurface_block: subsurface.id(),
        deep_block: deep.id(),
        ore_block: ore.id(),
        vegetation_density,
        ore_chance,
        water_block: water.id(),
        min_water_depth: water_depth.0,
        max_water_depth: water_depth.1,
    }
}

/// Palettes indexed by `BiomeType as usize`.
static PALETTES: [BiomePalette; BiomeType::COUNT] = [
    palette(BlockType::DIRT, BlockType::DIRT, BlockType::STONE, BlockType::COAL, 0.08, 0.3, BlockType::WATER, (2, 6)),
    palette(BlockType::MOSS, BlockType::DIRT, BlockType::GRANITE, BlockType::EMERALD, 0.95, 0.2, BlockType::WATER, (3, 8)),
    palette(BlockType::SAND, BlockType::SANDSTONE, BlockType::LIMESTONE, BlockType::GOLD, 0.1, 0.4, BlockType::WATER, (1, 3)),
    palette(BlockType::SNOW, BlockType::PACKED_ICE, BlockType::MARBLE, BlockType::SAPPHIRE, 0.2, 0.35, BlockType::ICE, (2, 5)),
    palette(BlockType::LAVA_ROCK, BlockType::BASALT, BlockType::OBSIDIAN, BlockType::RUBY, 0.05, 0.7, BlockType::LAVA, (1, 4)),
    palette(BlockType::CRYSTAL_PURPLE, BlockType::QUARTZ, BlockType::AMETHYST, BlockType::DIAMOND, 0.3, 0.9, BlockType::WATER, (3, 10)),
    palette(BlockType::DIRT, BlockType::SAND, BlockType::CORAL, BlockType::COPPER, 0.8, 0.25, BlockType::WATER, (3, 12)),
    palette(BlockType::GRAVEL, BlockType::STONE, BlockType::GRANITE, BlockType::IRON, 0.0, 0.5, BlockType::WATER, (1, 3)),
];

/// The palette of a biome.
pub fn palette_for(biome: BiomeType) -> BiomePalette {
    PALETTES[biome as usize]
}

/// Picks the biome of an island spawned at `world_pos`.
///
/// Only x and z take part, so islands stacked vertically share a biome.
pub fn biome_for_position(world_pos: Point3<f32>, seed: u32) -> BiomeType {
    // float-to-int casts go through i64 so negative positions wrap instead of saturating
    let mut hash = seed;
    hash ^= (world_pos.x * 374_761_393.0) as i64 as u32;
    hash ^= (world_pos.z * 668_265_263.0) as i64 as u32;
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(1_103_515_245);
    hash ^= hash >> 16;

    let roll = (hash & 0xFFFF) as f32 / 65535.0;
    match roll {
        r if r < 0.05 => BiomeType::CRYSTAL,
        r if r < 0.15 => BiomeType::VOLCANIC,
        r if r < 0.25 => BiomeType::SNOW,
        r if r < 0.35 => BiomeType::DESERT,
        r if r < 0.50 => BiomeType::TROPICAL,
        r if r < 0.60 => BiomeType::BARREN,
        r if r < 0.80 => BiomeType::FOREST,
        _ => BiomeType::GRASSLAND,
    }
}

/// Shorthand for `palette_for(biome_for_position(..))`.
pub fn palette_for_position(world_pos: Point3<f32>, seed: u32) -> BiomePalette {
    palette_for(biome_for_position(world_pos, seed))
}
