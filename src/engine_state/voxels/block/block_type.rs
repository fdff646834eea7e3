//! # Block Type Module
//!
//! The catalogue of block types that can occupy a voxel. A voxel stores the
//! raw `BlockTypeSize` id; `BlockType` is the named view of that id used by
//! generators and palettes.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates every named block type.
///
/// Discriminants are the on-wire voxel ids and must never be renumbered.
/// Ids 1..=45 are terrain and material blocks; ids from 100 up are
/// placeable objects and decorations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
#[allow(missing_docs, non_camel_case_types)]
pub enum BlockType {
    AIR = 0,

    // Basic terrain
    STONE = 1,
    DIRT = 2,
    GRAVEL = 3,
    CLAY = 4,
    MOSS = 5,
    SAND = 6,

    // Wood and foliage
    WOOD_OAK = 7,
    WOOD_BIRCH = 8,
    WOOD_PINE = 9,
    WOOD_JUNGLE = 10,
    WOOD_PALM = 11,
    LEAVES_GREEN = 12,
    LEAVES_DARK = 13,
    LEAVES_PALM = 14,

    // Cold
    ICE = 15,
    PACKED_ICE = 16,
    SNOW = 17,

    // Stone variants
    SANDSTONE = 18,
    GRANITE = 19,
    BASALT = 20,
    LIMESTONE = 21,
    MARBLE = 22,
    OBSIDIAN = 23,

    // Volcanic
    LAVA_ROCK = 24,
    VOLCANIC_ASH = 25,
    MAGMA = 26,
    LAVA = 27,

    // Ores
    COAL = 28,
    IRON = 29,
    COPPER = 30,
    GOLD = 31,
    DIAMOND = 32,
    EMERALD = 33,
    RUBY = 34,
    SAPPHIRE = 35,
    AMETHYST = 36,

    // Crystals
    QUARTZ = 37,
    CRYSTAL_BLUE = 38,
    CRYSTAL_GREEN = 39,
    CRYSTAL_PURPLE = 40,
    CRYSTAL_PINK = 41,

    // Misc
    SALT = 42,
    MUSHROOM = 43,
    CORAL = 44,
    WATER = 45,

    // Objects
    LAMP = 100,
    ROCK = 101,
    DECOR_GRASS = 102,
    QUANTUM_FIELD_GENERATOR = 103,
}

impl BlockType {
    /// Converts a raw voxel id into a `BlockType`.
    ///
    /// # Arguments
    /// * `btype` - The block type as a `BlockTypeSize`
    ///
    /// # Returns
    /// The named type, or `None` for ids that have no catalogue entry
    pub fn from_id(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// The raw voxel id of this type.
    pub const fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }
}
