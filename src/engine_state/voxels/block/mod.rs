//! # Block Module
//!
//! Block ids, the faces of a block, and the static property table that the
//! mesher and the connectivity analyzer consult.

use phf::phf_map;

pub mod block_side;
pub mod block_type;

use block_type::BlockType;

/// The underlying integer type of a voxel. `0` is empty space.
pub type BlockTypeSize = u8;

/// The empty voxel.
pub const AIR: BlockTypeSize = BlockType::AIR.id();

/// How a block is drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderType {
    /// Drawn as unit cube faces by the chunk mesher.
    Voxel,
    /// Drawn as an instanced model; never occludes neighbouring faces.
    Model,
}

/// Static per-type properties.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockProperties {
    /// Human-readable name, used in logs.
    pub name: &'static str,
    /// Whether the block blocks movement.
    pub is_solid: bool,
    /// Whether the block flows (and is ignored for structural support).
    pub is_liquid: bool,
    /// Whether light and sight pass through.
    pub is_transparent: bool,
    /// Drawing strategy.
    pub render_type: RenderType,
}

const fn solid(name: &'static str) -> BlockProperties {
    BlockProperties {
        name,
        is_solid: true,
        is_liquid: false,
        is_transparent: false,
        render_type: RenderType::Voxel,
    }
}

const fn translucent(name: &'static str) -> BlockProperties {
    BlockProperties {
        is_transparent: true,
        ..solid(name)
    }
}

const fn liquid(name: &'static str) -> BlockProperties {
    BlockProperties {
        name,
        is_solid: false,
        is_liquid: true,
        is_transparent: true,
        render_type: RenderType::Voxel,
    }
}

const fn model(name: &'static str, is_solid: bool) -> BlockProperties {
    BlockProperties {
        name,
        is_solid,
        is_liquid: false,
        is_transparent: true,
        render_type: RenderType::Model,
    }
}

const UNKNOWN: BlockProperties = solid("unknown");

/// Properties of every catalogued block, keyed by voxel id.
///
/// Ids missing from this table are treated as plain solid cubes.
pub static BLOCK_PROPERTIES: phf::Map<u8, BlockProperties> = phf_map! {
    0u8 => BlockProperties {
        name: "air",
        is_solid: false,
        is_liquid: false,
        is_transparent: true,
        render_type: RenderType::Voxel,
    },
    1u8 => solid("stone"),
    2u8 => solid("dirt"),
    3u8 => solid("gravel"),
    4u8 => solid("clay"),
    5u8 => solid("moss"),
    6u8 => solid("sand"),
    7u8 => solid("oak wood"),
    8u8 => solid("birch wood"),
    9u8 => solid("pine wood"),
    10u8 => solid("jungle wood"),
    11u8 => solid("palm wood"),
    12u8 => translucent("green leaves"),
    13u8 => translucent("dark leaves"),
    14u8 => translucent("palm leaves"),
    15u8 => translucent("ice"),
    16u8 => solid("packed ice"),
    17u8 => solid("snow"),
    18u8 => solid("sandstone"),
    19u8 => solid("granite"),
    20u8 => solid("basalt"),
    21u8 => solid("limestone"),
    22u8 => solid("marble"),
    23u8 => solid("obsidian"),
    24u8 => solid("lava rock"),
    25u8 => solid("volcanic ash"),
    26u8 => solid("magma"),
    27u8 => liquid("lava"),
    28u8 => solid("coal ore"),
    29u8 => solid("iron ore"),
    30u8 => solid("copper ore"),
    31u8 => solid("gold ore"),
    32u8 => solid("diamond ore"),
    33u8 => solid("emerald ore"),
    34u8 => solid("ruby ore"),
    35u8 => solid("sapphire ore"),
    36u8 => solid("amethyst"),
    37u8 => translucent("quartz"),
    38u8 => translucent("blue crystal"),
    39u8 => translucent("green crystal"),
    40u8 => translucent("purple crystal"),
    41u8 => translucent("pink crystal"),
    42u8 => solid("salt"),
    43u8 => solid("mushroom"),
    44u8 => solid("coral"),
    45u8 => liquid("water"),
    100u8 => model("lamp", true),
    101u8 => model("rock", true),
    102u8 => model("grass", false),
    103u8 => model("quantum field generator", true),
};

impl BlockProperties {
    /// Looks up the properties of a voxel id.
    pub fn of(id: BlockTypeSize) -> &'static BlockProperties {
        BLOCK_PROPERTIES.get(&id).unwrap_or(&UNKNOWN)
    }
}

/// Whether a voxel holds up its neighbours for connectivity purposes.
///
/// Anything that is not air or water counts, including decorations, so a
/// tuft of grass stays attached to the block it grows on.
#[inline]
pub fn is_structural(id: BlockTypeSize) -> bool {
    id != AIR && id != BlockType::WATER.id()
}

/// Whether the mesher draws cube faces for this voxel.
#[inline]
pub fn emits_faces(id: BlockTypeSize) -> bool {
    id != AIR && BlockProperties::of(id).render_type == RenderType::Voxel
}

/// Whether a face next to a voxel of this type is visible.
///
/// Faces are exposed to empty cells and to decorative models that do not
/// fill their cell.
#[inline]
pub fn exposes_neighbour_face(id: BlockTypeSize) -> bool {
    if id == AIR {
        return true;
    }
    let properties = BlockProperties::of(id);
    properties.render_type == RenderType::Model && !properties.is_solid
}
