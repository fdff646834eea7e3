//! Procedural island content.
//!
//! - [`organic`]: the three-pass island generator, implemented on `IslandWorld`
//! - [`biome`]: biome selection and block palettes
//! - [`noise`]: the scalar field that roughens island shapes
//! - [`tree`]: tree stamps used by the decoration pass

pub mod biome;
pub mod noise;
pub mod organic;
pub mod tree;

pub use biome::{biome_for_position, palette_for, palette_for_position, BiomePalette, BiomeType};
pub use noise::{FbmNoise, NoiseSampler};
pub use organic::GenerationReport;
pub use tree::{stamp_tree, TreeKind};
