//! # Island Voxel Model
//!
//! The spatial world of the engine: floating islands built from voxels.
//!
//! ## Architecture
//!
//! * **Block**: block ids, their properties, and face directions
//! * **Chunk**: fixed 16³ voxel grids with their meshes
//! * **Island**: a rigid body made of chunks, with its local/world transform
//! * **World**: the registry of islands and the entry point for every edit
//! * **Connectivity**: split detection and fragment extraction after edits
//! * **Generation**: organic island shapes, biomes and trees
//! * **Tasks**: island generation on worker threads
//!
//! ## Data Flow
//!
//! 1. `IslandWorld` receives a read or write for `(island, position)`
//! 2. It resolves the island, then the chunk, creating the chunk on demand
//! 3. Client-side writes mark chunks dirty and queue them for meshing
//! 4. Breaking a voxel may split the island; the fragment becomes a new island
//!
//! ## Thread Safety
//!
//! Registry, islands and chunks are each behind their own `MtResource`. Locks
//! are taken registry first, then island, then chunk, and handles can be held
//! across lock releases.

pub mod block;
pub mod chunk;
pub mod connectivity;
pub mod generation;
pub mod island;
pub mod tasks;
pub mod world;
