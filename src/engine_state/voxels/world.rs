//! # World Module
//!
//! This module provides [`IslandWorld`], the registry that owns every island
//! and is the single entry point for voxel reads and writes, island
//! lifecycle, and per-tick physics.
//!
//! ## Architecture
//!
//! All state sits behind one coarse lock (`MtResource<WorldState>`) holding
//! the `IslandId -> Island` map, the id counter and the queue of chunks that
//! need remeshing. Islands and chunks are themselves `MtResource`s, so a
//! lookup clones a handle and releases the registry lock before any voxel
//! work happens. Locks are always taken in the order registry, island, chunk,
//! and the registry lock is never held while waiting on an island.
//!
//! `IslandWorld` is a cheap handle: clones share the same world, which is how
//! worker tasks reach it.
//!
//! ## Write Paths
//!
//! - [`IslandWorld::set_voxel`] is the client path: the chunk is marked dirty
//!   and queued for a mesh rebuild, together with any neighbouring chunk that
//!   shares the edited face.
//! - [`IslandWorld::set_voxel_data_only`] is the server path: only the voxel
//!   array changes.
//!
//! ## Performance Considerations
//!
//! - Island and chunk lookup is O(1) using hash maps
//! - Physics integration is a single pass under one registry read lock
//! - Stationary islands are skipped by comparing squared speeds to an epsilon

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use cgmath::{EuclideanSpace, Point3, Vector3};
use log::{debug, info, warn};

use super::block::{BlockTypeSize, AIR};
use super::chunk::{Chunk, CHUNK_DIMENSION};
use super::island::{chunk_coord, chunk_origin, local_coord, Island, IslandId, VoxelCoord};
use crate::config::EngineConfig;
use crate::core::MtResource;
use crate::engine_state::rendering::{
    meshing::mesh::{ChunkMesh, RayHit},
    NoopRenderHooks, RenderHooks,
};
use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::error::EngineError;

/// A chunk addressed across the whole world.
pub type ChunkKey = (IslandId, Point3<i32>);

/// State guarded by the registry lock.
struct WorldState {
    islands: HashMap<IslandId, MtResource<Island>>,
    next_island_id: IslandId,
    dirty_queue: VecDeque<ChunkKey>,
    dirty_set: HashSet<ChunkKey>,
}

impl WorldState {
    /// Next free automatic id. Ids in use are skipped and the counter wraps
    /// back to 1 when exhausted, so 0 is never handed out.
    fn allocate_id(&mut self) -> IslandId {
        let start = self.next_island_id;
        let mut id = start;
        while self.islands.contains_key(&id) {
            id = id.checked_add(1).unwrap_or(1);
            if id == start {
                warn!("Every island id is in use; replacing island {id}");
                break;
            }
        }

        self.next_island_id = match id.checked_add(1) {
            Some(next) => next,
            None => {
                warn!("Island id counter exhausted; wrapping to 1");
                1
            }
        };
        id
    }
}

/// A ray hit resolved to an island and a chunk, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRayHit {
    /// Island that was hit.
    pub island_id: IslandId,
    /// Chunk whose collision mesh produced the hit.
    pub chunk: Point3<i32>,
    /// Hit point and normal in world space.
    pub hit: RayHit,
}

/// The registry of all floating islands.
#[derive(Clone)]
pub struct IslandWorld {
    state: MtResource<WorldState>,
    config: Arc<EngineConfig>,
    hooks: Arc<dyn RenderHooks>,
}

impl IslandWorld {
    /// Creates an empty world with no renderer attached.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_render_hooks(config, Arc::new(NoopRenderHooks))
    }

    /// Creates an empty world that reports chunk lifecycle to `hooks`.
    ///
    /// # Arguments
    /// * `config` - Engine configuration; `is_client` selects whether hooks fire
    /// * `hooks` - Renderer callbacks
    pub fn with_render_hooks(config: EngineConfig, hooks: Arc<dyn RenderHooks>) -> Self {
        IslandWorld {
            state: MtResource::new(WorldState {
                islands: HashMap::new(),
                next_island_id: 1,
                dirty_queue: VecDeque::new(),
                dirty_set: HashSet::new(),
            }),
            config: Arc::new(config),
            hooks,
        }
    }

    /// The configuration this world was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether this world renders (client) or only simulates (server).
    pub fn is_client(&self) -> bool {
        self.config.is_client
    }

    /// The renderer callbacks.
    pub fn render_hooks(&self) -> &Arc<dyn RenderHooks> {
        &self.hooks
    }

    /// Creates an island at a world-space center with the next free id.
    pub fn create_island(&self, center: Point3<f32>) -> IslandId {
        self.create_island_with_id(center, 0)
    }

    /// Creates an island, optionally with an id assigned elsewhere.
    ///
    /// A forced id moves the counter past it so locally assigned ids never
    /// collide with it. If an island with that id already exists, it is
    /// replaced.
    ///
    /// # Arguments
    /// * `center` - World-space position of the new island's origin
    /// * `forced_id` - Id to use, or `0` to assign one
    ///
    /// # Returns
    /// The id of the new island
    pub fn create_island_with_id(&self, center: Point3<f32>, forced_id: IslandId) -> IslandId {
        let mut island_temp = None;
        let mut state = self.state.get_mut();

        let id = if forced_id != 0 {
            if forced_id >= state.next_island_id {
                match forced_id.checked_add(1) {
                    Some(next) => state.next_island_id = next,
                    None => warn!(
                        "Forced island id {forced_id} is the last one; keeping counter at {}",
                        state.next_island_id
                    ),
                }
            }
            forced_id
        } else {
            state.allocate_id()
        };

        let mut island = Island::new(id, center);
        if self.config.physics.initial_drift {
            island.velocity = drift_velocity(center);
        }

        if let Some(previous) = state.islands.insert(id, MtResource::new(island)) {
            warn!("Island {id} already existed and was replaced");
            island_temp = Some(previous);
        }
        drop(state);

        if let Some(previous) = island_temp {
            self.unregister_island_chunks(id, &previous);
        }

        info!("Created island {id} at ({:.1}, {:.1}, {:.1})", center.x, center.y, center.z);
        id
    }

    /// Removes an island and every chunk it owns.
    ///
    /// Handles to the island or its chunks held elsewhere stay valid; the
    /// data is freed when the last handle is dropped.
    ///
    /// # Returns
    /// `true` if the island existed
    pub fn destroy_island(&self, id: IslandId) -> bool {
        let removed = {
            let mut state = self.state.get_mut();
            let removed = state.islands.remove(&id);
            if removed.is_some() {
                state.dirty_queue.retain(|(island_id, _)| *island_id != id);
                state.dirty_set.retain(|(island_id, _)| *island_id != id);
            }
            removed
        };

        match removed {
            Some(island) => {
                self.unregister_island_chunks(id, &island);
                info!("Destroyed island {id}");
                true
            }
            None => false,
        }
    }

    fn unregister_island_chunks(&self, id: IslandId, island: &MtResource<Island>) {
        if !self.is_client() {
            return;
        }
        for coord in island.get().chunks.keys() {
            self.hooks.unregister_chunk(id, *coord);
        }
    }

    /// Handle to an island, if it exists.
    pub fn get_island(&self, id: IslandId) -> Option<MtResource<Island>> {
        self.state.get().islands.get(&id).cloned()
    }

    /// Ids of all live islands, ascending.
    pub fn island_ids(&self) -> Vec<IslandId> {
        let mut ids: Vec<_> = self.state.get().islands.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of live islands.
    pub fn island_count(&self) -> usize {
        self.state.get().islands.len()
    }

    /// World-space center of an island.
    pub fn island_center(&self, id: IslandId) -> Option<Point3<f32>> {
        self.get_island(id).map(|island| island.get().physics_center)
    }

    /// Linear velocity of an island.
    pub fn island_velocity(&self, id: IslandId) -> Option<Vector3<f32>> {
        self.get_island(id).map(|island| island.get().velocity)
    }

    /// Overrides an island's linear velocity.
    ///
    /// # Returns
    /// `false` if the island does not exist
    pub fn set_island_velocity(&self, id: IslandId, velocity: Vector3<f32>) -> bool {
        match self.get_island(id) {
            Some(island) => {
                island.get_mut().velocity = velocity;
                true
            }
            None => false,
        }
    }

    /// Handle to a chunk of an island.
    pub fn get_chunk(&self, id: IslandId, coord: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.get_island(id)?.get().get_chunk(coord)
    }

    /// Adds an empty chunk to an island (no-op if it already exists).
    ///
    /// # Returns
    /// The chunk handle, or `None` if the island does not exist
    pub fn add_chunk(&self, id: IslandId, coord: Point3<i32>) -> Option<MtResource<Chunk>> {
        let island = self.get_island(id)?;
        let (chunk, created) = island.get_mut().ensure_chunk(coord);
        if created && self.is_client() {
            self.hooks.register_chunk(id, coord);
        }
        Some(chunk)
    }

    /// Removes a chunk from an island.
    ///
    /// # Returns
    /// `true` if the chunk existed
    pub fn remove_chunk(&self, id: IslandId, coord: Point3<i32>) -> bool {
        let Some(island) = self.get_island(id) else {
            return false;
        };
        let removed = island.get_mut().chunks.remove(&coord).is_some();
        if removed {
            let mut state = self.state.get_mut();
            state.dirty_set.remove(&(id, coord));
            state.dirty_queue.retain(|key| *key != (id, coord));
            drop(state);
            if self.is_client() {
                self.hooks.unregister_chunk(id, coord);
            }
        }
        removed
    }

    /// Every chunk of every island, islands in ascending id order.
    pub fn all_chunks(&self) -> Vec<(IslandId, MtResource<Chunk>)> {
        let mut out = Vec::new();
        for id in self.island_ids() {
            if let Some(island) = self.get_island(id) {
                let island = island.get();
                let mut coords: Vec<_> = island.chunks.keys().copied().collect();
                coords.sort_by_key(|c| (c.x, c.y, c.z));
                out.extend(coords.into_iter().map(|c| (id, island.chunks[&c].clone())));
            }
        }
        out
    }

    /// Reads a voxel; air if the island or chunk does not exist.
    pub fn get_voxel(&self, id: IslandId, pos: impl VoxelCoord) -> BlockTypeSize {
        match self.get_island(id) {
            Some(island) => island.get().get_voxel(pos),
            None => AIR,
        }
    }

    /// Client-side voxel write.
    ///
    /// Creates the chunk if needed (clearing never creates one), marks it
    /// dirty and queues it for a mesh rebuild. Edits on a chunk face also
    /// queue the chunk across that face, whose border faces may have changed.
    ///
    /// # Returns
    /// `true` if the stored value changed
    pub fn set_voxel(&self, id: IslandId, pos: impl VoxelCoord, block_type: BlockTypeSize) -> bool {
        let Some(island) = self.get_island(id) else {
            return false;
        };
        let write = island.get_mut().set_voxel(pos, block_type);
        if write.created_chunk && self.is_client() {
            self.hooks.register_chunk(id, write.chunk);
        }
        if !write.changed {
            return false;
        }

        let mut affected = vec![write.chunk];
        let local = local_coord(pos);
        let last = CHUNK_DIMENSION - 1;
        for side in BlockSide::all() {
            let step = side.offset();
            let on_face = (step.x == 1 && local.x == last)
                || (step.x == -1 && local.x == 0)
                || (step.y == 1 && local.y == last)
                || (step.y == -1 && local.y == 0)
                || (step.z == 1 && local.z == last)
                || (step.z == -1 && local.z == 0);
            if on_face {
                affected.push(write.chunk + step);
            }
        }

        let island = island.get();
        let existing: Vec<_> = affected
            .into_iter()
            .filter(|coord| match island.get_chunk(*coord) {
                Some(chunk) => {
                    chunk.get_mut().mark_dirty();
                    true
                }
                None => false,
            })
            .collect();
        drop(island);

        self.enqueue_dirty(id, existing);
        true
    }

    /// Server-side voxel write: stores the value and nothing else.
    ///
    /// # Returns
    /// `true` if the stored value changed
    pub fn set_voxel_data_only(
        &self,
        id: IslandId,
        pos: impl VoxelCoord,
        block_type: BlockTypeSize,
    ) -> bool {
        match self.get_island(id) {
            Some(island) => island.get_mut().set_voxel_data_only(pos, block_type).changed,
            None => false,
        }
    }

    /// Installs a chunk received over the wire.
    ///
    /// # Returns
    /// `Ok(false)` if the island does not exist, `Ok(true)` once loaded
    ///
    /// # Errors
    /// `EngineError::InvalidChunkPayload` for a payload of the wrong size;
    /// nothing is created or changed in that case
    pub fn load_chunk_bytes(
        &self,
        id: IslandId,
        coord: Point3<i32>,
        bytes: &[u8],
    ) -> Result<bool, EngineError> {
        let Some(island) = self.get_island(id) else {
            return Ok(false);
        };

        let mut staged = Chunk::new(coord);
        staged.load_raw_bytes(bytes)?;

        let (chunk, created) = island.get_mut().ensure_chunk(coord);
        chunk.get_mut().load_raw_bytes(staged.raw_bytes())?;
        if created && self.is_client() {
            self.hooks.register_chunk(id, coord);
        }
        self.enqueue_dirty(id, [coord]);
        self.regenerate_neighbor_chunk_meshes(id, coord);
        Ok(true)
    }

    /// Queues the existing face neighbours of a chunk for remeshing.
    pub fn regenerate_neighbor_chunk_meshes(&self, id: IslandId, coord: Point3<i32>) {
        let Some(island) = self.get_island(id) else {
            return;
        };
        let mut queued = Vec::new();
        for (side, neighbour) in BlockSide::all().into_iter().zip(island.get().neighbour_chunks(coord)) {
            if let Some(chunk) = neighbour {
                chunk.get_mut().mark_dirty();
                queued.push(coord + side.offset());
            }
        }
        self.enqueue_dirty(id, queued);
    }

    /// Marks chunks dirty and queues them for remeshing.
    pub fn mark_chunks_dirty(&self, id: IslandId, coords: impl IntoIterator<Item = Point3<i32>>) {
        let Some(island) = self.get_island(id) else {
            return;
        };
        let coords: Vec<_> = {
            let island = island.get();
            coords
                .into_iter()
                .filter(|coord| match island.get_chunk(*coord) {
                    Some(chunk) => {
                        chunk.get_mut().mark_dirty();
                        true
                    }
                    None => false,
                })
                .collect()
        };
        self.enqueue_dirty(id, coords);
    }

    fn enqueue_dirty(&self, id: IslandId, coords: impl IntoIterator<Item = Point3<i32>>) {
        let mut state = self.state.get_mut();
        for coord in coords {
            if state.dirty_set.insert((id, coord)) {
                state.dirty_queue.push_back((id, coord));
            }
        }
    }

    /// Drains the queue of chunks waiting for a mesh rebuild, oldest first.
    pub fn take_dirty_chunks(&self) -> Vec<ChunkKey> {
        let mut state = self.state.get_mut();
        state.dirty_set.clear();
        state.dirty_queue.drain(..).collect()
    }

    /// Installs a finished mesh into its chunk and notifies the renderer.
    ///
    /// # Arguments
    /// * `key` - Island and chunk the mesh was built for
    /// * `mesh` - The new mesh
    /// * `built_from` - Chunk revision the mesh was built from
    ///
    /// # Returns
    /// `true` if the chunk is still stale and should be rebuilt again
    pub fn install_mesh(&self, key: ChunkKey, mesh: Arc<ChunkMesh>, built_from: u64) -> bool {
        let (id, coord) = key;
        let Some(chunk) = self.get_chunk(id, coord) else {
            debug!("Dropping mesh for vanished chunk {coord:?} of island {id}");
            return false;
        };
        let clean = chunk.get_mut().swap_mesh(mesh.clone(), built_from);
        if self.is_client() {
            self.hooks.upload_mesh(id, coord, &mesh);
        }
        !clean
    }

    /// Advances every moving island by `dt` seconds.
    ///
    /// Runs as a single pass under one registry lock acquisition. Islands
    /// whose linear and angular speeds are below the configured epsilon are
    /// left untouched, and only islands that moved raise
    /// `needs_physics_update`.
    ///
    /// # Returns
    /// The number of islands that moved
    pub fn integrate_physics(&self, dt: f32) -> usize {
        let epsilon = self.config.physics.motion_epsilon;
        let state = self.state.get();
        state
            .islands
            .values()
            .filter(|island| island.get_mut().integrate(dt, epsilon))
            .count()
    }

    /// Casts a world-space ray against the collision meshes of every island.
    ///
    /// # Arguments
    /// * `origin` - Ray start in world space
    /// * `direction` - Ray direction in world space
    /// * `max_distance` - Upper bound on the ray parameter
    ///
    /// # Returns
    /// The nearest hit across all islands
    pub fn raycast(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<WorldRayHit> {
        let mut best: Option<WorldRayHit> = None;

        for id in self.island_ids() {
            let Some(island) = self.get_island(id) else {
                continue;
            };
            let island = island.get();
            let local_origin = island.world_to_local(origin);
            let local_direction = island.world_dir_to_local(direction);

            for (coord, chunk) in &island.chunks {
                let limit = best.map_or(max_distance, |b| b.hit.distance);
                let offset = chunk_origin(*coord).to_vec();
                if let Some(hit) = chunk.get().check_ray_collision(local_origin - offset, local_direction, limit) {
                    let island_point = hit.point + offset;
                    best = Some(WorldRayHit {
                        island_id: id,
                        chunk: *coord,
                        hit: RayHit {
                            point: island.local_to_world(island_point),
                            normal: island.local_dir_to_world(hit.normal),
                            distance: hit.distance,
                        },
                    });
                }
            }
        }

        best
    }

    /// Approximate memory held by all islands.
    pub fn total_memory_usage(&self) -> usize {
        self.island_ids()
            .into_iter()
            .filter_map(|id| self.get_island(id))
            .map(|island| island.get().memory_usage())
            .sum()
    }

    /// Chunk coordinate for an island-relative position; exposed for callers
    /// that only hold a world handle.
    pub fn chunk_coord_of(pos: impl VoxelCoord) -> Point3<i32> {
        chunk_coord(pos)
    }
}

/// Small deterministic drift derived from an island's spawn position, so
/// freshly spawned islands bob apart instead of sitting perfectly still.
fn drift_velocity(center: Point3<f32>) -> Vector3<f32> {
    let hash = |value: f32, prime: f32| ((value * prime) as i64).unsigned_abs();
    let seed = hash(center.x, 73_856_093.0)
        ^ hash(center.y, 19_349_663.0)
        ^ hash(center.z, 83_492_791.0);

    let mut rng = fastrand::Rng::with_seed(seed);
    let x = rng.f32() - 0.5;
    let y = (rng.f32() - 0.5) * 0.3;
    let z = rng.f32() - 0.5;
    Vector3::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHooks {
        registered: Mutex<Vec<ChunkKey>>,
        unregistered: Mutex<Vec<ChunkKey>>,
        uploads: Mutex<Vec<ChunkKey>>,
    }

    impl RenderHooks for RecordingHooks {
        fn register_chunk(&self, island_id: IslandId, chunk: Point3<i32>) {
            self.registered.lock().unwrap().push((island_id, chunk));
        }
        fn unregister_chunk(&self, island_id: IslandId, chunk: Point3<i32>) {
            self.unregistered.lock().unwrap().push((island_id, chunk));
        }
        fn upload_mesh(&self, island_id: IslandId, chunk: Point3<i32>, _mesh: &Arc<ChunkMesh>) {
            self.uploads.lock().unwrap().push((island_id, chunk));
        }
    }

    fn still_world() -> IslandWorld {
        let mut config = EngineConfig::default();
        config.physics.initial_drift = false;
        IslandWorld::new(config)
    }

    #[test]
    fn test_forced_last_id_does_not_overflow_counter() {
        let world = still_world();
        assert_eq!(world.create_island_with_id(Point3::new(0.0, 0.0, 0.0), IslandId::MAX), IslandId::MAX);
        assert_eq!(world.create_island(Point3::new(0.0, 0.0, 0.0)), 1);
        assert_eq!(world.create_island(Point3::new(0.0, 0.0, 0.0)), 2);
    }

    #[test]
    fn test_exhausted_counter_wraps_past_ids_in_use() {
        let world = still_world();
        world.create_island_with_id(Point3::new(0.0, 0.0, 0.0), IslandId::MAX);
        world.create_island(Point3::new(0.0, 0.0, 0.0));
        world.state.get_mut().next_island_id = IslandId::MAX;

        // MAX and 1 are taken, so allocation wraps and skips both
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        assert_eq!(id, 2);
        assert_eq!(world.island_count(), 3);
        assert_eq!(world.create_island(Point3::new(0.0, 0.0, 0.0)), 3);
    }

    #[test]
    fn test_ids_are_monotonic_and_never_zero() {
        let world = still_world();
        let a = world.create_island(Point3::new(0.0, 0.0, 0.0));
        let b = world.create_island(Point3::new(10.0, 0.0, 0.0));
        assert_eq!((a, b), (1, 2));

        assert!(world.destroy_island(a));
        let c = world.create_island(Point3::new(0.0, 0.0, 0.0));
        assert_eq!(c, 3);
    }

    #[test]
    fn test_forced_id_advances_counter() {
        let world = still_world();
        assert_eq!(world.create_island_with_id(Point3::new(0.0, 0.0, 0.0), 40), 40);
        assert_eq!(world.create_island(Point3::new(0.0, 0.0, 0.0)), 41);
        assert_eq!(world.create_island_with_id(Point3::new(0.0, 0.0, 0.0), 7), 7);
        assert_eq!(world.create_island(Point3::new(0.0, 0.0, 0.0)), 42);
        assert_eq!(world.island_ids(), vec![7, 40, 41, 42]);
    }

    #[test]
    fn test_missing_island_is_absorbed() {
        let world = still_world();
        assert!(world.get_island(9).is_none());
        assert_eq!(world.get_voxel(9, Point3::new(0, 0, 0)), AIR);
        assert!(!world.set_voxel(9, Point3::new(0, 0, 0), 1));
        assert!(!world.set_voxel_data_only(9, Point3::new(0, 0, 0), 1));
        assert!(world.island_center(9).is_none());
        assert!(!world.destroy_island(9));
    }

    #[test]
    fn test_empty_read_does_not_allocate_chunk() {
        let world = still_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        assert_eq!(world.get_voxel(id, Point3::new(-1, 0, 0)), AIR);
        assert!(world.get_chunk(id, Point3::new(-1, 0, 0)).is_none());
        assert!(world.all_chunks().is_empty());
    }

    #[test]
    fn test_client_write_queues_chunk_and_face_neighbour() {
        let world = still_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        world.set_voxel_data_only(id, Point3::new(16, 0, 0), 1);
        world.take_dirty_chunks();

        assert!(world.set_voxel(id, Point3::new(15, 3, 3), 2));
        let dirty = world.take_dirty_chunks();
        assert_eq!(dirty, vec![(id, Point3::new(0, 0, 0)), (id, Point3::new(1, 0, 0))]);
        assert!(world.get_chunk(id, Point3::new(1, 0, 0)).unwrap().get().is_dirty());

        // repeated edits in the same chunk queue it once
        world.set_voxel(id, Point3::new(3, 3, 3), 2);
        world.set_voxel(id, Point3::new(4, 3, 3), 2);
        assert_eq!(world.take_dirty_chunks(), vec![(id, Point3::new(0, 0, 0))]);
    }

    #[test]
    fn test_server_write_leaves_mesh_state_alone() {
        let world = still_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        assert!(world.set_voxel_data_only(id, Point3::new(-3.2f32, 1.0, 0.5), 9));
        assert_eq!(world.get_voxel(id, Point3::new(-4, 1, 0)), 9);
        assert!(world.take_dirty_chunks().is_empty());
        assert!(!world.get_chunk(id, Point3::new(-1, 0, 0)).unwrap().get().is_dirty());
    }

    #[test]
    fn test_integrate_only_moves_moving_islands() {
        let world = still_world();
        let idle = world.create_island(Point3::new(0.0, 0.0, 0.0));
        let moving = world.create_island(Point3::new(0.0, 0.0, 0.0));
        world.get_island(idle).unwrap().get_mut().needs_physics_update = false;
        world.set_island_velocity(moving, Vector3::new(0.0, 2.0, 0.0));

        assert_eq!(world.integrate_physics(0.5), 1);
        assert_eq!(world.island_center(moving), Some(Point3::new(0.0, 1.0, 0.0)));
        assert_eq!(world.island_center(idle), Some(Point3::new(0.0, 0.0, 0.0)));
        assert!(!world.get_island(idle).unwrap().get().needs_physics_update);
    }

    #[test]
    fn test_drift_is_deterministic_and_bounded() {
        let world = IslandWorld::new(EngineConfig::default());
        let a = world.create_island(Point3::new(120.0, 4.0, -60.0));
        let b = world.create_island(Point3::new(120.0, 4.0, -60.0));
        let va = world.island_velocity(a).unwrap();
        assert_eq!(Some(va), world.island_velocity(b));
        assert!(va.x.abs() <= 0.5 && va.z.abs() <= 0.5 && va.y.abs() <= 0.15);
    }

    #[test]
    fn test_destroyed_island_handles_stay_valid() {
        let world = still_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        world.set_voxel_data_only(id, Point3::new(1, 1, 1), 5);
        let chunk = world.get_chunk(id, Point3::new(0, 0, 0)).unwrap();

        assert!(world.destroy_island(id));
        assert!(world.get_island(id).is_none());
        assert_eq!(chunk.get().get(1, 1, 1), 5);
    }

    #[test]
    fn test_hooks_follow_chunk_lifecycle() {
        let hooks = Arc::new(RecordingHooks::default());
        let mut config = EngineConfig::default();
        config.physics.initial_drift = false;
        let world = IslandWorld::with_render_hooks(config, hooks.clone());

        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        world.set_voxel(id, Point3::new(0, 0, 0), 1);
        world.set_voxel(id, Point3::new(-1, 0, 0), 1);
        world.install_mesh((id, Point3::new(0, 0, 0)), Arc::new(ChunkMesh::default()), 0);
        world.destroy_island(id);

        assert_eq!(hooks.registered.lock().unwrap().len(), 2);
        assert_eq!(hooks.unregistered.lock().unwrap().len(), 2);
        assert_eq!(*hooks.uploads.lock().unwrap(), vec![(id, Point3::new(0, 0, 0))]);
    }

    #[test]
    fn test_server_world_never_calls_hooks() {
        let hooks = Arc::new(RecordingHooks::default());
        let mut config = EngineConfig::default();
        config.is_client = false;
        let world = IslandWorld::with_render_hooks(config, hooks.clone());

        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        world.set_voxel(id, Point3::new(0, 0, 0), 1);
        world.destroy_island(id);
        assert!(hooks.registered.lock().unwrap().is_empty());
        assert!(hooks.unregistered.lock().unwrap().is_empty());
    }

    #[test]
    fn test_load_chunk_bytes_rejects_bad_payload_without_creating_chunk() {
        let world = still_world();
        let id = world.create_island(Point3::new(0.0, 0.0, 0.0));
        let err = world.load_chunk_bytes(id, Point3::new(0, 0, 0), &[1, 2, 3]);
        assert!(err.is_err());
        assert!(world.get_chunk(id, Point3::new(0, 0, 0)).is_none());

        let mut bytes = vec![0u8; 4096];
        bytes[0] = 7;
        assert!(world.load_chunk_bytes(id, Point3::new(0, 0, 0), &bytes).unwrap());
        assert_eq!(world.get_voxel(id, Point3::new(0, 0, 0)), 7);
        assert_eq!(world.take_dirty_chunks(), vec![(id, Point3::new(0, 0, 0))]);
    }

    #[test]
    fn test_raycast_respects_island_transform() {
        let world = still_world();
        let id = world.create_island(Point3::new(100.0, 0.0, 0.0));
        world.set_voxel(id, Point3::new(0, 0, 0), 1);

        let chunk = world.get_chunk(id, Point3::new(0, 0, 0)).unwrap();
        let snapshot = crate::engine_state::voxels::chunk::chunk_snapshot::ChunkSnapshot::capture(
            &chunk.get(),
            [None, None, None, None, None, None],
        );
        let revision = snapshot.revision;
        world.install_mesh((id, Point3::new(0, 0, 0)), Arc::new(ChunkMesh::build(&snapshot)), revision);

        let hit = world
            .raycast(Point3::new(100.5, 10.0, 0.5), Vector3::new(0.0, -1.0, 0.0), 100.0)
            .unwrap();
        assert_eq!(hit.island_id, id);
        assert!((hit.hit.point.y - 1.0).abs() < 1e-4);
        assert!((hit.hit.distance - 9.0).abs() < 1e-4);

        assert!(world
            .raycast(Point3::new(0.5, 10.0, 0.5), Vector3::new(0.0, -1.0, 0.0), 100.0)
            .is_none());
    }
}
