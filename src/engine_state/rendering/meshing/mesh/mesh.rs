//! Chunk meshes: render quads, the collision faces derived from them, and
//! the decorations drawn as models.

use cgmath::{Point3, Vector3};

use super::face::{CollisionFace, QuadFace, RayHit};
use crate::engine_state::voxels::{
    block::{
        block_side::BlockSide, emits_faces, exposes_neighbour_face, BlockProperties, BlockTypeSize,
        RenderType, AIR,
    },
    chunk::{chunk_snapshot::ChunkSnapshot, CHUNK_DIMENSION},
};

/// A decoration drawn as a model rather than as cube faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInstance {
    /// Block id of the decoration.
    pub block_type: BlockTypeSize,
    /// Centre of the bottom of its cell, chunk-local.
    pub position: Point3<f32>,
}

/// Faces kept for ray tests against a chunk.
#[derive(Debug, Clone, Default)]
pub struct CollisionMesh {
    /// One entry per render quad.
    pub faces: Vec<CollisionFace>,
}

impl CollisionMesh {
    /// Derives a collision mesh from render quads.
    pub fn from_quads(quads: &[QuadFace]) -> Self {
        CollisionMesh {
            faces: quads.iter().map(CollisionFace::from).collect(),
        }
    }

    /// Finds the nearest face hit by a ray within `max_distance`.
    ///
    /// # Arguments
    /// * `origin` - Ray start, chunk-local
    /// * `direction` - Ray direction, chunk-local; need not be normalised
    /// * `max_distance` - Upper bound on the ray parameter
    ///
    /// # Returns
    /// The closest hit, or `None`
    pub fn check_ray_collision(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit> {
        let mut closest: Option<RayHit> = None;
        let mut limit = max_distance;

        for face in &self.faces {
            if let Some(t) = face.intersect(origin, direction, limit) {
                limit = t;
                closest = Some(RayHit {
                    point: origin + direction * t,
                    normal: face.normal,
                    distance: t,
                });
            }
        }

        closest
    }
}

/// The immutable geometry built from one chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkMesh {
    /// Render quads, one per exposed unit face.
    pub quads: Vec<QuadFace>,
    /// Collision faces derived from `quads`.
    pub collision: CollisionMesh,
    /// Decorations to draw as models.
    pub model_instances: Vec<ModelInstance>,
}

impl ChunkMesh {
    /// Builds the mesh for a snapshot.
    ///
    /// For each voxel that renders as a cube, a face is emitted on every side
    /// whose neighbour (inside this chunk or across the border) is empty or a
    /// non-solid decoration.
    ///
    /// # Arguments
    /// * `snapshot` - Padded copy of the chunk and its neighbours' border cells
    ///
    /// # Returns
    /// The render quads, their collision mesh, and the model instances
    pub fn build(snapshot: &ChunkSnapshot) -> Self {
        let mut quads = Vec::new();
        let mut model_instances = Vec::new();

        for z in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    let voxel = snapshot.get(x, y, z);
                    if voxel == AIR {
                        continue;
                    }

                    if BlockProperties::of(voxel).render_type == RenderType::Model {
                        model_instances.push(ModelInstance {
                            block_type: voxel,
                            position: Point3::new(x as f32 + 0.5, y as f32, z as f32 + 0.5),
                        });
                        continue;
                    }

                    if !emits_faces(voxel) {
                        continue;
                    }

                    let position = Point3::new(x, y, z);
                    for side in BlockSide::all() {
                        let n = position + side.offset();
                        if exposes_neighbour_face(snapshot.get(n.x, n.y, n.z)) {
                            quads.push(QuadFace::new(position, side, voxel));
                        }
                    }
                }
            }
        }

        let collision = CollisionMesh::from_quads(&quads);
        ChunkMesh {
            quads,
            collision,
            model_instances,
        }
    }

    /// The quads as raw bytes, ready for a vertex buffer upload.
    pub fn quad_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.quads)
    }

    /// `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty() && self.model_instances.is_empty()
    }

    /// Approximate heap footprint.
    pub fn memory_usage(&self) -> usize {
        self.quads.capacity() * std::mem::size_of::<QuadFace>()
            + self.collision.faces.capacity() * std::mem::size_of::<CollisionFace>()
            + self.model_instances.capacity() * std::mem::size_of::<ModelInstance>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, chunk::Chunk};

    fn snapshot_of(chunk: &Chunk) -> ChunkSnapshot {
        ChunkSnapshot::capture(chunk, [None; 6])
    }

    #[test]
    fn test_single_voxel_has_six_faces() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set(3, 3, 3, BlockType::STONE.id());
        let mesh = ChunkMesh::build(&snapshot_of(&chunk));

        assert_eq!(mesh.quads.len(), 6);
        assert_eq!(mesh.collision.faces.len(), 6);
        let mut dirs: Vec<u8> = mesh.quads.iter().map(|q| q.face_dir).collect();
        dirs.sort();
        assert_eq!(dirs, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_adjacent_voxels_cull_shared_faces_without_merging() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set(3, 3, 3, BlockType::STONE.id());
        chunk.set(4, 3, 3, BlockType::DIRT.id());
        let mesh = ChunkMesh::build(&snapshot_of(&chunk));

        // 2 cubes * 6 faces - 2 hidden faces; the coplanar pairs stay separate quads
        assert_eq!(mesh.quads.len(), 10);
        assert!(mesh.quads.iter().all(|q| q.width == 1.0 && q.height == 1.0));
    }

    #[test]
    fn test_decorative_neighbour_exposes_face_and_becomes_instance() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set(3, 3, 3, BlockType::STONE.id());
        chunk.set(3, 4, 3, BlockType::DECOR_GRASS.id());
        let mesh = ChunkMesh::build(&snapshot_of(&chunk));

        assert_eq!(mesh.quads.len(), 6);
        assert_eq!(mesh.model_instances.len(), 1);
        assert_eq!(mesh.model_instances[0].position, Point3::new(3.5, 4.0, 3.5));
    }

    #[test]
    fn test_neighbour_chunk_hides_border_face() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set(15, 0, 0, BlockType::STONE.id());
        let mut right = Chunk::new(Point3::new(1, 0, 0));
        right.set(0, 0, 0, BlockType::STONE.id());

        let mut neighbours: [Option<&Chunk>; 6] = [None; 6];
        neighbours[BlockSide::RIGHT as usize] = Some(&right);
        let mesh = ChunkMesh::build(&ChunkSnapshot::capture(&chunk, neighbours));

        assert_eq!(mesh.quads.len(), 5);
        assert!(mesh
            .quads
            .iter()
            .all(|q| q.side() != Some(BlockSide::RIGHT)));
    }

    #[test]
    fn test_ray_hits_nearest_face() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set(0, 0, 0, BlockType::STONE.id());
        chunk.set(0, 5, 0, BlockType::STONE.id());
        let mesh = ChunkMesh::build(&snapshot_of(&chunk));

        let hit = mesh
            .collision
            .check_ray_collision(Point3::new(0.5, 10.0, 0.5), Vector3::new(0.0, -1.0, 0.0), 50.0)
            .unwrap();
        assert_eq!(hit.point, Point3::new(0.5, 6.0, 0.5));
        assert_eq!(hit.normal, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(hit.distance, 4.0);
    }

    #[test]
    fn test_quad_bytes_match_quad_count() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set(1, 1, 1, BlockType::STONE.id());
        let mesh = ChunkMesh::build(&snapshot_of(&chunk));
        assert_eq!(mesh.quad_bytes().len(), 6 * std::mem::size_of::<QuadFace>());
    }
}
