//! Whole-terrain generation: plan chunks, sample and mesh each one, pack the result.

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, trace};

use crate::{
    chunk::sample_chunk,
    config::TerrainConfig,
    density::DensitySampler,
    error::{Result, TerrainError},
    grid::{ChunkGrid, ChunkPlan},
    mesh::{MeshBuffers, MeshExtractor},
    noise::{NoiseField, PerlinField},
    pack::{OutputBlock, pack},
    tables::validate_tables,
    types::Value,
};

/// Generates terrain with the default tuning and a Perlin field seeded with `0`.
///
/// `level_count` gives `2^level_count` chunks per side; `max_segment` is the
/// number of cubes along each axis of every chunk.
pub fn generate_terrain(size: Value, level_count: i32, max_segment: i32) -> Result<OutputBlock> {
    let config = TerrainConfig::default();
    let noise = PerlinField::new(config.seed);
    generate_terrain_with(size, level_count, max_segment, &config, &noise)
}

/// Generates terrain with explicit tuning over any [`NoiseField`].
pub fn generate_terrain_with(
    size: Value,
    level_count: i32,
    max_segment: i32,
    config: &TerrainConfig,
    noise: &dyn NoiseField,
) -> Result<OutputBlock> {
    let mesh = build_mesh(size, level_count, max_segment, config, noise)?;
    pack(&mesh.vertices, &mesh.indices)
}

/// Builds the welded mesh for every chunk, before packing.
///
/// With [`TerrainConfig::parallel`] set, chunks are meshed on the Rayon pool into
/// their own buffers and merged in plan order, which reproduces the sequential
/// output exactly.
///
/// ```text
/// ChunkGrid::chunks  →  per chunk: sample_chunk → MeshExtractor::extract
///                    →  MeshBuffers (shared running vertex index)
/// ```
pub fn build_mesh(
    size: Value,
    level_count: i32,
    max_segment: i32,
    config: &TerrainConfig,
    noise: &dyn NoiseField,
) -> Result<MeshBuffers> {
    validate_tables()?;
    let segment = usize::try_from(max_segment)
        .ok()
        .filter(|&segment| segment >= 1)
        .ok_or_else(|| TerrainError::invalid_config("max_segment", max_segment))?;
    let grid = ChunkGrid::new(size, level_count)?;

    debug!(
        chunks = grid.len(),
        chunk_size = grid.chunk_size,
        segment,
        parallel = config.parallel,
        "generating terrain"
    );

    let sampler = DensitySampler::new(&config.density, noise);
    let extractor = MeshExtractor::new(sampler.config().iso_level);

    let mesh = if config.parallel {
        let chunks: Vec<ChunkPlan> = grid.chunks().collect();
        let parts = chunks
            .into_par_iter()
            .map(|chunk| {
                let mut part = MeshBuffers::new_empty();
                mesh_chunk(&chunk, segment, &sampler, &extractor, &mut part)?;
                Ok(part)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut mesh = MeshBuffers::new_empty();
        for part in parts {
            mesh.append(part)?;
        }
        mesh
    } else {
        let mut mesh = MeshBuffers::new_empty();
        for chunk in grid.chunks() {
            mesh_chunk(&chunk, segment, &sampler, &extractor, &mut mesh)?;
        }
        mesh
    };

    info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "terrain generated"
    );
    Ok(mesh)
}

fn mesh_chunk(
    chunk: &ChunkPlan,
    segment: usize,
    sampler: &DensitySampler,
    extractor: &MeshExtractor,
    mesh: &mut MeshBuffers,
) -> Result<()> {
    let lattice = sample_chunk(chunk.origin, chunk.size, segment, sampler)?;
    let (vertices, indices) = (mesh.vertices.len(), mesh.indices.len());
    extractor.extract(&lattice, mesh)?;
    trace!(
        coord = ?chunk.coord,
        vertices = mesh.vertices.len() - vertices,
        triangles = (mesh.indices.len() - indices) / 3,
        "chunk meshed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn rejects_bad_sizing_before_sampling() {
        let config = TerrainConfig::default();
        let panicking = |_: Point| -> Value { panic!("sampled despite invalid configuration") };

        for (level_count, max_segment) in [(0, 0), (0, -3), (-1, 4)] {
            let result = build_mesh(64., level_count, max_segment, &config, &panicking);
            assert!(
                matches!(result, Err(TerrainError::InvalidConfig { .. })),
                "({level_count}, {max_segment}) accepted"
            );
        }
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let noise = PerlinField::new(11);
        let parallel = TerrainConfig::default();
        let sequential = parallel.with_parallel(false);

        let a = build_mesh(128., 2, 6, &parallel, &noise).unwrap();
        let b = build_mesh(128., 2, 6, &sequential, &noise).unwrap();
        assert_eq!(a, b);
    }
}
