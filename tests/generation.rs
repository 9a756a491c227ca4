use std::collections::HashSet;

use bevy_marching_terrain::{
    DensityConfig, TerrainConfig, TerrainError,
    chunk::sample_chunk,
    density::{DensitySampler, PINNED_FLOOR_DENSITY},
    generate_terrain, generate_terrain_with,
    grid::ChunkGrid,
    noise::PerlinField,
    types::{Point, Value},
};

/// Saturated noise: the octave weights collapse, so density is dominated by
/// the height bias and every non-pinned layer above the floor lies inside.
fn saturated(_: Point) -> Value {
    1.0
}

fn assert_well_formed(vertex_float_count: u32, vertices: &[Value], indices: &[u32]) {
    assert_eq!(vertex_float_count as usize, vertices.len());
    assert_eq!(vertices.len() % 3, 0);
    assert_eq!(indices.len() % 3, 0);
    let vertex_count = vertices.len() / 3;
    assert!(indices.iter().all(|&i| (i as usize) < vertex_count));
}

#[test]
fn generation_is_deterministic() {
    let a = generate_terrain(96., 1, 8).unwrap();
    let b = generate_terrain(96., 1, 8).unwrap();

    let bits = |v: &[Value]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a.vertices), bits(&b.vertices));
    assert_eq!(a.indices, b.indices);
}

#[test]
fn perlin_terrain_is_well_formed() {
    for (size, level_count, max_segment) in [(64., 0, 4), (200., 2, 10), (33., 1, 3)] {
        let block = generate_terrain(size, level_count, max_segment).unwrap();
        assert_well_formed(block.vertex_float_count, &block.vertices, &block.indices);
        assert_eq!(block.index_count as usize, block.indices.len());
    }
}

#[test]
fn single_chunk_scenario() {
    let grid = ChunkGrid::new(64., 0).unwrap();
    let chunks: Vec<_> = grid.chunks().collect();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].size, 64.);

    let config = TerrainConfig::default();
    let sampler = DensitySampler::new(&config.density, &saturated);
    let lattice = sample_chunk(chunks[0].origin, chunks[0].size, 4, &sampler).unwrap();
    assert_eq!(lattice.as_slice().unwrap().len(), 5 * 5 * 5);
    for z in 0..5 {
        for x in 0..5 {
            assert_eq!(lattice.get(x, 0, z).w, PINNED_FLOOR_DENSITY);
        }
    }

    let block = generate_terrain_with(64., 0, 4, &config, &saturated).unwrap();
    assert_well_formed(block.vertex_float_count, &block.vertices, &block.indices);
    assert!(block.index_count >= 3, "expected at least one triangle");

    let perlin = generate_terrain(64., 0, 4).unwrap();
    assert_well_formed(perlin.vertex_float_count, &perlin.vertices, &perlin.indices);
    assert!(perlin.index_count >= 3, "default field produced an empty mesh");
}

#[test]
fn bottom_layer_is_pinned_in_every_chunk() {
    let config = DensityConfig::default();
    let noise = PerlinField::new(5);
    let sampler = DensitySampler::new(&config, &noise);

    for chunk in ChunkGrid::new(80., 2).unwrap().chunks() {
        let lattice = sample_chunk(chunk.origin, chunk.size, 3, &sampler).unwrap();
        for z in 0..4 {
            for x in 0..4 {
                assert_eq!(lattice.get(x, 0, z).w, PINNED_FLOOR_DENSITY);
            }
        }
    }
}

#[test]
fn heavy_hard_floor_pushes_low_samples_outside() {
    let config = DensityConfig::default().with_hard_floor_weight(1e6);
    let noise = PerlinField::new(9);
    let sampler = DensitySampler::new(&config, &noise);

    // Unit spacing puts lattice layers at y = 0, 1, 2, 3, 4.
    let lattice = sample_chunk(Point::new(-2., 0., -2.), 4., 4, &sampler).unwrap();
    let low: Vec<_> = lattice
        .as_slice()
        .unwrap()
        .iter()
        .filter(|s| s.y < config.hard_floor)
        .collect();
    assert_eq!(low.len(), 2 * 25);
    assert!(low.iter().all(|s| s.w >= config.iso_level));
}

#[test]
fn chunk_seams_are_not_welded() {
    let config = TerrainConfig::default();
    let block = generate_terrain_with(64., 1, 4, &config, &saturated).unwrap();
    assert_well_formed(block.vertex_float_count, &block.vertices, &block.indices);

    // A flat sheet just above y = 0: each chunk cuts its 5×5 vertical edges once.
    assert_eq!(block.vertex_count(), 4 * 25);
    assert_eq!(block.index_count, 4 * 16 * 2 * 3);

    let unique: HashSet<[u32; 3]> = block
        .positions()
        .map(|p| [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()])
        .collect();
    assert_eq!(unique.len(), 9 * 9);
}

#[test]
fn huge_segment_count_is_an_error() {
    assert!(matches!(
        generate_terrain(64., 0, 3_000_000),
        Err(TerrainError::IndexOverflow { .. })
    ));
}

#[test]
fn invalid_sizing_is_rejected() {
    for (level_count, max_segment) in [(-1, 4), (0, 0), (2, -8)] {
        assert!(matches!(
            generate_terrain(64., level_count, max_segment),
            Err(TerrainError::InvalidConfig { .. })
        ));
    }
}
