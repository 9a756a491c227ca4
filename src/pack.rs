use crate::{
    error::{Result, TerrainError},
    types::{Point, Value},
};

/// Flat vertex/index buffers handed to the host.
///
/// Ownership passes to the caller; the generator keeps nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputBlock {
    /// Number of scalar floats in `vertices` (three per vertex).
    pub vertex_float_count: u32,
    /// Number of entries in `indices`.
    pub index_count: u32,
    /// `[x0, y0, z0, x1, y1, z1, ...]`
    pub vertices: Vec<Value>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl OutputBlock {
    /// Number of vertices (not floats).
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Vertex positions as `[x, y, z]` triples.
    pub fn positions(&self) -> impl Iterator<Item = [Value; 3]> + '_ {
        self.vertices.chunks_exact(3).map(|v| [v[0], v[1], v[2]])
    }

    /// Triangle index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Copies vertices and indices into exactly-sized output buffers.
///
/// Allocation failure is reported as [`TerrainError::ResourceExhausted`] and no
/// partial block is returned.
pub fn pack(vertices: &[Point], indices: &[u32]) -> Result<OutputBlock> {
    let float_count = vertices.len() * 3;
    let vertex_float_count = u32::try_from(float_count)
        .map_err(|_| TerrainError::IndexOverflow { count: vertices.len() })?;
    let index_count = u32::try_from(indices.len())
        .map_err(|_| TerrainError::IndexOverflow { count: indices.len() })?;

    let mut flat: Vec<Value> = Vec::new();
    flat.try_reserve_exact(float_count)?;
    flat.extend(vertices.iter().flat_map(|v| [v.x, v.y, v.z]));

    let mut packed_indices: Vec<u32> = Vec::new();
    packed_indices.try_reserve_exact(indices.len())?;
    packed_indices.extend_from_slice(indices);

    Ok(OutputBlock {
        vertex_float_count,
        index_count,
        vertices: flat,
        indices: packed_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_vertices_as_floats() {
        let vertices = [Point::new(1., 2., 3.), Point::new(4., 5., 6.), Point::new(7., 8., 9.)];
        let block = pack(&vertices, &[0, 2, 1]).unwrap();

        assert_eq!(block.vertex_float_count, 9);
        assert_eq!(block.index_count, 3);
        assert_eq!(block.vertices, vec![1., 2., 3., 4., 5., 6., 7., 8., 9.]);
        assert_eq!(block.indices, vec![0, 2, 1]);
        assert_eq!(block.vertex_count(), 3);
        assert_eq!(block.positions().nth(1), Some([4., 5., 6.]));
        assert_eq!(block.triangles().collect::<Vec<_>>(), vec![[0, 2, 1]]);
    }

    #[test]
    fn overflow_message_fits_vertices_and_indices() {
        let message = TerrainError::IndexOverflow { count: 70_000 }.to_string();
        assert_eq!(message, "count 70000 exceeds the addressable index range");
    }

    #[test]
    fn empty_mesh_packs_to_empty_block() {
        let block = pack(&[], &[]).unwrap();
        assert_eq!(block, OutputBlock::default());
    }
}
