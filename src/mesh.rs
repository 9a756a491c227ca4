use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::{
    chunk::SampleLattice,
    error::{Result, TerrainError},
    interp::{find_t, interpolate_points},
    types::{Point, Value, Vector, sample_position},
    utils::{edge_corners, get_state, triangle_edges},
};

/// Identifies a lattice edge by the flat indices of its two end points.
///
/// The pair is stored as `(min, max)`, so both directions of an edge map to the
/// same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey {
    low: usize,
    high: usize,
}

impl VertexKey {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// The `(min, max)` pair of lattice indices.
    pub fn corners(&self) -> (usize, usize) {
        (self.low, self.high)
    }
}

/// Append-only vertex and triangle-index accumulator.
///
/// Every group of three consecutive indices forms one triangle, in winding
/// order. Every index is smaller than `vertices.len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertex positions in creation order.
    pub vertices: Vec<Point>,

    /// Triangle indices into `vertices`.
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Creates an empty mesh with no vertices or triangles.
    pub fn new_empty() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends a vertex and returns its index.
    fn push_vertex(&mut self, vertex: Point) -> Result<u32> {
        let count = self.vertices.len();
        let index = u32::try_from(count).map_err(|_| TerrainError::IndexOverflow { count })?;
        self.vertices.push(vertex);
        Ok(index)
    }

    /// Moves `other` onto the end of this mesh, shifting its indices past the
    /// vertices already present.
    pub fn append(&mut self, other: MeshBuffers) -> Result<()> {
        let count = self.vertices.len() + other.vertices.len();
        if u32::try_from(count).is_err() {
            return Err(TerrainError::IndexOverflow { count });
        }
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + offset));
        Ok(())
    }

    /// Returns the three vertex positions of triangle `tri`.
    pub fn tri_coords(&self, tri: usize) -> [Point; 3] {
        let at = |k: usize| self.vertices[self.indices[tri * 3 + k] as usize];
        [at(0), at(1), at(2)]
    }

    /// Computes the unit face normal of triangle `tri`, following its winding.
    ///
    /// Returns the zero vector if the triangle is degenerate.
    pub fn tri_normal(&self, tri: usize) -> Vector {
        let cross = self.tri_cross(tri);
        let nrm = cross.norm();
        if nrm == 0.0 {
            Vector::zeros()
        } else {
            cross / nrm
        }
    }

    fn tri_cross(&self, tri: usize) -> Vector {
        let [a, b, c] = self.tri_coords(tri);
        (b - a).cross(&(c - b))
    }

    /// Smooth per-vertex normals, area-weighted over the triangles sharing a vertex.
    ///
    /// Vertices with no well-defined normal fall back to `+Y`.
    pub fn vertex_normals(&self) -> Vec<[Value; 3]> {
        let mut sums = vec![Vector::zeros(); self.vertices.len()];
        for tri in 0..self.triangle_count() {
            // The unnormalised cross product is twice the triangle's area.
            let cross = self.tri_cross(tri);
            for &i in &self.indices[tri * 3..tri * 3 + 3] {
                sums[i as usize] += cross;
            }
        }

        sums.into_iter()
            .map(|n| match n.try_normalize(Value::EPSILON) {
                Some(n) => [n.x, n.y, n.z],
                None => [0., 1., 0.],
            })
            .collect()
    }
}

/// Runs Marching Cubes over a [`SampleLattice`].
///
/// Vertices are welded per call: within one lattice, every cut edge yields a
/// single vertex shared by all triangles touching it. Nothing is shared between
/// calls, so neighbouring chunks keep coincident but distinct seam vertices.
///
/// ```text
/// Per cube:
/// 1. voxel_corner_indices  →  8 lattice points
/// 2. get_state             →  256-entry configuration
/// 3. triangle_edges        →  edge triplets from TRI_TABLE
/// 4. edge_corners          →  corner pairs, emitted as {e0, e2, e1}
/// 5. VertexKey lookup      →  reuse, or interpolate a new vertex
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshExtractor {
    iso_level: Value,
}

impl MeshExtractor {
    pub fn new(iso_level: Value) -> Self {
        Self { iso_level }
    }

    /// Meshes `lattice` into `mesh`, continuing its running vertex index.
    pub fn extract(&self, lattice: &SampleLattice, mesh: &mut MeshBuffers) -> Result<()> {
        let mut welded: FxHashMap<VertexKey, u32> = FxHashMap::default();
        let segment = lattice.segment();

        for x in 0..segment {
            for y in 0..segment {
                for z in 0..segment {
                    self.march(lattice, x, y, z, &mut welded, mesh)?;
                }
            }
        }

        Ok(())
    }

    fn march(
        &self,
        lattice: &SampleLattice,
        x: usize,
        y: usize,
        z: usize,
        welded: &mut FxHashMap<VertexKey, u32>,
        mesh: &mut MeshBuffers,
    ) -> Result<()> {
        let corners = lattice.voxel_corner_indices(x, y, z);
        let samples = corners.map(|[cx, cy, cz]| *lattice.get(cx, cy, cz));
        let flat = corners.map(|[cx, cy, cz]| lattice.index(cx, cy, cz));

        let state = get_state(&samples.map(|s| s.w), self.iso_level);
        if state == 0 {
            return Ok(());
        }

        for [e0, e1, e2] in triangle_edges(state) {
            // Swapping the last two edges flips the table's winding to face outward.
            for edge in [e0, e2, e1] {
                let (a, b) = edge_corners(edge);
                let index = match welded.entry(VertexKey::new(flat[a], flat[b])) {
                    Entry::Occupied(entry) => *entry.get(),
                    Entry::Vacant(entry) => {
                        let t = find_t(samples[a].w, samples[b].w, self.iso_level);
                        let vertex = interpolate_points(
                            sample_position(&samples[a]),
                            sample_position(&samples[b]),
                            t,
                        );
                        *entry.insert(mesh.push_vertex(vertex)?)
                    }
                };
                mesh.indices.push(index);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample_at;

    /// A lattice whose densities come from `f(x, y, z)` at unit spacing.
    fn lattice_from(segment: usize, f: impl Fn(usize, usize, usize) -> Value) -> SampleLattice {
        let mut lattice = SampleLattice::new(segment).unwrap();
        lattice.for_each_point(|x, y, z, sample| {
            let p = Point::new(x as Value, y as Value, z as Value);
            *sample = sample_at(p, f(x, y, z));
        });
        lattice
    }

    fn assert_indices_valid(mesh: &MeshBuffers) {
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn vertex_key_is_order_independent() {
        assert_eq!(VertexKey::new(7, 3), VertexKey::new(3, 7));
        assert_eq!(VertexKey::new(7, 3).corners(), (3, 7));
    }

    #[test]
    fn uniform_lattices_produce_nothing() {
        let extractor = MeshExtractor::new(0.);
        for value in [-1., 1.] {
            let mut mesh = MeshBuffers::new_empty();
            extractor
                .extract(&lattice_from(3, |_, _, _| value), &mut mesh)
                .unwrap();
            assert!(mesh.vertices.is_empty());
            assert!(mesh.indices.is_empty());
        }
    }

    #[test]
    fn single_inside_corner_yields_one_triangle() {
        let lattice = lattice_from(1, |x, y, z| if (x, y, z) == (0, 0, 0) { -1. } else { 1. });
        let mut mesh = MeshBuffers::new_empty();
        MeshExtractor::new(0.).extract(&lattice, &mut mesh).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);

        // Table order is edges {0, 8, 3}; emission order is {0, 3, 8}.
        assert_eq!(mesh.vertices[0], Point::new(0.5, 0., 0.));
        assert_eq!(mesh.vertices[1], Point::new(0., 0., 0.5));
        assert_eq!(mesh.vertices[2], Point::new(0., 0.5, 0.));
    }

    #[test]
    fn vertices_sit_on_the_iso_crossing() {
        // Density falls linearly with height and crosses zero at y = 1.25.
        let lattice = lattice_from(2, |_, y, _| 1.25 - y as Value);
        let mut mesh = MeshBuffers::new_empty();
        MeshExtractor::new(0.).extract(&lattice, &mut mesh).unwrap();

        assert!(!mesh.is_empty());
        assert!(mesh.vertices.iter().all(|v| (v.y - 1.25).abs() < 1e-5));
    }

    #[test]
    fn shared_edges_are_welded_within_a_lattice() {
        let lattice = lattice_from(2, |_, y, _| 1.25 - y as Value);
        let mut mesh = MeshBuffers::new_empty();
        MeshExtractor::new(0.).extract(&lattice, &mut mesh).unwrap();
        assert_indices_valid(&mesh);

        // A flat plane through a 2×2 column of cubes cuts the 3×3 vertical edges.
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.triangle_count(), 8);

        let mut positions: Vec<_> = mesh.vertices.iter().map(|v| (v.x as i32, v.z as i32)).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), 9);
    }

    #[test]
    fn welding_does_not_cross_extract_calls() {
        let lattice = lattice_from(1, |_, y, _| 0.5 - y as Value);
        let extractor = MeshExtractor::new(0.);
        let mut mesh = MeshBuffers::new_empty();
        extractor.extract(&lattice, &mut mesh).unwrap();
        let first = mesh.vertex_count();
        extractor.extract(&lattice, &mut mesh).unwrap();
        assert_indices_valid(&mesh);

        assert_eq!(mesh.vertex_count(), first * 2);
        assert_eq!(mesh.vertices[..first], mesh.vertices[first..]);
        assert!(mesh.indices[mesh.indices.len() / 2..].iter().all(|&i| i as usize >= first));
    }

    #[test]
    fn plane_normals_follow_the_winding() {
        let lattice = lattice_from(2, |_, y, _| 1.25 - y as Value);
        let mut mesh = MeshBuffers::new_empty();
        MeshExtractor::new(0.).extract(&lattice, &mut mesh).unwrap();

        let first = mesh.tri_normal(0);
        assert!((first.norm() - 1.).abs() < 1e-5);
        assert!((first.y.abs() - 1.).abs() < 1e-5);
        for tri in 1..mesh.triangle_count() {
            assert!((mesh.tri_normal(tri) - first).norm() < 1e-5);
        }
        for n in mesh.vertex_normals() {
            assert!((n[1] - first.y).abs() < 1e-5);
        }
    }

    #[test]
    fn append_offsets_indices() {
        let lattice = lattice_from(1, |x, y, z| if (x, y, z) == (0, 0, 0) { -1. } else { 1. });
        let extractor = MeshExtractor::new(0.);
        let mut a = MeshBuffers::new_empty();
        extractor.extract(&lattice, &mut a).unwrap();
        let mut b = MeshBuffers::new_empty();
        extractor.extract(&lattice, &mut b).unwrap();

        a.append(b).unwrap();
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_indices_valid(&a);
    }
}
