use ndarray::Array3;

use crate::{
    density::DensitySampler,
    error::{Result, TerrainError},
    types::{Point, Sample, Value, sample_at},
};

/// The regular grid of density samples inside one chunk.
///
/// The lattice has `segment + 1` points per axis and `segment³` cubes.
/// Samples are stored as `samples[[z, y, x]]` in standard layout, so the flat
/// offset of `(x, y, z)` is exactly [`index`](SampleLattice::index):
///
/// ```text
///  idx(x, y, z) = z·s² + y·s + x        s = segment + 1
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleLattice {
    segment: usize,
    samples: Array3<Sample>,
}

impl SampleLattice {
    /// Creates a lattice of zeroed samples.
    ///
    /// Fails if `segment < 1`, if `(segment + 1)³` overflows `usize`, or if the
    /// samples cannot be allocated.
    pub fn new(segment: usize) -> Result<Self> {
        if segment < 1 {
            return Err(TerrainError::invalid_config("segment", segment));
        }
        let side = segment
            .checked_add(1)
            .ok_or(TerrainError::IndexOverflow { count: segment })?;
        let len = side
            .checked_pow(3)
            .ok_or(TerrainError::IndexOverflow { count: side })?;

        let mut samples = Vec::new();
        samples.try_reserve_exact(len)?;
        samples.resize(len, Sample::zeros());
        let samples = Array3::from_shape_vec((side, side, side), samples)
            .map_err(|_| TerrainError::IndexOverflow { count: len })?;

        Ok(Self { segment, samples })
    }

    /// Number of cubes along each axis.
    pub fn segment(&self) -> usize {
        self.segment
    }

    /// Number of sample points along each axis.
    pub fn side(&self) -> usize {
        self.segment + 1
    }

    /// Flat lattice index of point `(x, y, z)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let side = self.side();
        z * side * side + y * side + x
    }

    /// Returns the sample at point `(x, y, z)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> &Sample {
        &self.samples[[z, y, x]]
    }

    /// Sets the sample at point `(x, y, z)`.
    pub fn set(&mut self, x: usize, y: usize, z: usize, sample: Sample) {
        self.samples[[z, y, x]] = sample;
    }

    /// Samples in flat-index order.
    pub fn as_slice(&self) -> Option<&[Sample]> {
        self.samples.as_slice()
    }

    /// Calls `f(x, y, z, &mut sample)` for every point in the lattice.
    pub fn for_each_point<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, usize, usize, &mut Sample),
    {
        for ((z, y, x), sample) in self.samples.indexed_iter_mut() {
            f(x, y, z, sample);
        }
    }

    /// Returns the 8 corner points `[x, y, z]` of the cube at `(x, y, z)`.
    ///
    /// Corners run around the bottom face, then the top face in the same order:
    ///
    /// ```text
    ///  0 = (x,   y,   z  )    4 = (x,   y+1, z  )
    ///  1 = (x+1, y,   z  )    5 = (x+1, y+1, z  )
    ///  2 = (x+1, y,   z+1)    6 = (x+1, y+1, z+1)
    ///  3 = (x,   y,   z+1)    7 = (x,   y+1, z+1)
    /// ```
    #[inline]
    pub fn voxel_corner_indices(&self, x: usize, y: usize, z: usize) -> [[usize; 3]; 8] {
        [
            [x, y, z],
            [x + 1, y, z],
            [x + 1, y, z + 1],
            [x, y, z + 1],
            [x, y + 1, z],
            [x + 1, y + 1, z],
            [x + 1, y + 1, z + 1],
            [x, y + 1, z + 1],
        ]
    }
}

/// Samples the density field over one chunk.
///
/// Point `(x, y, z)` sits at `origin + (x, y, z) * chunk_size / segment`.
pub fn sample_chunk(
    origin: Point,
    chunk_size: Value,
    segment: usize,
    sampler: &DensitySampler,
) -> Result<SampleLattice> {
    let mut lattice = SampleLattice::new(segment)?;
    let unit_size = chunk_size / segment as Value;

    lattice.for_each_point(|x, y, z, sample| {
        let position = Point::new(
            origin.x + x as Value * unit_size,
            origin.y + y as Value * unit_size,
            origin.z + z as Value * unit_size,
        );
        *sample = sample_at(position, sampler.sample(position, y));
    });

    Ok(lattice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DensityConfig, density::PINNED_FLOOR_DENSITY, noise::PerlinField};

    #[test]
    fn rejects_empty_lattice() {
        assert!(matches!(
            SampleLattice::new(0),
            Err(TerrainError::InvalidConfig { parameter: "segment", .. })
        ));
    }

    #[test]
    fn oversized_lattice_is_an_error() {
        // (3_000_001)³ does not fit in usize.
        assert!(matches!(
            SampleLattice::new(3_000_000),
            Err(TerrainError::IndexOverflow { .. })
        ));
        // 10¹⁸ samples fit the count but not the address space.
        assert!(matches!(
            SampleLattice::new(999_999),
            Err(TerrainError::ResourceExhausted(_))
        ));
    }

    #[test]
    fn flat_index_matches_storage_order() {
        let mut lattice = SampleLattice::new(3).unwrap();
        lattice.for_each_point(|x, y, z, sample| {
            sample.w = (x * 100 + y * 10 + z) as Value;
        });

        let flat = lattice.as_slice().unwrap();
        for z in 0..4 {
            for y in 0..4 {
                for x in 0..4 {
                    assert_eq!(flat[lattice.index(x, y, z)], *lattice.get(x, y, z));
                }
            }
        }
        assert_eq!(lattice.index(3, 3, 3), 63);
    }

    #[test]
    fn samples_positions_and_pins_bottom_layer() {
        let config = DensityConfig::default();
        let noise = PerlinField::new(1);
        let sampler = DensitySampler::new(&config, &noise);
        let lattice = sample_chunk(Point::new(-8., 0., 4.), 16., 4, &sampler).unwrap();

        assert_eq!(lattice.side(), 5);
        assert_eq!(lattice.as_slice().unwrap().len(), 125);

        let corner = lattice.get(4, 2, 1);
        assert_eq!((corner.x, corner.y, corner.z), (8., 8., 8.));

        for z in 0..5 {
            for x in 0..5 {
                assert_eq!(lattice.get(x, 0, z).w, PINNED_FLOOR_DENSITY);
            }
        }
    }
}
