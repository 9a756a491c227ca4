use crate::{
    error::{Result, TerrainError},
    types::{Point, Value},
};

/// Largest accepted `level_count`: `4^15` chunks is already far beyond any sane terrain.
pub const MAX_LEVEL_COUNT: i32 = 15;

/// One square column of the terrain, sampled and meshed independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkPlan {
    /// Grid coordinates `(i, j)`, each in `[0, chunk_count)`.
    pub coord: [usize; 2],
    /// World-space minimum corner.
    pub origin: Point,
    /// Edge length along X and Z.
    pub size: Value,
}

/// Splits a square world extent into `2^level_count × 2^level_count` chunks.
///
/// Chunks are laid out around the origin on the XZ plane:
///
/// ```text
///  origin(i, j) = ((i - count/2) * chunk_size, 0, (j - count/2) * chunk_size)
/// ```
///
/// `count/2` truncates, so a single chunk starts at the origin rather than
/// being centred on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkGrid {
    pub chunk_count: usize,
    pub chunk_size: Value,
}

impl ChunkGrid {
    pub fn new(size: Value, level_count: i32) -> Result<Self> {
        if !(0..=MAX_LEVEL_COUNT).contains(&level_count) {
            return Err(TerrainError::invalid_config("level_count", level_count));
        }
        if !size.is_finite() {
            return Err(TerrainError::invalid_config("size", size));
        }

        let chunk_count = 1_usize << level_count;
        Ok(Self {
            chunk_count,
            chunk_size: size / chunk_count as Value,
        })
    }

    /// Total number of chunks.
    pub fn len(&self) -> usize {
        self.chunk_count * self.chunk_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// World-space origin of chunk `(i, j)`.
    pub fn origin(&self, i: usize, j: usize) -> Point {
        let half = (self.chunk_count / 2) as i64;
        Point::new(
            (i as i64 - half) as Value * self.chunk_size,
            0.,
            (j as i64 - half) as Value * self.chunk_size,
        )
    }

    /// Iterates chunks with `i` in the outer loop and `j` in the inner one.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkPlan> + '_ {
        (0..self.chunk_count).flat_map(move |i| {
            (0..self.chunk_count).map(move |j| ChunkPlan {
                coord: [i, j],
                origin: self.origin(i, j),
                size: self.chunk_size,
            })
        })
    }

    /// Plans every chunk of a `size`-wide world at `level_count`.
    pub fn plan(size: Value, level_count: i32) -> Result<Vec<ChunkPlan>> {
        let grid = Self::new(size, level_count)?;
        Ok(grid.chunks().collect())
    }
}
