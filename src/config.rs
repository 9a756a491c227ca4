use crate::types::Value;

/// Tunables of the layered-noise density function.
///
/// Passed by reference into the sampler and the mesher; never mutated during a
/// generation call.
///
/// ```rust,ignore
/// let config = DensityConfig::default()
///     .with_octaves(6)
///     .with_hard_floor_weight(10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityConfig {
    /// Iso-surface threshold: densities below it are "inside".
    pub iso_level: Value,
    /// Base frequency numerator. The first octave samples at `noise_scale / 2000`.
    pub noise_scale: Value,
    /// Number of noise layers summed per sample.
    pub octaves: u32,
    /// Amplitude multiplier between octaves. Values above `1.0` let the
    /// higher octaves dominate, which gives the terrain its rough character.
    pub persistence: Value,
    /// Frequency multiplier between octaves.
    pub lacunarity: Value,
    /// Height bias subtracted from every sample.
    pub floor_offset: Value,
    /// World height below which [`hard_floor_weight`](Self::hard_floor_weight) is added.
    pub hard_floor: Value,
    /// Bias added below [`hard_floor`](Self::hard_floor).
    pub hard_floor_weight: Value,
    /// Scale applied to the accumulated noise.
    pub noise_weight: Value,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            iso_level: 0.0,
            noise_scale: 3.0,
            octaves: 8,
            persistence: 1.15,
            lacunarity: 1.6,
            floor_offset: 20.0,
            hard_floor: 2.0,
            hard_floor_weight: 3.06,
            noise_weight: 6.09,
        }
    }
}

impl DensityConfig {
    pub fn with_iso_level(mut self, iso_level: Value) -> Self {
        self.iso_level = iso_level;
        self
    }

    pub fn with_noise_scale(mut self, noise_scale: Value) -> Self {
        self.noise_scale = noise_scale;
        self
    }

    pub fn with_octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves;
        self
    }

    pub fn with_persistence(mut self, persistence: Value) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn with_lacunarity(mut self, lacunarity: Value) -> Self {
        self.lacunarity = lacunarity;
        self
    }

    pub fn with_floor_offset(mut self, floor_offset: Value) -> Self {
        self.floor_offset = floor_offset;
        self
    }

    pub fn with_hard_floor(mut self, hard_floor: Value) -> Self {
        self.hard_floor = hard_floor;
        self
    }

    pub fn with_hard_floor_weight(mut self, hard_floor_weight: Value) -> Self {
        self.hard_floor_weight = hard_floor_weight;
        self
    }

    pub fn with_noise_weight(mut self, noise_weight: Value) -> Self {
        self.noise_weight = noise_weight;
        self
    }
}

/// Everything a generation call needs besides the sizing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainConfig {
    /// Density function tunables.
    pub density: DensityConfig,
    /// Seed of the default Perlin noise field.
    pub seed: u32,
    /// Process chunks on the Rayon pool. Output is identical either way.
    pub parallel: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            density: DensityConfig::default(),
            seed: 0,
            parallel: true,
        }
    }
}

impl TerrainConfig {
    /// Replaces the density tunables.
    pub fn with_density(mut self, density: DensityConfig) -> Self {
        self.density = density;
        self
    }

    /// Sets the noise seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables parallel chunk processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
