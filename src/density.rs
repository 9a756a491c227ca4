//! Layered-noise terrain density.
//!
//! Each octave folds the noise into ridges (`(1 - |n|)^2`) and feeds the result
//! back as the weight of the next octave, so detail only accumulates where the
//! previous layer was already strong. The sum is then biased by height: density
//! falls as `y` grows, and a hard floor pushes the lowest band outside the
//! surface.

use crate::{
    config::DensityConfig,
    noise::NoiseField,
    types::{Point, Value},
};

/// Divides `noise_scale` to give the first octave's frequency.
const FREQUENCY_DIVISOR: Value = 2000.0;
/// Weight carried into the first octave.
const INITIAL_WEIGHT: Value = 1.05;
/// Scales each octave's value into the next octave's weight.
const WEIGHT_MULTIPLIER: Value = 1.05;
/// Height falloff of the base terrain.
const HEIGHT_FALLOFF: Value = 0.8;
/// Period and strength of the small terracing term.
const TERRACE_PERIOD: Value = 1.0;
const TERRACE_STRENGTH: Value = 0.1;

/// Density forced on the bottom lattice layer of every chunk.
pub const PINNED_FLOOR_DENSITY: Value = 0.1;

/// Evaluates the terrain's scalar field over a [`NoiseField`].
#[derive(Clone, Copy)]
pub struct DensitySampler<'a> {
    config: &'a DensityConfig,
    noise: &'a dyn NoiseField,
}

impl<'a> DensitySampler<'a> {
    pub fn new(config: &'a DensityConfig, noise: &'a dyn NoiseField) -> Self {
        Self { config, noise }
    }

    pub fn config(&self) -> &DensityConfig {
        self.config
    }

    /// Sums `octaves` layers of ridged, feedback-weighted noise at `pos`.
    pub fn fractal_noise(&self, pos: Point) -> Value {
        let config = self.config;
        let mut frequency = config.noise_scale / FREQUENCY_DIVISOR;
        let mut amplitude = 1.0;
        let mut weight = INITIAL_WEIGHT;
        let mut noise = 0.0;

        for _ in 0..config.octaves {
            let n = self.noise.noise3(Point::from(pos.coords * frequency)) / 2.0;
            let mut v = 1.0 - n.abs();
            v = v * v;
            v *= weight;
            weight = (v * WEIGHT_MULTIPLIER).clamp(0.0, 1.0);
            noise += v * amplitude;
            amplitude *= config.persistence;
            frequency *= config.lacunarity;
        }

        noise
    }

    /// Density at a world position, without the bottom-layer override.
    pub fn density(&self, pos: Point) -> Value {
        let config = self.config;
        let terrace = pos.y - (pos.y / TERRACE_PERIOD).floor() * TERRACE_PERIOD;
        let mut value = -(pos.y * HEIGHT_FALLOFF + config.floor_offset)
            + self.fractal_noise(pos) * config.noise_weight
            + terrace * TERRACE_STRENGTH;

        if pos.y < config.hard_floor {
            value += config.hard_floor_weight;
        }

        value
    }

    /// Density of the lattice point at `pos` whose local y index is `lattice_y`.
    ///
    /// The bottom layer (`lattice_y == 0`) is pinned to [`PINNED_FLOOR_DENSITY`]
    /// whatever its world position, so a chunk's mesh never opens downward.
    pub fn sample(&self, pos: Point, lattice_y: usize) -> Value {
        if lattice_y == 0 {
            return PINNED_FLOOR_DENSITY;
        }
        self.density(pos)
    }
}
