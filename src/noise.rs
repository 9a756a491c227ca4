use ::noise::{NoiseFn, Perlin};

use crate::types::{Point, Value};

/// Single-octave 3D noise primitive, roughly in `[-1, 1]`.
///
/// Any `Fn(Point) -> Value + Sync` closure is a noise field, which makes it easy
/// to drive the density function with a constant or analytic field:
///
/// ```rust,ignore
/// let flat = |_p: Point| 0.0;
/// let sampler = DensitySampler::new(&config, &flat);
/// ```
pub trait NoiseField: Sync {
    fn noise3(&self, p: Point) -> Value;
}

impl<F> NoiseField for F
where
    F: Fn(Point) -> Value + Sync,
{
    #[inline]
    fn noise3(&self, p: Point) -> Value {
        self(p)
    }
}

/// Seeded Perlin noise from the `noise` crate.
#[derive(Clone, Copy, Debug)]
pub struct PerlinField {
    perlin: Perlin,
}

impl PerlinField {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }
}

impl Default for PerlinField {
    fn default() -> Self {
        Self::new(0)
    }
}

impl NoiseField for PerlinField {
    #[inline]
    fn noise3(&self, p: Point) -> Value {
        self.perlin.get([p.x as f64, p.y as f64, p.z as f64]) as Value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perlin_is_deterministic_per_seed() {
        let a = PerlinField::new(42);
        let b = PerlinField::new(42);
        let p = Point::new(1.3, -7.25, 0.5);
        assert_eq!(a.noise3(p), b.noise3(p));
    }

    #[test]
    fn perlin_stays_in_range() {
        let field = PerlinField::new(3);
        for i in 0..200 {
            let t = i as Value * 0.173;
            let n = field.noise3(Point::new(t, t * 0.5, -t));
            assert!((-1.0..=1.0).contains(&n), "noise {n} out of range");
        }
    }

    #[test]
    fn closures_are_noise_fields() {
        let field = |p: Point| p.x;
        assert_eq!(field.noise3(Point::new(0.25, 0.0, 0.0)), 0.25);
    }
}
